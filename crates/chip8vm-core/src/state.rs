use crate::decode::Instruction;
use crate::error::{EngineError, Result};
use crate::framebuffer::Framebuffer;

pub const MEMORY_SIZE: usize = 0x1000;
/// Load address for programs; everything below is reserved.
pub const PROGRAM_ORIGIN: u16 = 0x200;
pub const DATA_REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
/// `VF` doubles as the carry / borrow / collision flag.
pub const FLAG_REGISTER: usize = 0xF;

/// Architecturally visible machine state.
///
/// Owned by exactly one [`crate::Engine`]. Handlers mutate it in place; hosts only see it through
/// the engine's read-only accessors or [`crate::Engine::state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub(crate) memory: [u8; MEMORY_SIZE],
    pub(crate) v: [u8; DATA_REGISTER_COUNT],
    pub(crate) i: u16,
    pub(crate) pc: u16,
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) sp: usize,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) instruction: Instruction,
    pub(crate) instruction_addr: u16,
    pub(crate) program_len: usize,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    pub fn new() -> Self {
        Self {
            memory: [0; MEMORY_SIZE],
            v: [0; DATA_REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_ORIGIN,
            stack: [0; STACK_DEPTH],
            sp: 0,
            framebuffer: Framebuffer::new(),
            instruction: Instruction(0),
            instruction_addr: PROGRAM_ORIGIN,
            program_len: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Copies `program` into memory at `origin` and records its length.
    ///
    /// Nothing else is touched, so harnesses can stage memory (sprite data, a second program)
    /// on top of existing state.
    pub fn load(&mut self, program: &[u8], origin: u16) -> Result<()> {
        let start = usize::from(origin);
        let end = start
            .checked_add(program.len())
            .filter(|&end| end <= MEMORY_SIZE)
            .ok_or(EngineError::ProgramTooLarge {
                origin,
                len: program.len(),
                capacity: MEMORY_SIZE,
            })?;
        self.memory[start..end].copy_from_slice(program);
        self.program_len = program.len();
        Ok(())
    }

    /// Reads a byte, treating addresses past the end of memory as zero.
    #[inline]
    pub(crate) fn read_u8(&self, addr: usize) -> u8 {
        self.memory.get(addr).copied().unwrap_or(0)
    }

    /// Big-endian fetch of the instruction word at `pc`.
    #[inline]
    pub(crate) fn fetch(&self) -> Instruction {
        let pc = usize::from(self.pc);
        Instruction::from_bytes(self.read_u8(pc), self.read_u8(pc + 1))
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, set: bool) {
        self.v[FLAG_REGISTER] = u8::from(set);
    }

    pub(crate) fn push_return(&mut self, addr: u16) -> Result<()> {
        if self.sp >= STACK_DEPTH {
            return Err(EngineError::StackOverflow {
                pc: addr,
                depth: self.sp,
            });
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub(crate) fn pop_return(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(EngineError::StackUnderflow { pc: self.pc });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn data_registers(&self) -> [u8; DATA_REGISTER_COUNT] {
        self.v
    }

    pub fn address_register(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.pc
    }

    pub fn stack(&self) -> &[u16; STACK_DEPTH] {
        &self.stack
    }

    pub fn stack_pointer(&self) -> usize {
        self.sp
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn program_len(&self) -> usize {
        self.program_len
    }
}
