//! Fetch, decode and dispatch.
//!
//! Dispatch is two fixed 16-entry handler tables built at compile time: one indexed by the
//! primary opcode nibble and one, reached through opcode `0x8`, indexed by the bottom nibble.
//! Every slot holds a handler, so no instruction word can fault in dispatch; unassigned slots
//! point at [`op_nop`].

mod ops_alu;
mod ops_cf;
mod ops_gfx;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{EngineConfig, ShiftSource};
use crate::decode::Instruction;
use crate::error::Result;
use crate::state::MachineState;

/// Non-architectural inputs the handlers need.
#[derive(Debug, Clone)]
pub(crate) struct ExecContext {
    pub(crate) rng: StdRng,
    pub(crate) shift_source: ShiftSource,
    rng_seed: Option<u64>,
}

impl ExecContext {
    pub(crate) fn new(config: &EngineConfig) -> Self {
        Self {
            rng: seeded_rng(config.rng_seed),
            shift_source: config.shift_source,
            rng_seed: config.rng_seed,
        }
    }

    /// Rewinds a seeded random source so every run of the same program sees the same bytes.
    pub(crate) fn reset(&mut self) {
        if self.rng_seed.is_some() {
            self.rng = seeded_rng(self.rng_seed);
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One executed instruction, as seen by the dispatcher.
///
/// `vx` and `vy` hold the operand registers named by the `X` and `Y` nibbles, read before the
/// handler ran. Handlers that write `VF` can clobber an operand, so observers that need the
/// inputs of an instruction use these rather than the registers afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetiredInstruction {
    pub address: u16,
    pub instruction: Instruction,
    pub vx: u8,
    pub vy: u8,
}

/// How the program counter moves once a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Next {
    /// Advance to the following instruction (+2).
    Continue,
    /// Skip the following instruction (+4).
    Skip,
    Jump(u16),
}

pub(crate) type Handler = fn(&mut MachineState, &mut ExecContext, Instruction) -> Result<Next>;

const PRIMARY: [Handler; 16] = [
    ops_cf::op_system,
    ops_cf::op_jump,
    ops_cf::op_call,
    ops_cf::op_skip_eq_imm,
    ops_cf::op_skip_ne_imm,
    ops_cf::op_skip_eq_reg,
    ops_alu::op_load_imm,
    ops_alu::op_add_imm,
    op_arithmetic,
    ops_cf::op_skip_ne_reg,
    ops_alu::op_load_index,
    ops_cf::op_jump_offset,
    ops_alu::op_random,
    ops_gfx::op_draw,
    // EX9E / EXA1: key skips.
    op_nop,
    // FXxx: timers, BCD, font lookup, block load/store, add to I.
    op_nop,
];

const ARITHMETIC: [Handler; 16] = [
    ops_alu::op_move,
    ops_alu::op_or,
    ops_alu::op_and,
    ops_alu::op_xor,
    ops_alu::op_add_carry,
    ops_alu::op_sub_borrow,
    ops_alu::op_shift_right,
    ops_alu::op_sub_reverse_borrow,
    op_nop,
    op_nop,
    op_nop,
    op_nop,
    op_nop,
    op_nop,
    ops_alu::op_shift_left,
    op_nop,
];

fn op_nop(
    _state: &mut MachineState,
    _ctx: &mut ExecContext,
    _inst: Instruction,
) -> Result<Next> {
    Ok(Next::Continue)
}

fn op_arithmetic(
    state: &mut MachineState,
    ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    ARITHMETIC[usize::from(inst.sub_opcode())](state, ctx, inst)
}

/// Runs exactly one fetch-decode-dispatch cycle.
///
/// On error the program counter is left on the faulting instruction.
pub(crate) fn step(state: &mut MachineState, ctx: &mut ExecContext) -> Result<RetiredInstruction> {
    let pc = state.pc;
    let inst = state.fetch();
    state.instruction = inst;
    state.instruction_addr = pc;
    let retired = RetiredInstruction {
        address: pc,
        instruction: inst,
        vx: state.v[inst.x()],
        vy: state.v[inst.y()],
    };
    tracing::trace!(pc, word = inst.word(), "dispatch");

    let next = PRIMARY[usize::from(inst.opcode())](state, ctx, inst)?;
    state.pc = match next {
        Next::Continue => pc.wrapping_add(2),
        Next::Skip => pc.wrapping_add(2).wrapping_add(2),
        Next::Jump(target) => target,
    };
    Ok(retired)
}
