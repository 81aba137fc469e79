use std::fmt;

use crate::config::EngineConfig;
use crate::decode::Instruction;
use crate::error::{EngineError, Result};
use crate::framebuffer::Framebuffer;
use crate::interp::{self, ExecContext, RetiredInstruction};
use crate::sched::{Scheduler, Yield};
use crate::state::{
    MachineState, DATA_REGISTER_COUNT, MEMORY_SIZE, PROGRAM_ORIGIN, STACK_DEPTH,
};

/// Lifecycle of a loaded program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecState {
    /// Constructed or reset; nothing is scheduled.
    #[default]
    Idle,
    /// Started with [`Engine::run`]; [`Engine::resume`] makes progress.
    Running,
    /// The run ended, either by reaching the end of memory or on a fatal error.
    Halted,
}

/// Why [`Engine::resume`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The scheduler asked to hand control back. The engine is still running.
    Yielded { executed: u64 },
    /// The program counter reached the end of memory. The completion callback has fired.
    Halted { executed: u64 },
    /// The engine was not running; nothing was executed.
    NotRunning,
}

impl RunExit {
    pub fn executed(&self) -> u64 {
        match *self {
            RunExit::Yielded { executed } | RunExit::Halted { executed } => executed,
            RunExit::NotRunning => 0,
        }
    }
}

type CompletionCallback = Box<dyn FnOnce(Option<EngineError>)>;

/// The execution engine: one machine, its dispatch context and the run lifecycle.
///
/// Hosts drive it in one of two ways:
///
/// - [`Engine::step`] executes exactly one instruction, synchronously, whatever the lifecycle
///   state. Debuggers and tests use this.
/// - [`Engine::run`] starts a program and [`Engine::resume`] executes it cooperatively, asking a
///   [`Scheduler`] after every instruction whether to continue.
pub struct Engine {
    state: MachineState,
    ctx: ExecContext,
    config: EngineConfig,
    exec_state: ExecState,
    last_retired: Option<RetiredInstruction>,
    on_complete: Option<CompletionCallback>,
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            state: MachineState::new(),
            ctx: ExecContext::new(&config),
            config,
            exec_state: ExecState::Idle,
            last_retired: None,
            on_complete: None,
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("pc", &format_args!("{:#05x}", self.state.pc))
            .field("exec_state", &self.exec_state)
            .field("config", &self.config)
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: MachineState::new(),
            ctx: ExecContext::new(&config),
            config,
            exec_state: ExecState::Idle,
            last_retired: None,
            on_complete: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Zeroes the machine and returns the engine to [`ExecState::Idle`].
    ///
    /// A pending completion callback is dropped without being called.
    pub fn reset(&mut self) {
        self.state.reset();
        self.ctx.reset();
        self.exec_state = ExecState::Idle;
        self.last_retired = None;
        self.on_complete = None;
        tracing::debug!("engine reset");
    }

    /// Loads `program` at [`PROGRAM_ORIGIN`] without resetting anything else.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.load_program_at(program, PROGRAM_ORIGIN)
    }

    pub fn load_program_at(&mut self, program: &[u8], origin: u16) -> Result<()> {
        self.state.load(program, origin)?;
        tracing::debug!(origin, len = program.len(), "program loaded");
        Ok(())
    }

    /// Resets, loads `program` at the origin and starts a run.
    ///
    /// Execution happens in [`Engine::resume`]. `on_complete` is called exactly once: with `None`
    /// when the program counter runs off the end of memory, or with the error that aborted the
    /// run. Hosts that treat the argument as a reserved, always-empty slot must check it: a
    /// stack overflow or underflow is reported here as `Some`.
    pub fn run<F>(&mut self, program: &[u8], on_complete: F) -> Result<()>
    where
        F: FnOnce(Option<EngineError>) + 'static,
    {
        self.reset();
        self.load_program(program)?;
        self.on_complete = Some(Box::new(on_complete));
        self.exec_state = ExecState::Running;
        tracing::debug!(len = program.len(), "run started");
        Ok(())
    }

    /// Executes the running program until it halts, faults, or `scheduler` suspends.
    ///
    /// A fatal error halts the run, is passed to the completion callback, and is returned. The
    /// halting check never depends on the scheduler: the instruction that moves the program
    /// counter past memory is still reported to [`Scheduler::retired`], then the run ends.
    pub fn resume<S>(&mut self, scheduler: &mut S) -> Result<RunExit>
    where
        S: Scheduler + ?Sized,
    {
        if self.exec_state != ExecState::Running {
            return Ok(RunExit::NotRunning);
        }

        let mut executed = 0u64;
        loop {
            if self.past_end_of_memory() {
                tracing::debug!(executed, "program halted");
                self.finish(None);
                return Ok(RunExit::Halted { executed });
            }

            if scheduler.before_exec(self) == Yield::Suspend {
                return Ok(RunExit::Yielded { executed });
            }

            let retired = match interp::step(&mut self.state, &mut self.ctx) {
                Ok(retired) => retired,
                Err(err) => {
                    tracing::warn!(pc = self.state.pc, %err, "run aborted");
                    self.finish(Some(err.clone()));
                    return Err(err);
                }
            };
            self.last_retired = Some(retired);
            executed += 1;
            scheduler.retired(self, &retired);

            // Halting is decided before the yield point so a finished program never needs an
            // extra resume.
            if self.past_end_of_memory() {
                continue;
            }

            if scheduler.yield_point(self) == Yield::Suspend {
                return Ok(RunExit::Yielded { executed });
            }
        }
    }

    /// Executes exactly one instruction and returns it. The lifecycle state is not consulted or
    /// changed.
    pub fn step(&mut self) -> Result<Instruction> {
        let retired = interp::step(&mut self.state, &mut self.ctx)?;
        self.last_retired = Some(retired);
        Ok(retired.instruction)
    }

    fn past_end_of_memory(&self) -> bool {
        usize::from(self.state.pc) >= MEMORY_SIZE
    }

    fn finish(&mut self, error: Option<EngineError>) {
        self.exec_state = ExecState::Halted;
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(error);
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn exec_state(&self) -> ExecState {
        self.exec_state
    }

    pub fn is_running(&self) -> bool {
        self.exec_state == ExecState::Running
    }

    /// The most recently fetched instruction word.
    pub fn current_instruction(&self) -> Instruction {
        self.state.instruction
    }

    /// The last instruction that completed, with its operands as they were before it ran.
    ///
    /// `None` after construction or reset, and unchanged by an instruction that faulted.
    pub fn last_retired(&self) -> Option<RetiredInstruction> {
        self.last_retired
    }

    /// Address the most recently fetched instruction was read from.
    pub fn instruction_address(&self) -> u16 {
        self.state.instruction_addr
    }

    pub fn program_counter(&self) -> u16 {
        self.state.pc
    }

    pub fn memory(&self) -> &[u8] {
        self.state.memory()
    }

    pub fn memory_at(&self, addr: u16) -> Option<u8> {
        self.state.memory.get(usize::from(addr)).copied()
    }

    pub fn stack(&self) -> &[u16; STACK_DEPTH] {
        &self.state.stack
    }

    pub fn stack_pointer(&self) -> usize {
        self.state.sp
    }

    pub fn data_register(&self, index: usize) -> Result<u8> {
        self.state
            .v
            .get(index)
            .copied()
            .ok_or(EngineError::RegisterOutOfRange { index })
    }

    pub fn data_registers(&self) -> [u8; DATA_REGISTER_COUNT] {
        self.state.v
    }

    pub fn address_register(&self) -> u16 {
        self.state.i
    }

    pub fn program_len(&self) -> usize {
        self.state.program_len
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.state.framebuffer
    }

    pub fn start_address(&self) -> u16 {
        PROGRAM_ORIGIN
    }
}
