//! Execution engine for the CHIP-8 virtual machine.
//!
//! The engine owns the whole machine (memory, registers, call stack, framebuffer) and executes
//! raw instruction bytes produced by an external assembler. Hosts either step it one instruction
//! at a time or run it cooperatively through a [`Scheduler`].

#![forbid(unsafe_code)]

pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod framebuffer;
mod interp;
pub mod sched;
pub mod state;

pub use config::{EngineConfig, ShiftSource};
pub use decode::Instruction;
pub use engine::{Engine, ExecState, RunExit};
pub use error::{EngineError, Result};
pub use framebuffer::{Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use interp::RetiredInstruction;
pub use sched::{InstructionBudget, RunToCompletion, Scheduler, Yield};
pub use state::{
    MachineState, DATA_REGISTER_COUNT, FLAG_REGISTER, MEMORY_SIZE, PROGRAM_ORIGIN, STACK_DEPTH,
};
