//! Cooperative yield point between instructions.
//!
//! [`crate::Engine::resume`] consults a [`Scheduler`] around every instruction. The scheduler
//! decides whether the engine keeps going or hands control back to the host, which then
//! re-enters `resume` whenever it likes (next frame, next task-queue turn, next loop iteration in
//! a test). Suspension only happens between instructions, never inside a handler.
//!
//! Per instruction the hooks run in this order:
//!
//! 1. [`Scheduler::before_exec`], with the program counter on the instruction about to run.
//! 2. The instruction executes.
//! 3. [`Scheduler::retired`], always, even when the instruction ends the run.
//! 4. [`Scheduler::yield_point`], only if the engine is still running.

use crate::engine::Engine;
use crate::interp::RetiredInstruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Yield {
    /// Execute the next instruction immediately.
    Continue,
    /// Return from `resume`; the engine stays `Running`.
    Suspend,
}

pub trait Scheduler {
    /// Suspending here leaves the instruction at the program counter unexecuted.
    fn before_exec(&mut self, _engine: &Engine) -> Yield {
        Yield::Continue
    }

    /// Observes an executed instruction before the engine checks whether the run is over.
    fn retired(&mut self, _engine: &Engine, _retired: &RetiredInstruction) {}

    /// Called after each instruction that leaves the engine running.
    fn yield_point(&mut self, engine: &Engine) -> Yield;
}

impl<F> Scheduler for F
where
    F: FnMut(&Engine) -> Yield,
{
    fn yield_point(&mut self, engine: &Engine) -> Yield {
        self(engine)
    }
}

/// Never suspends. A program that neither halts nor faults runs forever under this scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunToCompletion;

impl Scheduler for RunToCompletion {
    fn yield_point(&mut self, _engine: &Engine) -> Yield {
        Yield::Continue
    }
}

/// Suspends after every `slice` instructions.
///
/// Hosts that interleave rendering and input polling with execution typically pick a slice per
/// frame; `slice == 1` yields after every instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionBudget {
    slice: u64,
    remaining: u64,
}

impl InstructionBudget {
    pub fn new(slice: u64) -> Self {
        let slice = slice.max(1);
        Self {
            slice,
            remaining: slice,
        }
    }

    pub fn slice(&self) -> u64 {
        self.slice
    }
}

impl Scheduler for InstructionBudget {
    fn yield_point(&mut self, _engine: &Engine) -> Yield {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.slice;
            Yield::Suspend
        } else {
            Yield::Continue
        }
    }
}
