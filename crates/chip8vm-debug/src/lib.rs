//! Breakpoints, stepping and event tracing for a running [`Engine`].
//!
//! [`DebugHost`] is a [`Scheduler`]: pass it to [`Engine::resume`] and the run suspends whenever
//! the [`Debugger`] wants to stop, while the [`Tracer`] records what each instruction did.

use std::collections::{BTreeSet, VecDeque};

use chip8vm_core::{
    Engine, Instruction, RetiredInstruction, Result, Scheduler, Yield, FLAG_REGISTER,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PauseReason {
    /// [`Debugger::pause`] was called.
    Manual,
    /// The program counter reached a breakpoint. The instruction there has not run yet.
    Breakpoint { pc: u16 },
    /// A [`Debugger::request_steps`] budget ran out.
    StepsDone,
}

/// Where the debugger stands between two `resume` calls.
#[derive(Debug, Default)]
pub struct Debugger {
    breakpoints: BTreeSet<u16>,
    paused: bool,
    steps_left: Option<u32>,
    // Address the engine is parked on after a pause. A breakpoint there must not fire again
    // when execution continues.
    parked_at: Option<u16>,
}

impl Debugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a breakpoint was already set at `pc`.
    pub fn set_breakpoint(&mut self, pc: u16) -> bool {
        self.breakpoints.insert(pc)
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stops before the next instruction.
    pub fn pause(&mut self) {
        self.paused = true;
        self.steps_left = None;
    }

    /// Runs freely until a breakpoint.
    pub fn resume(&mut self) {
        self.paused = false;
        self.steps_left = None;
    }

    /// Runs `count` instructions (at least one), then pauses with [`PauseReason::StepsDone`].
    /// Breakpoints still stop the run early.
    pub fn request_steps(&mut self, count: u32) {
        self.paused = false;
        self.steps_left = Some(count.max(1));
    }

    /// Decides whether the instruction at `pc` may run.
    pub fn before_exec(&mut self, pc: u16) -> Option<PauseReason> {
        let resuming_here = self.parked_at.take() == Some(pc);
        if self.paused {
            self.parked_at = Some(pc);
            return Some(PauseReason::Manual);
        }
        if !resuming_here && self.breakpoints.contains(&pc) {
            self.paused = true;
            self.steps_left = None;
            self.parked_at = Some(pc);
            return Some(PauseReason::Breakpoint { pc });
        }
        None
    }

    /// Counts down a step request. `next_pc` is where the engine will continue.
    pub fn after_exec(&mut self, next_pc: u16) -> Option<PauseReason> {
        let left = self.steps_left.as_mut()?;
        *left -= 1;
        if *left > 0 {
            return None;
        }
        self.steps_left = None;
        self.paused = true;
        self.parked_at = Some(next_pc);
        Some(PauseReason::StepsDone)
    }
}

/// Which event kinds a [`Tracer`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceFilter {
    pub instructions: bool,
    pub control_flow: bool,
    pub draws: bool,
}

impl Default for TraceFilter {
    fn default() -> Self {
        Self {
            instructions: false,
            control_flow: true,
            draws: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraceEvent {
    Instruction { pc: u16, word: u16 },
    Call { from: u16, to: u16 },
    Return { from: u16, to: u16 },
    Draw { x: u8, y: u8, rows: u8, collision: bool },
}

const RETURN_WORD: u16 = 0x00EE;

impl TraceEvent {
    /// Classifies a call, return or draw. `engine` is observed right after `retired` ran.
    fn control_or_draw(retired: &RetiredInstruction, engine: &Engine) -> Option<TraceEvent> {
        let inst: Instruction = retired.instruction;
        let from = retired.address;
        match inst.opcode() {
            0x0 if inst.word() == RETURN_WORD => Some(TraceEvent::Return {
                from,
                to: engine.program_counter(),
            }),
            0x2 => Some(TraceEvent::Call {
                from,
                to: engine.program_counter(),
            }),
            0xD => Some(TraceEvent::Draw {
                x: retired.vx,
                y: retired.vy,
                rows: inst.n(),
                collision: engine.data_registers()[FLAG_REGISTER] == 1,
            }),
            _ => None,
        }
    }
}

/// Bounded event log. The oldest events are evicted once `capacity` is reached.
#[derive(Debug)]
pub struct Tracer {
    filter: TraceFilter,
    capacity: usize,
    events: VecDeque<TraceEvent>,
    evicted: u64,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(16 * 1024, TraceFilter::default())
    }
}

impl Tracer {
    pub fn new(capacity: usize, filter: TraceFilter) -> Self {
        Self {
            filter,
            capacity: capacity.max(1),
            events: VecDeque::new(),
            evicted: 0,
        }
    }

    pub fn filter(&self) -> TraceFilter {
        self.filter
    }

    /// Events dropped to stay within capacity since the tracer was created.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn record_retired(&mut self, retired: &RetiredInstruction, engine: &Engine) {
        if self.filter.instructions {
            self.push(TraceEvent::Instruction {
                pc: retired.address,
                word: retired.instruction.word(),
            });
        }
        let Some(event) = TraceEvent::control_or_draw(retired, engine) else {
            return;
        };
        let keep = match event {
            TraceEvent::Draw { .. } => self.filter.draws,
            _ => self.filter.control_flow,
        };
        if keep {
            self.push(event);
        }
    }

    fn push(&mut self, event: TraceEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.evicted += 1;
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self, max: usize) -> Vec<TraceEvent> {
        let max = max.min(self.events.len());
        self.events.drain(..max).collect()
    }

    pub fn export_json(&self) -> std::result::Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.events)
    }
}

/// A [`Scheduler`] that runs the engine under a [`Debugger`] and feeds a [`Tracer`].
///
/// A pause suspends [`Engine::resume`] with the program counter on the next instruction to run;
/// the reason is kept in [`DebugHost::last_pause`]. Continuing requires [`Debugger::resume`] or
/// [`Debugger::request_steps`]; a breakpoint the engine is parked on does not fire again.
#[derive(Debug, Default)]
pub struct DebugHost {
    pub debugger: Debugger,
    pub tracer: Tracer,
    last_pause: Option<PauseReason>,
}

impl DebugHost {
    pub fn new(debugger: Debugger, tracer: Tracer) -> Self {
        Self {
            debugger,
            tracer,
            last_pause: None,
        }
    }

    pub fn last_pause(&self) -> Option<PauseReason> {
        self.last_pause
    }

    /// Executes one instruction outside the run lifecycle and traces it. Breakpoints are not
    /// consulted.
    pub fn step(&mut self, engine: &mut Engine) -> Result<Instruction> {
        let inst = engine.step()?;
        if let Some(retired) = engine.last_retired() {
            self.tracer.record_retired(&retired, engine);
        }
        Ok(inst)
    }

    fn suspend(&mut self, reason: PauseReason, pc: u16) -> Yield {
        tracing::debug!(?reason, pc, "debugger paused");
        self.last_pause = Some(reason);
        Yield::Suspend
    }
}

impl Scheduler for DebugHost {
    fn before_exec(&mut self, engine: &Engine) -> Yield {
        let pc = engine.program_counter();
        match self.debugger.before_exec(pc) {
            Some(reason) => self.suspend(reason, pc),
            None => Yield::Continue,
        }
    }

    fn retired(&mut self, engine: &Engine, retired: &RetiredInstruction) {
        self.tracer.record_retired(retired, engine);
    }

    fn yield_point(&mut self, engine: &Engine) -> Yield {
        let pc = engine.program_counter();
        match self.debugger.after_exec(pc) {
            Some(reason) => self.suspend(reason, pc),
            None => Yield::Continue,
        }
    }
}
