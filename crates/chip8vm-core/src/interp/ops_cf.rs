use crate::decode::Instruction;
use crate::error::Result;
use crate::state::MachineState;

use super::{ExecContext, Next};

const CLEAR_SCREEN: u16 = 0x00E0;
const RETURN: u16 = 0x00EE;

#[inline]
fn skip_if(cond: bool) -> Next {
    if cond {
        Next::Skip
    } else {
        Next::Continue
    }
}

/// `00E0` clear, `00EE` return. Any other `0NNN` (native machine-code call) is a no-op.
pub(super) fn op_system(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    match inst.word() {
        CLEAR_SCREEN => {
            state.framebuffer.clear();
            Ok(Next::Continue)
        }
        RETURN => {
            let call_site = state.pop_return()?;
            Ok(Next::Jump(call_site.wrapping_add(2)))
        }
        _ => Ok(Next::Continue),
    }
}

/// `1NNN`
pub(super) fn op_jump(
    _state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    Ok(Next::Jump(inst.nnn()))
}

/// `2NNN`: the stack holds the address of the call itself; return resumes two bytes later.
pub(super) fn op_call(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    state.push_return(state.pc)?;
    Ok(Next::Jump(inst.nnn()))
}

/// `3XNN`
pub(super) fn op_skip_eq_imm(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    Ok(skip_if(state.v[inst.x()] == inst.nn()))
}

/// `4XNN`
pub(super) fn op_skip_ne_imm(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    Ok(skip_if(state.v[inst.x()] != inst.nn()))
}

/// `5XY0`; the low nibble is not checked.
pub(super) fn op_skip_eq_reg(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    Ok(skip_if(state.v[inst.x()] == state.v[inst.y()]))
}

/// `9XY0`
pub(super) fn op_skip_ne_reg(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    Ok(skip_if(state.v[inst.x()] != state.v[inst.y()]))
}

/// `BNNN`. The target is not masked; landing past memory halts the run.
pub(super) fn op_jump_offset(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    Ok(Next::Jump(inst.nnn() + u16::from(state.v[0])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::EngineError;
    use crate::state::{PROGRAM_ORIGIN, STACK_DEPTH};

    fn exec(state: &mut MachineState, word: u16) -> Result<Next> {
        let mut ctx = ExecContext::new(&EngineConfig::default().with_rng_seed(0));
        let inst = Instruction(word);
        super::super::PRIMARY[usize::from(inst.opcode())](state, &mut ctx, inst)
    }

    #[test]
    fn call_then_return_resumes_after_call_site() {
        let mut state = MachineState::new();
        assert_eq!(exec(&mut state, 0x2400).unwrap(), Next::Jump(0x400));
        assert_eq!(state.stack[0], PROGRAM_ORIGIN);
        assert_eq!(state.sp, 1);

        state.pc = 0x400;
        assert_eq!(
            exec(&mut state, RETURN).unwrap(),
            Next::Jump(PROGRAM_ORIGIN + 2)
        );
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn seventeenth_nested_call_overflows() {
        let mut state = MachineState::new();
        for _ in 0..STACK_DEPTH {
            exec(&mut state, 0x2200).unwrap();
        }
        let err = exec(&mut state, 0x2200).unwrap_err();
        assert!(matches!(err, EngineError::StackOverflow { depth: 16, .. }));
    }

    #[test]
    fn return_with_empty_stack_underflows() {
        let mut state = MachineState::new();
        let err = exec(&mut state, RETURN).unwrap_err();
        assert_eq!(err, EngineError::StackUnderflow { pc: PROGRAM_ORIGIN });
    }

    #[test]
    fn clear_screen_blanks_framebuffer() {
        let mut state = MachineState::new();
        state.framebuffer.flip(10, 10);
        assert_eq!(exec(&mut state, CLEAR_SCREEN).unwrap(), Next::Continue);
        assert_eq!(state.framebuffer.lit_count(), 0);
    }

    #[test]
    fn register_skips() {
        let mut state = MachineState::new();
        state.v[1] = 7;
        state.v[2] = 7;
        state.v[3] = 8;
        assert_eq!(exec(&mut state, 0x5120).unwrap(), Next::Skip);
        assert_eq!(exec(&mut state, 0x5130).unwrap(), Next::Continue);
        assert_eq!(exec(&mut state, 0x9130).unwrap(), Next::Skip);
        assert_eq!(exec(&mut state, 0x9120).unwrap(), Next::Continue);
    }

    #[test]
    fn jump_offset_adds_v0_without_masking() {
        let mut state = MachineState::new();
        state.v[0] = 0xFF;
        assert_eq!(exec(&mut state, 0xBFFF).unwrap(), Next::Jump(0x10FE));
    }
}
