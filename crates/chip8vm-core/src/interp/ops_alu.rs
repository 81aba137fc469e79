//! Register loads and the `8XYN` arithmetic family.
//!
//! Flag-producing operations compute their result from the operands first, write the
//! destination, and write `VF` last. With `X == F` the register therefore ends up holding the
//! flag, not the arithmetic result.

use rand::Rng;

use crate::config::ShiftSource;
use crate::decode::Instruction;
use crate::error::Result;
use crate::state::MachineState;

use super::{ExecContext, Next};

/// `6XNN`
pub(super) fn op_load_imm(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    state.v[inst.x()] = inst.nn();
    Ok(Next::Continue)
}

/// `7XNN`. Wraps without touching `VF`, unlike `8XY4`.
pub(super) fn op_add_imm(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let x = inst.x();
    state.v[x] = state.v[x].wrapping_add(inst.nn());
    Ok(Next::Continue)
}

/// `ANNN`
pub(super) fn op_load_index(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    state.i = inst.nnn();
    Ok(Next::Continue)
}

/// `CXNN`
pub(super) fn op_random(
    state: &mut MachineState,
    ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let byte: u8 = ctx.rng.gen();
    state.v[inst.x()] = byte & inst.nn();
    Ok(Next::Continue)
}

/// `8XY0`
pub(super) fn op_move(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    state.v[inst.x()] = state.v[inst.y()];
    Ok(Next::Continue)
}

/// `8XY1`
pub(super) fn op_or(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    state.v[inst.x()] |= state.v[inst.y()];
    Ok(Next::Continue)
}

/// `8XY2`
pub(super) fn op_and(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    state.v[inst.x()] &= state.v[inst.y()];
    Ok(Next::Continue)
}

/// `8XY3`
pub(super) fn op_xor(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    state.v[inst.x()] ^= state.v[inst.y()];
    Ok(Next::Continue)
}

/// `8XY4`: `VF` = carry out of bit 7.
pub(super) fn op_add_carry(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let (sum, carry) = state.v[inst.x()].overflowing_add(state.v[inst.y()]);
    state.v[inst.x()] = sum;
    state.set_flag(carry);
    Ok(Next::Continue)
}

/// `8XY5`: `VX - VY`. `VF` is 1 when there was *no* borrow.
pub(super) fn op_sub_borrow(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let (diff, borrow) = state.v[inst.x()].overflowing_sub(state.v[inst.y()]);
    state.v[inst.x()] = diff;
    state.set_flag(!borrow);
    Ok(Next::Continue)
}

/// `8XY7`: `VY - VX`, same flag convention as `8XY5`.
pub(super) fn op_sub_reverse_borrow(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let (diff, borrow) = state.v[inst.y()].overflowing_sub(state.v[inst.x()]);
    state.v[inst.x()] = diff;
    state.set_flag(!borrow);
    Ok(Next::Continue)
}

#[inline]
fn shift_operand(state: &MachineState, ctx: &ExecContext, inst: Instruction) -> u8 {
    match ctx.shift_source {
        ShiftSource::Vx => state.v[inst.x()],
        ShiftSource::Vy => state.v[inst.y()],
    }
}

/// `8XY6`: `VF` gets the bit shifted out.
pub(super) fn op_shift_right(
    state: &mut MachineState,
    ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let src = shift_operand(state, ctx, inst);
    state.v[inst.x()] = src >> 1;
    state.set_flag(src & 0x01 != 0);
    Ok(Next::Continue)
}

/// `8XYE`: `VF` gets the bit shifted out.
pub(super) fn op_shift_left(
    state: &mut MachineState,
    ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let src = shift_operand(state, ctx, inst);
    state.v[inst.x()] = src << 1;
    state.set_flag(src & 0x80 != 0);
    Ok(Next::Continue)
}
