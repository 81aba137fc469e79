use crate::decode::Instruction;
use crate::error::Result;
use crate::state::MachineState;

use super::{ExecContext, Next};

/// `DXYN`: XOR an 8xN sprite from `memory[I..I + N]` at `(VX, VY)`.
///
/// Both axes wrap. `VF` is set when any lit pixel is turned off. Sprite bytes past the end of
/// memory read as zero.
pub(super) fn op_draw(
    state: &mut MachineState,
    _ctx: &mut ExecContext,
    inst: Instruction,
) -> Result<Next> {
    let origin_x = usize::from(state.v[inst.x()]);
    let origin_y = usize::from(state.v[inst.y()]);
    let base = usize::from(state.i);

    let mut collision = false;
    for row in 0..usize::from(inst.n()) {
        let bits = state.read_u8(base + row);
        for col in 0..8 {
            if bits & (0x80 >> col) == 0 {
                continue;
            }
            collision |= state.framebuffer.flip(origin_x + col, origin_y + row);
        }
    }

    state.set_flag(collision);
    Ok(Next::Continue)
}
