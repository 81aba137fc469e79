//! CHIP-8 execution engine with an attached debugger host.
//!
//! The engine itself lives in `chip8vm-core`; this crate re-exports it together with the
//! breakpoint and tracing support from `chip8vm-debug`.

pub use chip8vm_core::*;
pub use chip8vm_debug as debug;
