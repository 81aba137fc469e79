use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the execution engine.
///
/// Unrecognised instructions dispatch to the no-op handler and never produce an error. A program
/// counter past the end of memory is how a run halts, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("stack overflow: call at {pc:#05x} with {depth} return addresses already pushed")]
    StackOverflow { pc: u16, depth: usize },

    #[error("stack underflow: return at {pc:#05x} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("data register index {index} out of range (expected 0..16)")]
    RegisterOutOfRange { index: usize },

    #[error("program of {len} bytes at origin {origin:#05x} does not fit in {capacity} bytes of memory")]
    ProgramTooLarge {
        origin: u16,
        len: usize,
        capacity: usize,
    },

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}
