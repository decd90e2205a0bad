use super::ValueKind;
use compact_str::CompactString;
use thiserror::Error;

/// The recoverable fault category of the engine.
///
/// Raising any of these during a run is caught at the scheduler boundary and
/// permanently disables the owning program; it never escalates to the game
/// as a crash. `MalformedProgram` is set at construction time, before any
/// turn is attempted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("unbound variable `{0}`")]
    UnboundVariable(CompactString),
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("sqrt of negative number {0}")]
    NegativeSqrtArgument(f64),
    #[error("program has no bound worm")]
    UnboundSelf,
    #[error("entity cannot answer `{0}`")]
    WrongEntityCapability(&'static str),
    #[error("statement requires world context")]
    MissingWorldContext,
    #[error("program tree is malformed")]
    MalformedProgram,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::UnboundVariable(_) => "WP001",
            RuntimeError::TypeMismatch { .. } => "WP002",
            RuntimeError::DivisionByZero => "WP003",
            RuntimeError::NegativeSqrtArgument(_) => "WP004",
            RuntimeError::UnboundSelf => "WP005",
            RuntimeError::WrongEntityCapability(_) => "WP006",
            RuntimeError::MissingWorldContext => "WP007",
            RuntimeError::MalformedProgram => "WP008",
        }
    }
}
