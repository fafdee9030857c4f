use thiserror::Error;

/// Errors produced while building environments or configuring planners.
///
/// Planning itself does not fail through this type: a planner that cannot
/// reach the goal returns an empty result, not an error.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed obstacle data at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("robot does not provide a steering function")]
    SteeringUnsupported,
}

pub type Result<T> = std::result::Result<T, PlanError>;
