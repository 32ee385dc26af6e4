use crate::error::Error;

/// Result type alias used throughout vgate.
pub type Result<T> = std::result::Result<T, Error>;
