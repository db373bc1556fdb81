pub mod job;
pub mod proposal;
pub mod user;

use thiserror::Error;

/// A stored enum column held a value this build does not know about.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
