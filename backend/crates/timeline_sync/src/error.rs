use crate::item::{ItemId, RenderKey};
use crate::time::TimeMs;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("invalid window: start {start} must be before end {end}")]
    InvalidWindow { start: TimeMs, end: TimeMs },
    /// The client referenced a render key the server no longer knows.
    #[error("unknown render key '{0}'")]
    KeyNotFound(RenderKey),
    #[error("invalid pin state for item '{id}' (pinned: {pinned})")]
    InvalidPinState { id: ItemId, pinned: bool },
    #[error("{0} is not supported by the active item provider")]
    UnsupportedOperation(&'static str),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
