//! Error types for card operations.

use thiserror::Error;

/// Result type for card operations.
pub type CardResult<T> = Result<T, CardError>;

/// Errors that can occur in card operations.
#[derive(Debug, Error)]
pub enum CardError {
    /// The name field is empty.
    #[error("Name is required")]
    EmptyName,

    /// A card cannot carry an empty wish.
    #[error("Wish text must not be empty")]
    EmptyWish,

    /// Photo scale outside the supported range.
    #[error("Image scale {0} is outside 0.5..=2.5")]
    InvalidScale(f32),

    /// No card has been generated yet.
    #[error("No card has been generated yet")]
    NoCard,

    /// Another generate or export action is still running.
    #[error("Another action is in progress: {0}")]
    Busy(&'static str),

    /// A finishing action arrived without its matching start.
    #[error("No {0} action is in progress")]
    NotInProgress(&'static str),
}
