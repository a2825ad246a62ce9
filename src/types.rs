//! Shared result and outcome types for the addbit application.
use crate::{Bit, BitDraft, BitError};

/// A specialized Result type for addbit operations.
pub type Result<T> = std::result::Result<T, BitError>;

/// How an edit session ended
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The edited file parsed into a valid draft
    Confirmed(BitDraft),
    /// The user declined to fix an invalid edit
    Aborted,
}

/// How a full run of the application ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A bit was prepended to the store
    Added(Bit),
    /// No input was given
    NothingToDo,
    /// The user backed out before anything was written
    Aborted,
}
