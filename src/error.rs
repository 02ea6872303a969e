//! Error types for rs-harvest.
//!
//! Three layers of failure exist:
//! - [`PageError`] is raised by the page-automation driver for a single call.
//! - [`Error`] is the engine's internal taxonomy, used between stages.
//! - [`HarvestFailure`] is the only failure value handed to callers of
//!   [`crate::Harvester::harvest`]; it carries whatever items were gathered
//!   before the fault.

use std::fmt;

use serde::Serialize;

use crate::result::HarvestedItem;

/// Error raised by a [`crate::Page`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// Navigation to a URL failed.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// A selector could not be evaluated.
    #[error("invalid selector `{0}`")]
    Selector(String),

    /// A script or input action failed inside the page.
    #[error("page script failed: {0}")]
    Script(String),

    /// The element handle no longer refers to a live element.
    #[error("stale element handle")]
    StaleHandle,

    /// The page session was closed underneath the engine.
    #[error("page session closed")]
    Closed,

    /// Any other driver failure.
    #[error("{0}")]
    Other(String),
}

impl PageError {
    /// Whether this error ends the whole session.
    ///
    /// Everything except a closed session is scoped to the call that raised it
    /// and is skipped by the extraction pass.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Result type alias for page-driver calls.
pub type PageResult<T> = std::result::Result<T, PageError>;

/// Error raised by a [`crate::ReadinessGate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The external actor gave up on the gate.
    #[error("{0}")]
    Abandoned(String),

    /// The page failed while the gate was polling it.
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Error type for harvest stages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The post URL failed shape validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The readiness gate was abandoned before the page became ready.
    #[error("interaction abandoned: {0}")]
    InteractionTimeout(String),

    /// The page-automation layer failed at session level.
    #[error("session error: {0}")]
    Session(#[from] PageError),
}

impl Error {
    /// The failure category reported to callers.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::InteractionTimeout(_) => FailureKind::InteractionTimeout,
            Self::Session(_) => FailureKind::Session,
        }
    }
}

impl From<GateError> for Error {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Abandoned(reason) => Self::InteractionTimeout(reason),
            GateError::Page(page) => Self::Session(page),
        }
    }
}

/// Result type alias for harvest stages.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure category surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    InvalidInput,
    InteractionTimeout,
    Session,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidInput => "invalid input",
            Self::InteractionTimeout => "interaction timeout",
            Self::Session => "session error",
        };
        f.write_str(name)
    }
}

/// A failed harvest, with any items collected before the failure.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{kind}: {message} ({} partial items)", .partial_items.len())]
pub struct HarvestFailure {
    pub kind: FailureKind,
    pub message: String,
    pub partial_items: Vec<HarvestedItem>,
}

impl HarvestFailure {
    /// Wrap an internal error, keeping the partial items.
    #[must_use]
    pub fn new(error: &Error, partial_items: Vec<HarvestedItem>) -> Self {
        let message = match error {
            Error::InvalidInput(msg) | Error::InteractionTimeout(msg) => msg.clone(),
            Error::Session(page) => page.to_string(),
        };
        Self {
            kind: error.kind(),
            message,
            partial_items,
        }
    }
}
