use thiserror::Error;

use crate::calc::CalcError;
use crate::catalog::CatalogError;
use crate::input::ParseError;

/// Recoverable faults inside one dialogue step. The state machine resolves
/// all of these to re-prompts itself; the taxonomy exists so call sites and
/// logs can tell the cases apart.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("free text did not match the expected shape: {0}")]
    Validation(#[from] ParseError),
    #[error(transparent)]
    CatalogLookup(#[from] CatalogError),
    #[error(transparent)]
    InvalidDimensions(#[from] CalcError),
    #[error("event shape does not match the current phase")]
    UnexpectedEvent,
    #[error("selection list is locked once dimensions are being collected")]
    MaterialsLocked,
}

/// Faults outside the dialogue domain: transport, configuration, processing
/// infrastructure. Nothing here is fatal to the process.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("conversation worker fault: {0}")]
    WorkerFault(String),
}

impl ApplicationError {
    /// Message safe to show the user; details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "That input could not be processed. Please try again.",
            Self::Transport(_) => "The message could not be delivered. Please retry shortly.",
            Self::Configuration(_) | Self::WorkerFault(_) => {
                "Something went wrong on our side. Please send /start and try again."
            }
        }
    }
}
