use crate::TransportError;
use serde_json::Value;

/// Failure of a whole search call. The call completes with no results.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{message} ({code})")]
    Api { message: String, code: i64 },
    #[error("Received HTTP code {0}")]
    HttpStatus(u16),
    #[error("Reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{message}")]
    UnexpectedJson { message: String, fragment: Value },
}

impl ProviderError {
    pub(crate) fn unexpected(message: impl Into<String>, fragment: &Value) -> Self {
        ProviderError::UnexpectedJson {
            message: message.into(),
            fragment: fragment.clone(),
        }
    }

    pub fn fragment(&self) -> Option<&Value> {
        match self {
            ProviderError::UnexpectedJson { fragment, .. } => Some(fragment),
            _ => None,
        }
    }
}

/// Failure of a single entry in an otherwise valid reply. The entry is skipped.
#[derive(Debug, thiserror::Error)]
#[error("Invalid Json reply, {message}")]
pub struct ItemError {
    pub message: String,
    pub fragment: Value,
}

impl ItemError {
    pub(crate) fn new(message: impl Into<String>, fragment: &Value) -> Self {
        Self {
            message: message.into(),
            fragment: fragment.clone(),
        }
    }
}
