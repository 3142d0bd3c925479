use thiserror::Error;

/// Failure of a single call to an upstream collaborator.
///
/// None of these abort a run on their own: the aggregator turns them into
/// degraded fields and the evaluator turns them into skipped matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable {
        service: &'static str,
        reason: String,
    },

    #[error("{service} returned a malformed response: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },
}

impl FetchError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            reason: reason.into(),
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable { service, .. } | Self::MalformedResponse { service, .. } => {
                service
            }
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
