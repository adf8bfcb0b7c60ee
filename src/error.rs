//! Error types for the recommendation engine.
//!
//! Each failure class keeps its own variant so the calling boundary can map
//! it to a distinct user-facing message, status code and retry policy.

/// Failures reported by the embedding collaborator.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Input text was empty after trimming.
    #[error("embedding input must not be empty")]
    EmptyInput,

    /// The request never produced an HTTP response.
    #[error("embedding request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("embedding service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not contain a usable vector.
    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

/// Failures reported by a vector index collaborator.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The request never produced an HTTP response.
    #[error("{collection} search request failed: {message}")]
    Transport { collection: String, message: String },

    /// The index answered with a non-success status.
    #[error("{collection} search returned {status}: {body}")]
    Status {
        collection: String,
        status: u16,
        body: String,
    },

    /// The response body could not be parsed.
    #[error("malformed {collection} search response: {message}")]
    Malformed { collection: String, message: String },
}

impl IndexError {
    /// Name of the collection whose search failed.
    pub fn collection(&self) -> &str {
        match self {
            Self::Transport { collection, .. }
            | Self::Status { collection, .. }
            | Self::Malformed { collection, .. } => collection,
        }
    }
}

/// Classified failure of a recommendation request.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// Rejected before any collaborator was called.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// The query could not be turned into a vector.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// One of the two candidate searches failed.
    #[error(transparent)]
    Retrieval(#[from] IndexError),

    /// A collaborator returned data that violates the record contract.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Any other fault. Never raised by the pipeline itself; calling
    /// boundaries use it for their own failures, such as encoding a response.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl RecommendError {
    /// Stable machine-readable code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_REQUEST",
            Self::Embedding(_) => "EMBEDDING_FAILED",
            Self::Retrieval(_) => "SEARCH_FAILED",
            Self::DataIntegrity(_) => "DATA_INTEGRITY",
            Self::Unexpected(_) => "UNKNOWN",
        }
    }

    /// HTTP status the calling boundary should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Retrieval(_) => 503,
            Self::Embedding(_) | Self::DataIntegrity(_) | Self::Unexpected(_) => 500,
        }
    }

    /// Whether a user-initiated retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Retrieval(_))
    }
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, RecommendError>;
