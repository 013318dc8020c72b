use thiserror::Error;

/// Failure reaching or talking to the classification oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("missing API key for {0}")]
    MissingApiKey(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("oracle did not answer within {0}s")]
    Timeout(u64),
}

/// Every way a suggestion request can fail.
///
/// Validation variants are ordered the way the reply is checked; the first
/// check that fails decides the variant.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("no candidate categories supplied")]
    EmptyCandidates,

    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("invalid field in oracle response: {0}")]
    InvalidField(String),

    #[error("response appears to have swapped name/id fields (id='{id}')")]
    FieldSwap { id: String },

    #[error("no matching category for id \"{id}\"; expected one of: [{}]", allowed.join(", "))]
    UnknownCategory { id: String, allowed: Vec<String> },

    #[error(
        "name/id mismatch: got id=\"{id}\" name=\"{name}\", but canonical name for that id is \"{canonical}\""
    )]
    NameMismatch {
        id: String,
        name: String,
        canonical: String,
    },
}

impl SuggestError {
    /// True for failures caused by the content of the oracle's reply, as
    /// opposed to bad input or a failed call.
    pub fn is_rejected_reply(&self) -> bool {
        !matches!(self, SuggestError::EmptyCandidates | SuggestError::Oracle(_))
    }
}
