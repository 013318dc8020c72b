//! tally-suggest: history snapshot, prompt builder, reply validator and the
//! suggestion orchestrator around an external classification oracle

pub mod error;
pub mod history;
pub mod normalize;
pub mod oracle;
pub mod prompt;
pub mod response;
pub mod suggest;

pub use error::{OracleError, SuggestError};
pub use history::{CategoryHistory, build_history_snapshot};
pub use normalize::normalize_keywords;
pub use oracle::Oracle;
pub use prompt::build_suggest_prompt;
pub use response::parse_suggest_response;
pub use suggest::{render_prompt, suggest};
