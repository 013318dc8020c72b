//! Suggestion orchestrator: snapshot -> prompt -> oracle -> validate.
//!
//! The ledger is only borrowed; committing a suggestion is a separate
//! `apply`/`update` by the caller.

use tally_core::{CategoryMeta, LabelStore, TransactionInfo, UserId};
use tracing::{debug, info, warn};

use crate::error::SuggestError;
use crate::history::build_history_snapshot;
use crate::oracle::Oracle;
use crate::prompt::build_suggest_prompt;
use crate::response::parse_suggest_response;

/// Ask the oracle for the single best category for `target`.
///
/// Fails with [`SuggestError::EmptyCandidates`] before any oracle call when
/// `categories` is empty. Oracle failures and rejected replies are returned
/// as-is; nothing is retried.
pub async fn suggest(
    store: &LabelStore,
    oracle: &dyn Oracle,
    user_id: &UserId,
    categories: &[CategoryMeta],
    target: &TransactionInfo,
) -> Result<CategoryMeta, SuggestError> {
    let prompt = render_prompt(store, user_id, categories, target)?;

    info!(
        user_id = %user_id,
        tx_id = %target.id(),
        candidates = categories.len(),
        "requesting category suggestion"
    );
    debug!(prompt_len = prompt.len(), "prompt rendered");

    let reply = oracle.classify(&prompt).await.inspect_err(|e| {
        warn!(tx_id = %target.id(), error = %e, "oracle call failed");
    })?;
    debug!(reply = %reply, "oracle replied");

    let chosen = parse_suggest_response(&reply, categories).inspect_err(|e| {
        warn!(tx_id = %target.id(), error = %e, "oracle reply rejected");
    })?;

    info!(
        tx_id = %target.id(),
        category_id = %chosen.id,
        category = %chosen.name,
        "suggestion accepted"
    );
    Ok(chosen)
}

/// Render the prompt `suggest` would send, without calling the oracle.
pub fn render_prompt(
    store: &LabelStore,
    user_id: &UserId,
    categories: &[CategoryMeta],
    target: &TransactionInfo,
) -> Result<String, SuggestError> {
    if categories.is_empty() {
        return Err(SuggestError::EmptyCandidates);
    }
    let history = build_history_snapshot(store, categories);
    Ok(build_suggest_prompt(user_id, categories, &history, target))
}
