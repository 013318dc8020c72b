use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tally_core::{CategoryId, CategoryMeta, LabelStore, TransactionInfo, UserId};
use tally_suggest::{Oracle, OracleError, SuggestError, suggest};

/// Oracle that always answers with the same text.
struct CannedOracle {
    reply: String,
    calls: AtomicUsize,
}

impl CannedOracle {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Oracle for CannedOracle {
    async fn classify(&self, _prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

fn user() -> UserId {
    UserId::from("u1")
}

fn groceries() -> Vec<CategoryMeta> {
    vec![CategoryMeta::from_pair("Groceries", "c1")]
}

fn groceries_and_clothes() -> Vec<CategoryMeta> {
    vec![
        CategoryMeta::from_pair("Groceries", "c1"),
        CategoryMeta::from_pair("Clothes", "c2"),
    ]
}

fn target() -> TransactionInfo {
    TransactionInfo::new("tx1", "Trader Joe’s", "Trader Joe’s")
}

async fn run(reply: &str, categories: &[CategoryMeta]) -> Result<CategoryMeta, SuggestError> {
    let store = LabelStore::new();
    let oracle = CannedOracle::new(reply);
    suggest(&store, &oracle, &user(), categories, &target()).await
}

/// After apply then update, the label is current and history keeps both categories.
#[test]
fn test_ledger_currency_and_history() {
    let mut store = LabelStore::new();
    let (c, c2) = (CategoryId::from("c"), CategoryId::from("c2"));

    store.apply(user(), "t".into(), "Uniqlo", "Uniqlo", c.clone());
    store.update(user(), "t".into(), c2.clone());

    assert_eq!(store.label(&"t".into()).unwrap().category_id, c2);
    assert!(store.category_history(&c2).contains(&"t".into()));
    assert!(store.category_history(&c).contains(&"t".into()));
}

#[test]
fn test_remove_equals_update_to_reserved() {
    fn at_noon() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(1_760_000_000, 0).unwrap_or_default()
    }
    let mut a = LabelStore::with_clock(at_noon);
    let mut b = LabelStore::with_clock(at_noon);
    for s in [&mut a, &mut b] {
        s.apply(user(), "t".into(), "Target", "Target", "cat_household".into());
    }

    let removed = a.remove(user(), "t".into());
    let updated = b.update(user(), "t".into(), CategoryId::trash());

    assert_eq!(removed, updated);
    assert_eq!(a.label(&"t".into()), b.label(&"t".into()));
}

#[tokio::test]
async fn test_empty_candidates_rejected_without_oracle_call() {
    let store = LabelStore::new();
    let oracle = CannedOracle::new(r#"{"suggestedCategoryId":"c1","suggestedCategoryName":"Groceries"}"#);

    let err = suggest(&store, &oracle, &user(), &[], &target()).await.unwrap_err();

    assert!(matches!(err, SuggestError::EmptyCandidates));
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_canonical_echo_ignores_reply_casing() {
    let got = run(
        r#"{"suggestedCategoryId":"c2","suggestedCategoryName":"CLOTHES"}"#,
        &groceries_and_clothes(),
    )
    .await
    .unwrap();

    assert_eq!(got.name, "Clothes");
    assert_eq!(got.id, CategoryId::from("c2"));
}

#[tokio::test]
async fn test_swap_detected() {
    let err = run(
        r#"{"suggestedCategoryId":"Groceries","suggestedCategoryName":"c1"}"#,
        &groceries(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SuggestError::FieldSwap { .. }));
}

#[tokio::test]
async fn test_unknown_id_lists_allowed_ids() {
    let err = run(
        r#"{"suggestedCategoryId":"c9","suggestedCategoryName":"Groceries"}"#,
        &groceries(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SuggestError::UnknownCategory { ref allowed, .. } if allowed == &["c1"]));
    assert!(err.to_string().contains("c1"));
    assert!(err.is_rejected_reply());
}

#[tokio::test]
async fn test_mismatched_id_and_name() {
    let err = run(
        r#"{"suggestedCategoryId":"c1","suggestedCategoryName":"Clothes"}"#,
        &groceries_and_clothes(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SuggestError::NameMismatch { .. }));
}

#[tokio::test]
async fn test_happy_path_wrapped_in_prose() {
    let got = run(
        "Based on the history, the answer is:\n   {\"suggestedCategoryId\": \"c1\", \"suggestedCategoryName\": \"Groceries\"}  \n",
        &groceries(),
    )
    .await
    .unwrap();

    assert_eq!(got, CategoryMeta::new("c1", "Groceries"));
}
