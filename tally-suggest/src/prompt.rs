//! Deterministic prompt rendering for one classification request.
//!
//! The same inputs always produce the same bytes. Every candidate category is
//! listed with its id and its full history block; nothing is elided.

use tally_core::{CategoryMeta, TransactionInfo, UserId};

use crate::history::CategoryHistory;
use crate::normalize::normalize_keywords;

/// JSON key the oracle must use for the chosen category id.
pub const ID_FIELD: &str = "suggestedCategoryId";
/// JSON key the oracle must use for the chosen category name.
pub const NAME_FIELD: &str = "suggestedCategoryName";

const NO_HISTORY: &str = "(no prior transactions)";

const INSTRUCTIONS: &str = "\
You classify ONE bank transaction into exactly ONE of the user's categories.

Transaction text is noisy. Merchant and name fields may contain:
- Card processor prefixes or suffixes such as \"SQ *\", \"TST*\", \"DD *\", \"POS\", \"AUTH\", \"ONLINE\".
- Uppercase text, punctuation, store numbers and truncated words.
- Delivery aggregators (DoorDash, Grubhub, UberEats) that wrap an underlying restaurant.

Rules:
1) Pick exactly one category from CATEGORIES below. Never invent a category.
2) Match on normalized keywords: drop \"SQ*\", \"TST*\", \"POS\", stray \"*\", punctuation and repeated whitespace before comparing merchant/name text with the history.
3) If the keywords match history in more than one category, prefer the category with the strongest exact or near keyword match. If that is still tied, prefer the category with more matching historical examples.
4) If no history matches well, pick the category whose NAME fits the transaction best (for example a coffee chain belongs in \"Coffee Shops\" rather than \"Restaurants\").
5) Delivery aggregators (DoorDash, Grubhub, UberEats) go to the takeout/delivery category (e.g. \"Takeout / Delivery\") unless the history for that specific restaurant clearly points elsewhere.
6) Transit keywords or brands (MBTA, MTA, subway, LYFT/UBER rides) go to the transit category (e.g. \"Transit\").
7) Do not explain. Reply with the JSON object only.";

/// Render the classification prompt.
///
/// `history` is expected in the same order as `categories` (as produced by
/// [`build_history_snapshot`](crate::history::build_history_snapshot)).
pub fn build_suggest_prompt(
    user_id: &UserId,
    categories: &[CategoryMeta],
    history: &[CategoryHistory<'_>],
    tx: &TransactionInfo,
) -> String {
    let categories_block = categories
        .iter()
        .map(|c| format!("- {}: {}", c.id, c.name))
        .collect::<Vec<_>>()
        .join("\n");

    let history_block = categories
        .iter()
        .map(|c| render_history(c, history))
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = String::new();
    out.push_str(INSTRUCTIONS);
    out.push_str("\n\nUSER: ");
    out.push_str(user_id.as_str());

    out.push_str("\n\nCATEGORIES (id: name):\n");
    out.push_str(&categories_block);

    out.push_str("\n\nFULL CATEGORY HISTORY (previously labeled transactions):\n");
    out.push_str(&history_block);

    out.push_str("\n\nTRANSACTION TO CLASSIFY (noisy, normalize before matching):\n");
    out.push_str(&format!(
        "{{ \"id\": {}, \"merchant\": {}, \"name\": {} }}\n",
        quoted(tx.id().as_str()),
        quoted(tx.merchant()),
        quoted(tx.name()),
    ));
    out.push_str(&format!(
        "Normalized keywords: merchant={} name={}\n",
        quoted(&normalize_keywords(tx.merchant())),
        quoted(&normalize_keywords(tx.name())),
    ));

    out.push_str("\nReturn ONLY this JSON, copying the id and name exactly as listed in CATEGORIES:\n");
    out.push_str(&format!(
        "{{\n  \"{ID_FIELD}\": \"<one existing category id>\",\n  \"{NAME_FIELD}\": \"<that category's name as listed above>\"\n}}"
    ));
    out
}

fn render_history(category: &CategoryMeta, history: &[CategoryHistory<'_>]) -> String {
    let items = history
        .iter()
        .find(|h| h.category.id == category.id)
        .map(|h| h.transactions.as_slice())
        .unwrap_or(&[]);

    let header = format!("• {} ({}):", category.name, category.id);
    if items.is_empty() {
        return format!("{header} {NO_HISTORY}");
    }

    let lines = items
        .iter()
        .map(|info| format!("  - {} | {}", quoted(info.merchant()), info.name()))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{header}\n{lines}")
}

/// JSON string literal, so quotes inside transaction text cannot break the layout.
fn quoted(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::build_history_snapshot;
    use tally_core::LabelStore;

    fn seeded() -> (LabelStore, Vec<CategoryMeta>) {
        let mut store = LabelStore::new();
        let user = UserId::from("u2");
        store.apply(user.clone(), "p1".into(), "Blue Bottle Coffee", "Blue Bottle", "cat_coffee".into());
        store.apply(user, "p5".into(), "DoorDash Sweetgreen", "DoorDash - Sweetgreen", "cat_takeout".into());
        let cats = vec![
            CategoryMeta::new("cat_groceries", "Groceries"),
            CategoryMeta::new("cat_coffee", "Coffee Shops"),
            CategoryMeta::new("cat_takeout", "Takeout / Delivery"),
        ];
        (store, cats)
    }

    fn render(store: &LabelStore, cats: &[CategoryMeta], tx: &TransactionInfo) -> String {
        let history = build_history_snapshot(store, cats);
        build_suggest_prompt(&UserId::from("u2"), cats, &history, tx)
    }

    #[test]
    fn test_lists_every_category_with_id() {
        let (store, cats) = seeded();
        let tx = TransactionInfo::new("t1", "Starbucks #1234", "Starbucks #1234");
        let prompt = render(&store, &cats, &tx);

        assert!(prompt.contains("- cat_groceries: Groceries"));
        assert!(prompt.contains("- cat_coffee: Coffee Shops"));
        assert!(prompt.contains("- cat_takeout: Takeout / Delivery"));
        assert!(prompt.contains("USER: u2"));
    }

    #[test]
    fn test_history_blocks_and_empty_marker() {
        let (store, cats) = seeded();
        let tx = TransactionInfo::new("t1", "Starbucks #1234", "Starbucks #1234");
        let prompt = render(&store, &cats, &tx);

        assert!(prompt.contains("• Groceries (cat_groceries): (no prior transactions)"));
        assert!(prompt.contains("• Coffee Shops (cat_coffee):\n  - \"Blue Bottle\" | Blue Bottle Coffee"));
        assert!(prompt.contains("  - \"DoorDash - Sweetgreen\" | DoorDash Sweetgreen"));
    }

    #[test]
    fn test_encodes_rules_and_reply_shape() {
        let (store, cats) = seeded();
        let tx = TransactionInfo::new("t3", "DoorDash * Shake Shack", "DoorDash * Shake Shack");
        let prompt = render(&store, &cats, &tx);

        assert!(prompt.contains("Never invent a category"));
        assert!(prompt.contains("more matching historical examples"));
        assert!(prompt.contains("\"Coffee Shops\" rather than \"Restaurants\""));
        assert!(prompt.contains("\"Takeout / Delivery\""));
        assert!(prompt.contains("MBTA"));
        assert!(prompt.contains("\"suggestedCategoryId\""));
        assert!(prompt.contains("\"suggestedCategoryName\""));
        assert!(prompt.contains("Do not explain"));
    }

    #[test]
    fn test_target_is_escaped_and_normalized() {
        let (store, cats) = seeded();
        let tx = TransactionInfo::new("t9", "SQ *\"QUOTED\" CAFE", "gosq.com");
        let prompt = render(&store, &cats, &tx);

        assert!(prompt.contains(r#"{ "id": "t9", "merchant": "gosq.com", "name": "SQ *\"QUOTED\" CAFE" }"#));
        assert!(prompt.contains(r#"Normalized keywords: merchant="GOSQ COM" name="QUOTED CAFE""#));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let (store, cats) = seeded();
        let tx = TransactionInfo::new("t2", "Olive Garden", "Olive Garden");
        assert_eq!(render(&store, &cats, &tx), render(&store, &cats, &tx));
    }
}
