//! Built-in demo scenarios: seed a ledger, then ask for one suggestion per
//! target transaction.

use tally_core::{CategoryMeta, LabelStore, TransactionInfo, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Clearly separated categories
    Clear,
    /// Coffee vs restaurants vs delivery
    Subtle,
    /// Many categories with near-collisions
    ManyCategories,
    /// Raw statement strings with processor noise
    Realistic,
}

/// (name, id)
type Cat = (&'static str, &'static str);
/// (tx_id, name, merchant, category_id)
type Prior = (&'static str, &'static str, &'static str, &'static str);
/// (tx_id, name, merchant)
type Target = (&'static str, &'static str, &'static str);

struct Fixture {
    title: &'static str,
    user: &'static str,
    categories: &'static [Cat],
    prior: &'static [Prior],
    targets: &'static [Target],
}

static CLEAR: Fixture = Fixture {
    title: "CLEARLY SEPARATED CATEGORIES",
    user: "u1",
    categories: &[
        ("Groceries", "cat_groceries"),
        ("Clothes", "cat_clothes"),
        ("Utilities", "cat_utilities"),
    ],
    prior: &[
        ("rx1", "Whole Foods", "Whole Foods", "cat_groceries"),
        ("rx2", "H&M", "H&M", "cat_clothes"),
        ("rx3", "Electricity", "Eversource", "cat_utilities"),
    ],
    targets: &[
        ("tx1", "Trader Joe’s", "Trader Joe’s"),
        ("tx2", "Uniqlo", "Uniqlo"),
        ("tx3", "National Grid", "National Grid"),
    ],
};

static SUBTLE: Fixture = Fixture {
    title: "SUBTLE FOOD DISTINCTIONS",
    user: "u2",
    categories: &[
        ("Groceries", "cat_groceries"),
        ("Coffee Shops", "cat_coffee"),
        ("Restaurants", "cat_restaurants"),
        ("Takeout / Delivery", "cat_takeout"),
    ],
    prior: &[
        ("p1", "Blue Bottle Coffee", "Blue Bottle", "cat_coffee"),
        ("p2", "Starbucks order", "Starbucks", "cat_coffee"),
        ("p3", "Chipotle dine-in", "Chipotle", "cat_restaurants"),
        ("p4", "Trader Joe’s groceries", "Trader Joe’s", "cat_groceries"),
        ("p5", "DoorDash Sweetgreen", "DoorDash - Sweetgreen", "cat_takeout"),
    ],
    targets: &[
        ("t1", "Starbucks #1234", "Starbucks #1234"),
        ("t2", "Olive Garden", "Olive Garden"),
        ("t3", "DoorDash * Shake Shack", "DoorDash * Shake Shack"),
        ("t4", "Whole Foods Market", "Whole Foods Market"),
        ("t5", "Trader Joe’s Coffee Bar", "Trader Joe’s Coffee Bar"),
    ],
};

static MANY_CATEGORIES: Fixture = Fixture {
    title: "MANY CATEGORIES + NEAR-COLLISIONS",
    user: "u3",
    categories: &[
        ("Groceries", "cat_groceries"),
        ("HouseHold Supplies", "cat_household"),
        ("Home Improvement", "cat_homeImprove"),
        ("Transit", "cat_transit"),
        ("Health & Pharmacy", "cat_health"),
        ("Entertainment", "cat_entertain"),
        ("Miscellaneous", "cat_misc"),
    ],
    prior: &[
        ("tx1", "Ibuprofen", "CVS Pharmacy", "cat_health"),
        ("tx2", "Home Depot", "Home Depot", "cat_homeImprove"),
        ("tx3", "Wood", "Lowe’s", "cat_homeImprove"),
        ("tx4", "Target", "Target", "cat_household"),
        ("tx5", "Containers", "Amazon Pantry", "cat_groceries"),
        ("tx6", "Superman", "AMC Theatres", "cat_entertain"),
        ("tx7", "MTA ticket", "MTA", "cat_transit"),
    ],
    targets: &[
        ("m1", "Home Depot", "Home Depot"),
        ("m2", "Target", "Target"),
        ("m3", "Ace Hardware", "Ace Hardware"),
        ("m4", "Lyft * Ride", "Lyft * Ride"),
        ("m5", "Steam Purchase", "Steam Purchase"),
        ("m6", "Walmart Supercenter", "Walmart Supercenter"),
        ("m7", "Walgreens", "Walgreens"),
    ],
};

static REALISTIC: Fixture = Fixture {
    title: "REALISTIC CATEGORIES FROM BANK STATEMENTS",
    user: "u3",
    categories: &[
        ("Groceries", "cat_groceries"),
        ("Coffee Shops", "cat_coffee"),
        ("Restaurants", "cat_restaurants"),
        ("Takeout / Delivery", "cat_takeout"),
        ("Transit", "cat_transit"),
        ("Health & Pharmacy", "cat_health"),
        ("Miscellaneous", "cat_misc"),
    ],
    prior: &[
        ("tx1", "CHIPOTLE MEX GR ONLINE", "TEAM-BANKING@CA", "cat_health"),
        ("tx2", "TUFTS DENTAL CLINICS ", "TUFTS DENTAL CLINICS", "cat_health"),
        ("tx3", "Time Out Market Boston", "Boston MA", "cat_restaurants"),
        ("tx4", "LYFT *RIDE SAT 5PM ", "LYFT.COM", "cat_transit"),
        ("tx5", " SQ *PRALINE FRENCH PATISS", "PATISSCambridge", "cat_coffee"),
        ("tx6", "SQ *BLUE BOTTLE COFFEE", "gosq.com", "cat_coffee"),
        ("tx7", " DD *SOBOL", "DOORDASH.COM", "cat_takeout"),
    ],
    targets: &[
        ("m1", "SQ *PEPITA COFFEE CO.", "*PEPITA COFFEE CO"),
        ("m2", "Target", "Target"),
        ("m3", "MBTA-550008588372 ", "MBTA Boston"),
        ("m4", "Lyft * Ride", "Lyft * Ride"),
        ("m5", "TST* TATTE BAKERY", "BACK BABOSTON"),
        ("m6", "RICHDALE FOOD SHOP", "RICHDALE FOOD SHOP"),
        ("m7", "NESPRESSO USA", "NESPRESSO.COMNY"),
    ],
};

/// A seeded ledger plus the transactions to classify against it.
pub struct DemoRun {
    pub title: &'static str,
    pub user: UserId,
    pub store: LabelStore,
    pub categories: Vec<CategoryMeta>,
    pub targets: Vec<TransactionInfo>,
}

impl Scenario {
    fn fixture(self) -> &'static Fixture {
        match self {
            Scenario::Clear => &CLEAR,
            Scenario::Subtle => &SUBTLE,
            Scenario::ManyCategories => &MANY_CATEGORIES,
            Scenario::Realistic => &REALISTIC,
        }
    }

    pub fn build(self) -> DemoRun {
        let f = self.fixture();
        let user = UserId::from(f.user);

        let mut store = LabelStore::new();
        for &(tx_id, name, merchant, category_id) in f.prior {
            store.apply(user.clone(), tx_id.into(), name, merchant, category_id.into());
        }

        DemoRun {
            title: f.title,
            user,
            store,
            categories: f.categories.iter().map(|&(name, id)| CategoryMeta::from_pair(name, id)).collect(),
            targets: f
                .targets
                .iter()
                .map(|&(id, name, merchant)| TransactionInfo::new(id, name, merchant))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_every_scenario_seeds_known_categories() {
        for scenario in Scenario::value_variants() {
            let run = scenario.build();
            assert!(!run.categories.is_empty());
            assert!(!run.targets.is_empty());
            for label in run.store.labels() {
                assert!(
                    run.categories.iter().any(|c| c.id == label.category_id),
                    "{:?}: label {} points outside the candidate list",
                    scenario,
                    label.transaction_id
                );
            }
        }
    }

    #[test]
    fn test_realistic_has_history_for_coffee() {
        let run = Scenario::Realistic.build();
        assert_eq!(run.store.category_history(&"cat_coffee".into()).len(), 2);
        assert_eq!(run.user.as_str(), "u3");
    }

    #[test]
    fn test_cli_names() {
        assert!(Scenario::from_str("many-categories", true).is_ok());
        assert!(Scenario::from_str("realistic", true).is_ok());
    }
}
