//! Pricing engine.
//!
//! Every priced resource selects a base rate from a [`RateTable`] using one
//! of its attributes (kind, size, style or experience), multiplies it by a
//! quantity where the resource has one, and adds the provider's flat
//! upcharge. All arithmetic is done on [`Decimal`] so that prices recomputed
//! on every read never drift.

use rust_decimal::Decimal;
use tracing::debug;

/// A fixed lookup from discriminator to base rate.
///
/// Rates are stored in cents. Discriminators that are not in the table
/// resolve to the table's default tier instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct RateTable {
    name: &'static str,
    default_tier: &'static str,
    tiers: &'static [(&'static str, i64)],
}

/// A tier resolved from a [`RateTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    /// Name of the tier the rate came from.
    pub name: &'static str,
    /// Base rate for one unit.
    pub rate: Decimal,
    /// Whether the discriminator was unknown and the default tier was used.
    pub fallback: bool,
}

impl RateTable {
    /// Declare a rate table. `tiers` holds `(name, cents)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if `default_tier` is not one of `tiers`. For the tables
    /// declared as constants this fails the build.
    pub const fn new(
        name: &'static str,
        default_tier: &'static str,
        tiers: &'static [(&'static str, i64)],
    ) -> Self {
        assert!(has_tier(tiers, default_tier), "default tier missing from rate table");
        Self {
            name,
            default_tier,
            tiers,
        }
    }

    /// Name of the table, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the tier used for unknown discriminators.
    pub fn default_tier(&self) -> &'static str {
        self.default_tier
    }

    /// Look a discriminator up without falling back.
    ///
    /// Matching ignores ASCII case and surrounding whitespace.
    pub fn lookup(&self, discriminator: &str) -> Option<Tier> {
        let wanted = discriminator.trim();
        self.tiers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|&(name, cents)| Tier {
                name,
                rate: Decimal::new(cents, 2),
                fallback: false,
            })
    }

    /// Resolve a discriminator, falling back to the default tier.
    pub fn resolve(&self, discriminator: &str) -> Tier {
        if let Some(tier) = self.lookup(discriminator) {
            return tier;
        }

        debug!(
            table = self.name,
            discriminator,
            default_tier = self.default_tier,
            "Unknown discriminator, using default tier"
        );
        // `new` guarantees the default tier exists.
        let rate = self
            .lookup(self.default_tier)
            .map(|tier| tier.rate)
            .unwrap_or_default();
        Tier {
            name: self.default_tier,
            rate,
            fallback: true,
        }
    }

    /// Base rate for one unit of `discriminator`.
    pub fn base_rate(&self, discriminator: &str) -> Decimal {
        self.resolve(discriminator).rate
    }

    /// All tiers in declaration order.
    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.tiers.iter().map(|&(name, cents)| Tier {
            name,
            rate: Decimal::new(cents, 2),
            fallback: false,
        })
    }
}

const fn has_tier(tiers: &[(&str, i64)], wanted: &str) -> bool {
    let wanted = wanted.as_bytes();
    let mut i = 0;
    while i < tiers.len() {
        let name = tiers[i].0.as_bytes();
        if name.len() == wanted.len() {
            let mut j = 0;
            while j < name.len() && name[j] == wanted[j] {
                j += 1;
            }
            if j == name.len() {
                return true;
            }
        }
        i += 1;
    }
    false
}

/// Price `quantity` units of `discriminator` and add the flat upcharge.
///
/// ```
/// use hw_provider::pricing::{compute_price, TABLES};
/// use rust_decimal::Decimal;
///
/// let price = compute_price(&TABLES, "premium", 25, Decimal::new(150, 2));
/// assert_eq!(price.to_string(), "1251.50");
/// ```
pub fn compute_price(
    table: &RateTable,
    discriminator: &str,
    quantity: u32,
    upcharge: Decimal,
) -> Decimal {
    table.base_rate(discriminator) * Decimal::from(quantity) + upcharge
}

/// Price a single unit of `discriminator`, upcharge included.
pub fn unit_price(table: &RateTable, discriminator: &str, upcharge: Decimal) -> Decimal {
    compute_price(table, discriminator, 1, upcharge)
}

/// Bread, by kind.
pub const BREAD: RateTable = RateTable::new(
    "bread",
    "white",
    &[
        ("white", 100),
        ("wheat", 125),
        ("rye", 150),
        ("sourdough", 175),
        ("ciabatta", 200),
    ],
);

/// Meat, by kind.
pub const MEAT: RateTable = RateTable::new(
    "meat",
    "ham",
    &[
        ("ham", 300),
        ("turkey", 325),
        ("salami", 350),
        ("roast_beef", 400),
        ("pastrami", 450),
        ("corned_beef", 450),
    ],
);

/// Cheese slices, by kind.
pub const CHEESE: RateTable = RateTable::new(
    "cheese",
    "american",
    &[
        ("american", 50),
        ("cheddar", 75),
        ("swiss", 75),
        ("provolone", 80),
        ("pepper_jack", 90),
    ],
);

/// Condiment catalog.
pub const CONDIMENTS: RateTable = RateTable::new(
    "condiments",
    "mustard",
    &[
        ("mustard", 0),
        ("mayonnaise", 0),
        ("ketchup", 0),
        ("pickles", 25),
        ("jalapenos", 35),
        ("avocado", 150),
    ],
);

/// Drinks, by kind.
pub const DRINK: RateTable = RateTable::new(
    "drink",
    "soda",
    &[
        ("water", 100),
        ("soda", 150),
        ("iced_tea", 175),
        ("lemonade", 200),
        ("coffee", 200),
        ("juice", 250),
    ],
);

/// Chips, by bag size.
pub const CHIPS: RateTable = RateTable::new(
    "chips",
    "small",
    &[("small", 100), ("medium", 150), ("large", 225)],
);

/// Per cracker.
pub const CRACKERS: RateTable = RateTable::new(
    "crackers",
    "saltine",
    &[("saltine", 10), ("oyster", 15), ("graham", 25)],
);

/// Per napkin.
pub const NAPKINS: RateTable = RateTable::new(
    "napkins",
    "paper",
    &[("paper", 2), ("recycled", 5), ("cloth", 50)],
);

/// Per set.
pub const SILVERWARE: RateTable = RateTable::new(
    "silverware",
    "plastic",
    &[("plastic", 10), ("compostable", 20), ("metal", 150)],
);

/// Carry-out bags, by style.
pub const BAG: RateTable = RateTable::new(
    "bag",
    "paper",
    &[("paper", 10), ("plastic", 5), ("reusable", 150)],
);

/// Hourly wage.
pub const COOK: RateTable = RateTable::new(
    "cook",
    "junior",
    &[
        ("junior", 1500),
        ("intermediate", 2000),
        ("senior", 2800),
        ("master", 4000),
    ],
);

/// Ovens, by kind.
pub const OVEN: RateTable = RateTable::new(
    "oven",
    "electric",
    &[
        ("electric", 180000),
        ("gas", 250000),
        ("wood_fired", 420000),
        ("conveyor", 600000),
    ],
);

/// Fridges, by size.
pub const FRIDGE: RateTable = RateTable::new(
    "fridge",
    "small",
    &[
        ("small", 80000),
        ("medium", 150000),
        ("large", 260000),
        ("walk_in", 900000),
    ],
);

/// Per table.
pub const TABLES: RateTable = RateTable::new(
    "tables",
    "basic",
    &[("basic", 2000), ("standard", 3500), ("premium", 5000)],
);

/// Per chair.
pub const CHAIRS: RateTable = RateTable::new(
    "chairs",
    "basic",
    &[("basic", 1000), ("standard", 2000), ("premium", 3500)],
);

/// Every table, for catalog listings and consistency checks.
pub const ALL_TABLES: &[RateTable] = &[
    BREAD, MEAT, CHEESE, CONDIMENTS, DRINK, CHIPS, CRACKERS, NAPKINS, SILVERWARE, BAG, COOK, OVEN,
    FRIDGE, TABLES, CHAIRS,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_every_default_tier_exists() {
        for table in ALL_TABLES {
            let tier = table.lookup(table.default_tier());
            assert!(tier.is_some(), "{} has no '{}' tier", table.name(), table.default_tier());
        }
    }

    #[test]
    #[should_panic(expected = "default tier missing")]
    fn test_rate_table_requires_default_tier() {
        let _ = RateTable::new("broken", "gold", &[("silver", 100)]);
    }

    #[test]
    fn test_has_tier() {
        assert!(has_tier(&[("basic", 1), ("premium", 2)], "premium"));
        assert!(!has_tier(&[("basic", 1)], "basi"));
        assert!(!has_tier(&[], "basic"));
    }

    #[test]
    fn test_premium_tables_example() {
        let price = compute_price(&TABLES, "premium", 25, Decimal::ZERO);
        assert_eq!(price, dollars("1250"));
        assert_eq!(price.to_string(), "1250.00");

        let price = compute_price(&TABLES, "premium", 25, dollars("2.75"));
        assert_eq!(price, dollars("1252.75"));
    }

    #[test]
    fn test_upcharge_is_flat() {
        let one = compute_price(&NAPKINS, "cloth", 1, dollars("1"));
        let ten = compute_price(&NAPKINS, "cloth", 10, dollars("1"));
        assert_eq!(one, dollars("1.50"));
        assert_eq!(ten, dollars("6.00"));
    }

    #[test]
    fn test_unknown_discriminator_uses_default_tier() {
        let tier = BREAD.resolve("pumpernickel");
        assert_eq!(tier.name, "white");
        assert!(tier.fallback);
        assert_eq!(tier.rate, dollars("1.00"));

        assert_eq!(
            compute_price(&CHAIRS, "throne", 4, Decimal::ZERO),
            compute_price(&CHAIRS, "basic", 4, Decimal::ZERO)
        );
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let tier = MEAT.resolve("  Roast_Beef ");
        assert_eq!(tier.name, "roast_beef");
        assert!(!tier.fallback);
        assert_eq!(tier.rate, dollars("4.00"));
    }

    #[test]
    fn test_zero_quantity_is_only_the_upcharge() {
        assert_eq!(
            compute_price(&CRACKERS, "graham", 0, dollars("0.30")),
            dollars("0.30")
        );
    }

    #[test]
    fn test_no_drift_on_repeated_recomputation() {
        let first = compute_price(&CRACKERS, "oyster", 3, dollars("0.1"));
        let mut price = first;
        for _ in 0..1000 {
            price = compute_price(&CRACKERS, "oyster", 3, dollars("0.1"));
        }
        assert_eq!(price, first);
        assert_eq!(first.to_string(), "0.55");
    }

    #[test]
    fn test_unit_price() {
        assert_eq!(unit_price(&DRINK, "juice", dollars("0.25")), dollars("2.75"));
    }

    #[test]
    fn test_tiers_listing() {
        let names: Vec<_> = CHIPS.tiers().map(|t| t.name).collect();
        assert_eq!(names, ["small", "medium", "large"]);
    }
}
