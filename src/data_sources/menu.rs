use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::NoArgs;
use super::DataSourceHandler;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::pricing::{unit_price, CHIPS, DRINK};
use crate::resources::sandwich_price;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

/// Section of the menu an item is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// House sandwiches.
    Sandwich,
    /// Drinks, any ice.
    Drink,
    /// Chips.
    Side,
}

/// A priced menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Name used to order the item.
    pub name: String,
    /// Menu section.
    pub category: Category,
    /// Price with the upcharge applied.
    pub price: Decimal,
}

/// House sandwich recipes: name, bread, meat, cheese.
const SIGNATURES: &[(&str, &str, &str, Option<&str>)] = &[
    ("classic_ham", "white", "ham", Some("american")),
    ("turkey_club", "sourdough", "turkey", Some("cheddar")),
    ("pastrami_on_rye", "rye", "pastrami", Some("swiss")),
    ("roast_beef_ciabatta", "ciabatta", "roast_beef", Some("provolone")),
    ("italian", "wheat", "salami", None),
];

/// The full menu, priced with `upcharge`.
pub(crate) fn menu(upcharge: Decimal) -> Vec<MenuItem> {
    let sandwiches = SIGNATURES
        .iter()
        .map(|&(name, bread, meat, cheese)| MenuItem {
            name: name.to_string(),
            category: Category::Sandwich,
            price: sandwich_price(bread, meat, cheese, upcharge),
        });
    let drinks = DRINK.tiers().map(|tier| MenuItem {
        name: tier.name.to_string(),
        category: Category::Drink,
        price: unit_price(&DRINK, tier.name, upcharge),
    });
    let sides = CHIPS.tiers().map(|tier| MenuItem {
        name: format!("{}_chips", tier.name),
        category: Category::Side,
        price: unit_price(&CHIPS, tier.name, upcharge),
    });

    sandwiches.chain(drinks).chain(sides).collect()
}

/// Output of `hw_menu`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuListing {
    items: Vec<MenuItem>,
}

/// `hw_menu`
pub struct Menu;

impl DataSourceHandler for Menu {
    const TYPE_NAME: &'static str = "hw_menu";
    type Args = NoArgs;
    type Output = MenuListing;

    fn schema() -> Schema {
        let item = AttributeType::object([
            ("name", AttributeType::String),
            ("category", AttributeType::String),
            ("price", AttributeType::String),
        ]);
        Schema::v0()
            .with_description("House sandwiches, drinks and sides at current prices")
            .with_attribute(
                "items",
                Attribute::new(AttributeType::list(item), AttributeFlags::computed()),
            )
    }

    fn read(_args: NoArgs, config: &ProviderConfig) -> Result<MenuListing, ProviderError> {
        Ok(MenuListing {
            items: menu(config.upcharge),
        })
    }
}
