use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DataSourceHandler;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::pricing::{RateTable, CONDIMENTS, MEAT};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedItem {
    /// Tier name as listed in the rate table.
    pub name: String,
    /// Base rate, without upcharge.
    pub price: Decimal,
}

/// Output of a catalog data source: one list under the catalog's key.
pub type Catalog = std::collections::BTreeMap<&'static str, Vec<PricedItem>>;

/// Catalogs take no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct NoArgs {}

fn catalog_schema(key: &str, description: &str) -> Schema {
    let item = AttributeType::object([
        ("name", AttributeType::String),
        ("price", AttributeType::String),
    ]);
    Schema::v0().with_description(description).with_attribute(
        key,
        Attribute::new(AttributeType::list(item), AttributeFlags::computed()),
    )
}

fn list(key: &'static str, table: &RateTable) -> Catalog {
    let items = table
        .tiers()
        .map(|tier| PricedItem {
            name: tier.name.to_string(),
            price: tier.rate,
        })
        .collect();
    Catalog::from([(key, items)])
}

/// `hw_condiments`
pub struct Condiments;

impl DataSourceHandler for Condiments {
    const TYPE_NAME: &'static str = "hw_condiments";
    type Args = NoArgs;
    type Output = Catalog;

    fn schema() -> Schema {
        catalog_schema("condiments", "Condiments on offer and what they add to a sandwich")
    }

    fn read(_args: NoArgs, _config: &ProviderConfig) -> Result<Catalog, ProviderError> {
        Ok(list("condiments", &CONDIMENTS))
    }
}

/// `hw_deli_meats`
pub struct DeliMeats;

impl DataSourceHandler for DeliMeats {
    const TYPE_NAME: &'static str = "hw_deli_meats";
    type Args = NoArgs;
    type Output = Catalog;

    fn schema() -> Schema {
        catalog_schema("meats", "Deli meats and their base rates")
    }

    fn read(_args: NoArgs, _config: &ProviderConfig) -> Result<Catalog, ProviderError> {
        Ok(list("meats", &MEAT))
    }
}
