//! Read-only data sources.
//!
//! Catalogs list the rate tables as they stand; the menu and the example
//! order are priced through the pricing engine with the upcharge applied.

mod catalog;
mod menu;
mod order;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};
use crate::validation;

pub use catalog::{Catalog, PricedItem};
pub use menu::{Category, MenuItem};
pub use order::{Order, OrderLine};

/// A data source kind served by the provider.
pub trait DataSourceHandler {
    /// Type name used by the host, e.g. `hw_menu`.
    const TYPE_NAME: &'static str;

    /// Arguments read from the data source block.
    type Args: DeserializeOwned;

    /// What the data source produces.
    type Output: Serialize;

    /// The data source schema.
    fn schema() -> Schema;

    /// Produce the data.
    fn read(args: Self::Args, config: &ProviderConfig) -> Result<Self::Output, ProviderError>;
}

/// Every data source served by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceType {
    /// `hw_condiments`
    Condiments,
    /// `hw_deli_meats`
    DeliMeats,
    /// `hw_menu`
    Menu,
    /// `hw_order`
    Order,
}

macro_rules! dispatch {
    ($kind:expr, $handler:ident => $body:expr) => {
        match $kind {
            DataSourceType::Condiments => {
                type $handler = catalog::Condiments;
                $body
            },
            DataSourceType::DeliMeats => {
                type $handler = catalog::DeliMeats;
                $body
            },
            DataSourceType::Menu => {
                type $handler = menu::Menu;
                $body
            },
            DataSourceType::Order => {
                type $handler = order::ExampleOrder;
                $body
            },
        }
    };
}

impl DataSourceType {
    /// All data source types, in registration order.
    pub const ALL: [DataSourceType; 4] = [
        DataSourceType::Condiments,
        DataSourceType::DeliMeats,
        DataSourceType::Menu,
        DataSourceType::Order,
    ];

    /// Type name used by the host.
    pub fn type_name(self) -> &'static str {
        dispatch!(self, H => H::TYPE_NAME)
    }

    /// Schema of this data source.
    pub fn schema(self) -> Schema {
        dispatch!(self, H => H::schema())
    }

    /// Validate a data source block against its schema and argument shape.
    pub fn validate(self, config: &Value) -> Vec<Diagnostic> {
        dispatch!(self, H => validate_with::<H>(config))
    }

    /// Read the data source.
    pub fn read(self, config: &Value, provider: &ProviderConfig) -> Result<Value, ProviderError> {
        dispatch!(self, H => {
            let args = decode::<H>(config)?;
            Ok(serde_json::to_value(H::read(args, provider)?)?)
        })
    }
}

impl FromStr for DataSourceType {
    type Err = ProviderError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        DataSourceType::ALL
            .into_iter()
            .find(|kind| kind.type_name() == name)
            .ok_or_else(|| ProviderError::UnknownResource(format!("data source {}", name)))
    }
}

impl fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

fn decode<H: DataSourceHandler>(config: &Value) -> Result<H::Args, ProviderError> {
    // An omitted block reads as an empty one.
    let config = match config {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(config)
        .map_err(|e| ProviderError::InvalidRequest(format!("{}: {}", H::TYPE_NAME, e)))
}

fn validate_with<H: DataSourceHandler>(config: &Value) -> Vec<Diagnostic> {
    let diagnostics = validation::validate(&H::schema(), config);
    if !diagnostics.is_empty() {
        return diagnostics;
    }

    match decode::<H>(config) {
        Ok(_) => diagnostics,
        Err(e) => vec![e.into_diagnostic()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names_round_trip() {
        for kind in DataSourceType::ALL {
            assert_eq!(kind.type_name().parse::<DataSourceType>().unwrap(), kind);
        }
        assert!("hw_specials".parse::<DataSourceType>().is_err());
    }

    #[test]
    fn test_null_config_reads_as_empty() {
        let data = DataSourceType::Condiments
            .read(&Value::Null, &ProviderConfig::default())
            .unwrap();
        assert!(data["condiments"].is_array());
    }

    #[test]
    fn test_validate() {
        assert!(DataSourceType::Order.validate(&json!({})).is_empty());
        assert!(DataSourceType::Order
            .validate(&json!({"customer": "ana"}))
            .is_empty());

        let diagnostics = DataSourceType::Order.validate(&json!({"customer": 7}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("customer".to_string()));
    }
}
