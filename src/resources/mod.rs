//! Resource handlers.
//!
//! Each resource kind implements [`ResourceHandler`]: a schema, a typed
//! model, optional extra validation and a `compute` step that derives the
//! id and price/cost from the user attributes. [`ResourceType`] is the
//! tagged dispatch table the provider uses to route a type name to its
//! handler.

mod drink;
mod equipment;
mod furniture;
mod ingredients;
mod sandwich;
mod sides;
mod staff;
mod store;
mod supplies;

pub use drink::{validate_ice, Ice};
pub(crate) use sandwich::sandwich_price;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id;
use crate::pricing::{compute_price, RateTable};
use crate::schema::{Diagnostic, Schema};
use crate::validation;

/// A resource kind served by the provider.
pub trait ResourceHandler {
    /// Type name used by the host, e.g. `hw_bread`.
    const TYPE_NAME: &'static str;

    /// Typed view of the resource state.
    type Model: Serialize + DeserializeOwned;

    /// The resource schema.
    fn schema() -> Schema;

    /// Checks that the schema cannot express.
    fn validate(model: &Self::Model) -> Vec<Diagnostic> {
        let _ = model;
        Vec::new()
    }

    /// Derive every computed attribute from the user attributes.
    fn compute(model: Self::Model, config: &ProviderConfig)
        -> Result<Self::Model, ProviderError>;

    /// Build a partial state from an id so that a read can complete it.
    fn import(id: &str) -> Result<Self::Model, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "import of {} (id '{}')",
            Self::TYPE_NAME,
            id
        )))
    }
}

/// Handler whose id is `{tag}-{discriminator}-{len}`.
///
/// Such handlers can import by recovering the discriminator from the id.
pub(crate) trait SimpleId: ResourceHandler {
    const TAG: &'static str;

    /// State holding only the id and the recovered discriminator.
    fn partial(id: String, discriminator: String) -> Self::Model;
}

pub(crate) fn import_simple<H: SimpleId>(id: &str) -> Result<H::Model, ProviderError> {
    let discriminator = id::extract_kind(H::TAG, id)?;
    Ok(H::partial(id.to_string(), discriminator))
}

/// Check a quantity and narrow it for pricing.
pub(crate) fn quantity(path: &str, quantity: i64) -> Result<u32, ProviderError> {
    u32::try_from(quantity).map_err(|_| {
        ProviderError::Validation(format!(
            "{} must be between 0 and {}, got {}",
            path,
            u32::MAX,
            quantity
        ))
    })
}

/// Id and total for `count` units of `style`, as sold by the lot.
///
/// Shared by the resources that are priced per piece: napkins, silverware,
/// tables and chairs.
pub(crate) fn price_lot(
    tag: &str,
    type_name: &str,
    table: &RateTable,
    style: &str,
    count: i64,
    previous_id: Option<&str>,
    config: &ProviderConfig,
) -> Result<(String, Decimal), ProviderError> {
    let count = quantity("quantity", count)?;
    let id = id::compute_id(tag, style);
    note_id_change(type_name, previous_id, &id);
    Ok((id, compute_price(table, style, count, config.upcharge)))
}

/// Log when recomputation moves an id away from what state held.
pub(crate) fn note_id_change(type_name: &str, previous: Option<&str>, current: &str) {
    if let Some(previous) = previous.filter(|p| *p != current) {
        debug!(
            resource_type = type_name,
            previous, current, "Identifier changed with its determining attribute"
        );
    }
}

/// Every resource type served by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// `hw_bread`
    Bread,
    /// `hw_meat`
    Meat,
    /// `hw_cheese`
    Cheese,
    /// `hw_sandwich`
    Sandwich,
    /// `hw_drink`
    Drink,
    /// `hw_chips`
    Chips,
    /// `hw_crackers`
    Crackers,
    /// `hw_napkins`
    Napkins,
    /// `hw_silverware`
    Silverware,
    /// `hw_bag`
    Bag,
    /// `hw_cook`
    Cook,
    /// `hw_oven`
    Oven,
    /// `hw_fridge`
    Fridge,
    /// `hw_tables`
    Tables,
    /// `hw_chairs`
    Chairs,
    /// `hw_store`
    Store,
}

macro_rules! dispatch {
    ($kind:expr, $handler:ident => $body:expr) => {
        match $kind {
            ResourceType::Bread => {
                type $handler = ingredients::Bread;
                $body
            },
            ResourceType::Meat => {
                type $handler = ingredients::Meat;
                $body
            },
            ResourceType::Cheese => {
                type $handler = ingredients::Cheese;
                $body
            },
            ResourceType::Sandwich => {
                type $handler = sandwich::Sandwich;
                $body
            },
            ResourceType::Drink => {
                type $handler = drink::Drink;
                $body
            },
            ResourceType::Chips => {
                type $handler = sides::Chips;
                $body
            },
            ResourceType::Crackers => {
                type $handler = sides::Crackers;
                $body
            },
            ResourceType::Napkins => {
                type $handler = supplies::Napkins;
                $body
            },
            ResourceType::Silverware => {
                type $handler = supplies::Silverware;
                $body
            },
            ResourceType::Bag => {
                type $handler = supplies::Bag;
                $body
            },
            ResourceType::Cook => {
                type $handler = staff::Cook;
                $body
            },
            ResourceType::Oven => {
                type $handler = equipment::Oven;
                $body
            },
            ResourceType::Fridge => {
                type $handler = equipment::Fridge;
                $body
            },
            ResourceType::Tables => {
                type $handler = furniture::Tables;
                $body
            },
            ResourceType::Chairs => {
                type $handler = furniture::Chairs;
                $body
            },
            ResourceType::Store => {
                type $handler = store::Store;
                $body
            },
        }
    };
}

impl ResourceType {
    /// All resource types, in registration order.
    pub const ALL: [ResourceType; 16] = [
        ResourceType::Bread,
        ResourceType::Meat,
        ResourceType::Cheese,
        ResourceType::Sandwich,
        ResourceType::Drink,
        ResourceType::Chips,
        ResourceType::Crackers,
        ResourceType::Napkins,
        ResourceType::Silverware,
        ResourceType::Bag,
        ResourceType::Cook,
        ResourceType::Oven,
        ResourceType::Fridge,
        ResourceType::Tables,
        ResourceType::Chairs,
        ResourceType::Store,
    ];

    /// Type name used by the host.
    pub fn type_name(self) -> &'static str {
        dispatch!(self, H => H::TYPE_NAME)
    }

    /// Schema of this resource.
    pub fn schema(self) -> Schema {
        dispatch!(self, H => H::schema())
    }

    /// Validate a configuration: schema first, then handler rules.
    pub fn validate(self, config: &Value) -> Vec<Diagnostic> {
        dispatch!(self, H => validate_with::<H>(config))
    }

    /// Recompute every derived attribute of `state`.
    ///
    /// Fails without producing state when validation reports an error.
    pub fn apply(self, state: Value, config: &ProviderConfig) -> Result<Value, ProviderError> {
        dispatch!(self, H => apply_with::<H>(state, config))
    }

    /// Build a partial state for an imported id.
    pub fn import(self, id: &str) -> Result<Value, ProviderError> {
        dispatch!(self, H => Ok(serde_json::to_value(H::import(id)?)?))
    }
}

impl FromStr for ResourceType {
    type Err = ProviderError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|kind| kind.type_name() == name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

fn decode<H: ResourceHandler>(state: Value) -> Result<H::Model, ProviderError> {
    serde_json::from_value(state)
        .map_err(|e| ProviderError::InvalidRequest(format!("{}: {}", H::TYPE_NAME, e)))
}

fn validate_with<H: ResourceHandler>(config: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = validation::validate(&H::schema(), config);
    if !diagnostics.is_empty() {
        return diagnostics;
    }

    match decode::<H>(config.clone()) {
        Ok(model) => diagnostics.extend(H::validate(&model)),
        Err(e) => diagnostics.push(e.into_diagnostic()),
    }
    diagnostics
}

fn apply_with<H: ResourceHandler>(
    state: Value,
    config: &ProviderConfig,
) -> Result<Value, ProviderError> {
    let model = decode::<H>(state)?;
    ProviderError::from_diagnostics(&H::validate(&model))?;
    let computed = H::compute(model, config)?;
    Ok(serde_json::to_value(computed)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{CHAIRS, NAPKINS};
    use serde_json::json;

    #[test]
    fn test_type_names_round_trip() {
        for kind in ResourceType::ALL {
            assert!(kind.type_name().starts_with("hw_"));
            assert_eq!(kind.type_name().parse::<ResourceType>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.type_name());
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = "hw_toaster".parse::<ResourceType>().unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[test]
    fn test_every_schema_has_computed_id() {
        for kind in ResourceType::ALL {
            let schema = kind.schema();
            let id = schema
                .block
                .attributes
                .get("id")
                .unwrap_or_else(|| panic!("{} has no id", kind));
            assert!(id.flags.is_computed_only(), "{} id is not computed", kind);
        }
    }

    #[test]
    fn test_validate_runs_schema_before_handler() {
        let diagnostics = ResourceType::Drink.validate(&json!({"ice": []}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("kind".to_string()));
    }

    #[test]
    fn test_apply_rejects_wrong_shape() {
        let err = ResourceType::Bread
            .apply(json!({"kind": 4}), &ProviderConfig::default())
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }

    #[test]
    fn test_quantity_narrowing() {
        assert_eq!(quantity("quantity", 25).unwrap(), 25);
        assert!(quantity("quantity", -1).is_err());
        assert!(quantity("quantity", i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_price_lot() {
        let config = ProviderConfig::with_upcharge(Decimal::ONE);
        let (id, total) =
            price_lot("napkins", "hw_napkins", &NAPKINS, "cloth", 10, None, &config).unwrap();
        assert_eq!(id, "napkins-cloth-5");
        assert_eq!(total, Decimal::new(600, 2));

        let err = price_lot("chairs", "hw_chairs", &CHAIRS, "basic", -2, None, &config);
        assert!(matches!(err, Err(ProviderError::Validation(_))));
    }

    #[test]
    fn test_import_unsupported_for_composites() {
        let err = ResourceType::Store.import("store-main-4").unwrap_err();
        assert!(matches!(err, ProviderError::Unimplemented(_)));
    }
}
