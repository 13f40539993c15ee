//! The store: a composite of equipment, furniture and staff.
//!
//! The store never looks the referenced resources up; everything it needs
//! is recovered from the discriminators encoded in their ids. Its cost is
//! the base rate of the oven, the fridge, one table, one chair and every
//! cook's hourly wage, with the upcharge added once. Throughput is bound by
//! whichever is slower, the oven or the line of cooks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::equipment::oven_capacity;
use super::staff::{throughput, wage};
use super::{note_id_change, ResourceHandler};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::{compute_id, extract_kind, IdError};
use crate::pricing::{CHAIRS, FRIDGE, OVEN, TABLES};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostic, Schema};

/// State of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreModel {
    pub name: String,
    pub oven_id: String,
    #[serde(default)]
    pub cook_ids: Vec<String>,
    pub tables_id: String,
    pub chairs_id: String,
    pub fridge_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers_per_hour: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Discriminators recovered from the ids a store references.
struct Parts {
    oven: String,
    fridge: String,
    tables: String,
    chairs: String,
    cooks: Vec<String>,
}

impl StoreModel {
    /// Every id reference paired with its attribute path and expected tag.
    fn references(&self) -> Vec<(String, &'static str, &str)> {
        let mut refs = vec![
            ("oven_id".to_string(), "oven", self.oven_id.as_str()),
            ("fridge_id".to_string(), "fridge", self.fridge_id.as_str()),
            ("tables_id".to_string(), "tables", self.tables_id.as_str()),
            ("chairs_id".to_string(), "chairs", self.chairs_id.as_str()),
        ];
        refs.extend(
            self.cook_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (format!("cook_ids.{}", i), "cook", id.as_str())),
        );
        refs
    }

    fn parts(&self) -> Result<Parts, IdError> {
        Ok(Parts {
            oven: extract_kind("oven", &self.oven_id)?,
            fridge: extract_kind("fridge", &self.fridge_id)?,
            tables: extract_kind("tables", &self.tables_id)?,
            chairs: extract_kind("chairs", &self.chairs_id)?,
            cooks: self
                .cook_ids
                .iter()
                .map(|id| extract_kind("cook", id))
                .collect::<Result<_, _>>()?,
        })
    }
}

pub struct Store;

impl ResourceHandler for Store {
    const TYPE_NAME: &'static str = "hw_store";
    type Model = StoreModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("A sandwich shop built from existing equipment, furniture and staff")
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_description("Name of the store")
                    .with_force_new(),
            )
            .with_attribute(
                "oven_id",
                Attribute::required_string().with_description("Id of an hw_oven"),
            )
            .with_attribute(
                "cook_ids",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::required(),
                )
                .with_description("Ids of the hw_cook resources on staff"),
            )
            .with_attribute(
                "tables_id",
                Attribute::required_string().with_description("Id of an hw_tables"),
            )
            .with_attribute(
                "chairs_id",
                Attribute::required_string().with_description("Id of an hw_chairs"),
            )
            .with_attribute(
                "fridge_id",
                Attribute::required_string().with_description("Id of an hw_fridge"),
            )
            .with_attribute("cost", Attribute::computed_money())
            .with_attribute("customers_per_hour", Attribute::computed_int64())
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("`store-<name>-<len>`"),
            )
    }

    fn validate(model: &StoreModel) -> Vec<Diagnostic> {
        model
            .references()
            .into_iter()
            .filter_map(|(path, tag, id)| {
                extract_kind(tag, id).err().map(|e| {
                    Diagnostic::error(format!("Invalid {} reference", tag))
                        .with_detail(e.to_string())
                        .with_attribute(path)
                })
            })
            .collect()
    }

    fn compute(
        mut model: StoreModel,
        config: &ProviderConfig,
    ) -> Result<StoreModel, ProviderError> {
        let parts = model.parts()?;

        let wages: Decimal = parts
            .cooks
            .iter()
            .map(|experience| wage(experience, Decimal::ZERO))
            .sum();
        let cost = OVEN.base_rate(&parts.oven)
            + FRIDGE.base_rate(&parts.fridge)
            + TABLES.base_rate(&parts.tables)
            + CHAIRS.base_rate(&parts.chairs)
            + wages
            + config.upcharge;

        let line: i64 = parts.cooks.iter().map(|experience| throughput(experience)).sum();
        let customers_per_hour = line.min(oven_capacity(&parts.oven));

        let id = compute_id("store", &model.name);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.cost = Some(cost);
        model.customers_per_hour = Some(customers_per_hour);
        model.id = Some(id);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceType;
    use serde_json::{json, Value};

    fn store(cook_ids: Value) -> Value {
        json!({
            "name": "downtown",
            "oven_id": "oven-gas-3",
            "cook_ids": cook_ids,
            "tables_id": "tables-premium-7",
            "chairs_id": "chairs-basic-5",
            "fridge_id": "fridge-large-5"
        })
    }

    #[test]
    fn test_store_cost_and_throughput() {
        let config = ProviderConfig::with_upcharge(Decimal::new(1, 0));
        let state = ResourceType::Store
            .apply(store(json!(["cook-senior-6", "cook-master-6"])), &config)
            .unwrap();

        // 2500 + 2600 + 50 + 10 + 28 + 40 + 1
        assert_eq!(state["cost"], "5229.00");
        // 22 + 30 cooks, capped by the gas oven
        assert_eq!(state["customers_per_hour"], 40);
        assert_eq!(state["id"], "store-downtown-8");
    }

    #[test]
    fn test_store_bound_by_cooks() {
        let state = ResourceType::Store
            .apply(store(json!(["cook-junior-6"])), &ProviderConfig::default())
            .unwrap();
        assert_eq!(state["customers_per_hour"], 10);
    }

    #[test]
    fn test_store_without_cooks_serves_nobody() {
        let state = ResourceType::Store
            .apply(store(json!([])), &ProviderConfig::default())
            .unwrap();
        assert_eq!(state["customers_per_hour"], 0);
        assert_eq!(state["cost"], "5160.00");
    }

    #[test]
    fn test_store_reports_bad_references() {
        let mut config = store(json!(["cook-senior-6", "oven-gas-3"]));
        config["fridge_id"] = json!("fridge-large-4");

        let diagnostics = ResourceType::Store.validate(&config);
        let attributes: Vec<_> = diagnostics
            .iter()
            .map(|d| d.attribute.clone().unwrap())
            .collect();
        assert_eq!(attributes, ["fridge_id", "cook_ids.1"]);

        let err = ResourceType::Store
            .apply(config, &ProviderConfig::default())
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }
}
