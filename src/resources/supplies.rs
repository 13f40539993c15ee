//! Counter supplies: napkins, silverware and carry-out bags.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{note_id_change, price_lot, ResourceHandler};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::{composite_id, extract_kind};
use crate::pricing::{unit_price, RateTable, BAG, NAPKINS, SILVERWARE};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::validation::non_negative;

/// State of a stack of supplies bought by the piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackModel {
    pub style: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn stack_schema(noun: &str, styles: &str) -> Schema {
    Schema::v0()
        .with_description(format!("A stack of {}, priced per piece", noun))
        .with_attribute(
            "style",
            Attribute::required_string()
                .with_description(format!("One of {}", styles))
                .with_force_new(),
        )
        .with_attribute(
            "quantity",
            Attribute::required_int64().with_description(format!("How many {}", noun)),
        )
        .with_attribute("price", Attribute::computed_money())
        .with_attribute("id", Attribute::computed_string())
}

fn compute_stack(
    tag: &str,
    type_name: &str,
    table: &RateTable,
    mut model: StackModel,
    config: &ProviderConfig,
) -> Result<StackModel, ProviderError> {
    let (id, price) = price_lot(
        tag,
        type_name,
        table,
        &model.style,
        model.quantity,
        model.id.as_deref(),
        config,
    )?;
    model.price = Some(price);
    model.id = Some(id);
    Ok(model)
}

pub struct Napkins;

impl ResourceHandler for Napkins {
    const TYPE_NAME: &'static str = "hw_napkins";
    type Model = StackModel;

    fn schema() -> Schema {
        stack_schema("napkins", "`paper`, `recycled` or `cloth`")
    }

    fn validate(model: &StackModel) -> Vec<Diagnostic> {
        non_negative("quantity", model.quantity).into_iter().collect()
    }

    fn compute(model: StackModel, config: &ProviderConfig) -> Result<StackModel, ProviderError> {
        compute_stack("napkins", Self::TYPE_NAME, &NAPKINS, model, config)
    }
}

pub struct Silverware;

impl ResourceHandler for Silverware {
    const TYPE_NAME: &'static str = "hw_silverware";
    type Model = StackModel;

    fn schema() -> Schema {
        stack_schema("silverware sets", "`plastic`, `compostable` or `metal`")
    }

    fn validate(model: &StackModel) -> Vec<Diagnostic> {
        non_negative("quantity", model.quantity).into_iter().collect()
    }

    fn compute(model: StackModel, config: &ProviderConfig) -> Result<StackModel, ProviderError> {
        compute_stack("silverware", Self::TYPE_NAME, &SILVERWARE, model, config)
    }
}

/// State of a carry-out bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagModel {
    pub style: String,
    pub sandwich_id: String,
    pub drink_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chips_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A carry-out bag holding a sandwich, a drink and maybe chips.
///
/// Only the bag itself is charged; its contents are priced by their own
/// resources.
pub struct Bag;

impl ResourceHandler for Bag {
    const TYPE_NAME: &'static str = "hw_bag";
    type Model = BagModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("A carry-out bag")
            .with_attribute(
                "style",
                Attribute::required_string()
                    .with_description("One of `paper`, `plastic` or `reusable`"),
            )
            .with_attribute(
                "sandwich_id",
                Attribute::required_string()
                    .with_description("Id of an hw_sandwich")
                    .with_force_new(),
            )
            .with_attribute(
                "drink_id",
                Attribute::required_string()
                    .with_description("Id of an hw_drink")
                    .with_force_new(),
            )
            .with_attribute(
                "chips_id",
                Attribute::optional_string()
                    .with_description("Id of an hw_chips")
                    .with_force_new(),
            )
            .with_attribute("price", Attribute::computed_money())
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("Concatenated content ids"),
            )
    }

    fn validate(model: &BagModel) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if model.sandwich_id.is_empty() {
            diagnostics.push(
                Diagnostic::error("Empty sandwich reference")
                    .with_detail("A bag needs the id of the sandwich it carries")
                    .with_attribute("sandwich_id"),
            );
        }
        if let Err(e) = extract_kind("drink", &model.drink_id) {
            diagnostics.push(
                Diagnostic::error("Invalid drink reference")
                    .with_detail(e.to_string())
                    .with_attribute("drink_id"),
            );
        }
        if let Some(Err(e)) = model.chips_id.as_deref().map(|id| extract_kind("chips", id)) {
            diagnostics.push(
                Diagnostic::error("Invalid chips reference")
                    .with_detail(e.to_string())
                    .with_attribute("chips_id"),
            );
        }
        diagnostics
    }

    fn compute(mut model: BagModel, config: &ProviderConfig) -> Result<BagModel, ProviderError> {
        let mut parts = vec![model.sandwich_id.as_str(), model.drink_id.as_str()];
        parts.extend(model.chips_id.as_deref());
        let id = composite_id(parts);

        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.price = Some(unit_price(&BAG, &model.style, config.upcharge));
        model.id = Some(id);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceType;
    use serde_json::json;

    #[test]
    fn test_napkins() {
        let state = ResourceType::Napkins
            .apply(
                json!({"style": "cloth", "quantity": 40}),
                &ProviderConfig::default(),
            )
            .unwrap();
        assert_eq!(state["price"], "20.00");
        assert_eq!(state["id"], "napkins-cloth-5");
    }

    #[test]
    fn test_silverware_with_upcharge() {
        let config = ProviderConfig::with_upcharge(Decimal::new(99, 2));
        let state = ResourceType::Silverware
            .apply(json!({"style": "metal", "quantity": 3}), &config)
            .unwrap();
        assert_eq!(state["price"], "5.49");
        assert_eq!(state["id"], "silverware-metal-5");
    }

    #[test]
    fn test_unknown_style_falls_back() {
        let state = ResourceType::Napkins
            .apply(
                json!({"style": "silk", "quantity": 100}),
                &ProviderConfig::default(),
            )
            .unwrap();
        assert_eq!(state["price"], "2.00");
    }

    #[test]
    fn test_bag() {
        let state = ResourceType::Bag
            .apply(
                json!({
                    "style": "reusable",
                    "sandwich_id": "bread-rye-3meat-ham-3",
                    "drink_id": "drink-soda-4",
                    "chips_id": "chips-small-5"
                }),
                &ProviderConfig::default(),
            )
            .unwrap();
        assert_eq!(state["price"], "1.50");
        assert_eq!(state["id"], "bread-rye-3meat-ham-3drink-soda-4chips-small-5");
    }

    #[test]
    fn test_bag_rejects_bad_references() {
        let diagnostics = ResourceType::Bag.validate(&json!({
            "style": "paper",
            "sandwich_id": "",
            "drink_id": "soda",
            "chips_id": "drink-soda-4"
        }));
        let attributes: Vec<_> = diagnostics
            .iter()
            .map(|d| d.attribute.clone().unwrap())
            .collect();
        assert_eq!(attributes, ["sandwich_id", "drink_id", "chips_id"]);
    }
}
