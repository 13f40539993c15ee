//! Dining room furniture, bought in bulk.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{price_lot, ResourceHandler};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::pricing::{RateTable, CHAIRS, TABLES};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::validation::non_negative;

/// State of a lot of tables or chairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureModel {
    pub style: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn furniture_schema(noun: &str) -> Schema {
    Schema::v0()
        .with_description(format!("A lot of {}", noun))
        .with_attribute(
            "style",
            Attribute::required_string()
                .with_description("One of `basic`, `standard` or `premium`")
                .with_force_new(),
        )
        .with_attribute("quantity", Attribute::required_int64())
        .with_attribute(
            "cost",
            Attribute::computed_money()
                .with_description(format!("Rate per {} times quantity, plus the upcharge", noun)),
        )
        .with_attribute("id", Attribute::computed_string())
}

fn compute_furniture(
    tag: &str,
    type_name: &str,
    table: &RateTable,
    mut model: FurnitureModel,
    config: &ProviderConfig,
) -> Result<FurnitureModel, ProviderError> {
    let (id, cost) = price_lot(
        tag,
        type_name,
        table,
        &model.style,
        model.quantity,
        model.id.as_deref(),
        config,
    )?;
    model.cost = Some(cost);
    model.id = Some(id);
    Ok(model)
}

pub struct Tables;

impl ResourceHandler for Tables {
    const TYPE_NAME: &'static str = "hw_tables";
    type Model = FurnitureModel;

    fn schema() -> Schema {
        furniture_schema("table")
    }

    fn validate(model: &FurnitureModel) -> Vec<Diagnostic> {
        non_negative("quantity", model.quantity).into_iter().collect()
    }

    fn compute(
        model: FurnitureModel,
        config: &ProviderConfig,
    ) -> Result<FurnitureModel, ProviderError> {
        compute_furniture("tables", Self::TYPE_NAME, &TABLES, model, config)
    }
}

pub struct Chairs;

impl ResourceHandler for Chairs {
    const TYPE_NAME: &'static str = "hw_chairs";
    type Model = FurnitureModel;

    fn schema() -> Schema {
        furniture_schema("chair")
    }

    fn validate(model: &FurnitureModel) -> Vec<Diagnostic> {
        non_negative("quantity", model.quantity).into_iter().collect()
    }

    fn compute(
        model: FurnitureModel,
        config: &ProviderConfig,
    ) -> Result<FurnitureModel, ProviderError> {
        compute_furniture("chairs", Self::TYPE_NAME, &CHAIRS, model, config)
    }
}
