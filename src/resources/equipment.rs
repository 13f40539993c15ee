//! Kitchen equipment bought once: ovens and fridges.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{import_simple, note_id_change, ResourceHandler, SimpleId};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::compute_id;
use crate::pricing::{unit_price, FRIDGE, OVEN};
use crate::schema::{Attribute, Schema};

/// Sandwiches an oven turns out per hour.
pub(crate) fn oven_capacity(kind: &str) -> i64 {
    match OVEN.resolve(kind).name {
        "gas" => 40,
        "wood_fired" => 25,
        "conveyor" => 80,
        _ => 30,
    }
}

/// State of an oven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvenModel {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub struct Oven;

impl ResourceHandler for Oven {
    const TYPE_NAME: &'static str = "hw_oven";
    type Model = OvenModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("An oven")
            .with_attribute(
                "kind",
                Attribute::required_string()
                    .with_description("One of `electric`, `gas`, `wood_fired` or `conveyor`")
                    .with_force_new(),
            )
            .with_attribute("cost", Attribute::computed_money())
            .with_attribute(
                "capacity",
                Attribute::computed_int64().with_description("Customers served per hour"),
            )
            .with_attribute("id", Attribute::computed_string())
    }

    fn compute(mut model: OvenModel, config: &ProviderConfig) -> Result<OvenModel, ProviderError> {
        let id = compute_id(Self::TAG, &model.kind);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.cost = Some(unit_price(&OVEN, &model.kind, config.upcharge));
        model.capacity = Some(oven_capacity(&model.kind));
        model.id = Some(id);
        Ok(model)
    }

    fn import(id: &str) -> Result<OvenModel, ProviderError> {
        import_simple::<Self>(id)
    }
}

impl SimpleId for Oven {
    const TAG: &'static str = "oven";

    fn partial(id: String, kind: String) -> OvenModel {
        OvenModel {
            kind,
            cost: None,
            capacity: None,
            id: Some(id),
        }
    }
}

/// State of a fridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FridgeModel {
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub struct Fridge;

impl ResourceHandler for Fridge {
    const TYPE_NAME: &'static str = "hw_fridge";
    type Model = FridgeModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("A fridge")
            .with_attribute(
                "size",
                Attribute::required_string()
                    .with_description("One of `small`, `medium`, `large` or `walk_in`")
                    .with_force_new(),
            )
            .with_attribute("cost", Attribute::computed_money())
            .with_attribute("id", Attribute::computed_string())
    }

    fn compute(
        mut model: FridgeModel,
        config: &ProviderConfig,
    ) -> Result<FridgeModel, ProviderError> {
        let id = compute_id(Self::TAG, &model.size);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.cost = Some(unit_price(&FRIDGE, &model.size, config.upcharge));
        model.id = Some(id);
        Ok(model)
    }

    fn import(id: &str) -> Result<FridgeModel, ProviderError> {
        import_simple::<Self>(id)
    }
}

impl SimpleId for Fridge {
    const TAG: &'static str = "fridge";

    fn partial(id: String, size: String) -> FridgeModel {
        FridgeModel {
            size,
            cost: None,
            id: Some(id),
        }
    }
}
