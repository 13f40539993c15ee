//! Sides sold next to a sandwich.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{import_simple, note_id_change, quantity, ResourceHandler, SimpleId};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::compute_id;
use crate::pricing::{compute_price, unit_price, CHIPS, CRACKERS};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::validation::non_negative;

/// State of a bag of chips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipsModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub struct Chips;

impl ResourceHandler for Chips {
    const TYPE_NAME: &'static str = "hw_chips";
    type Model = ChipsModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("A bag of chips")
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "size",
                Attribute::required_string()
                    .with_description("One of `small`, `medium` or `large`")
                    .with_force_new(),
            )
            .with_attribute("price", Attribute::computed_money())
            .with_attribute("id", Attribute::computed_string())
    }

    fn compute(
        mut model: ChipsModel,
        config: &ProviderConfig,
    ) -> Result<ChipsModel, ProviderError> {
        let id = compute_id(Self::TAG, &model.size);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.price = Some(unit_price(&CHIPS, &model.size, config.upcharge));
        model.id = Some(id);
        Ok(model)
    }

    fn import(id: &str) -> Result<ChipsModel, ProviderError> {
        import_simple::<Self>(id)
    }
}

impl SimpleId for Chips {
    const TAG: &'static str = "chips";

    fn partial(id: String, size: String) -> ChipsModel {
        ChipsModel {
            description: None,
            size,
            price: None,
            id: Some(id),
        }
    }
}

/// State of a sleeve of crackers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackersModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub struct Crackers;

impl ResourceHandler for Crackers {
    const TYPE_NAME: &'static str = "hw_crackers";
    type Model = CrackersModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Crackers, priced per cracker")
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "kind",
                Attribute::required_string()
                    .with_description("Kind of cracker, e.g. `oyster`")
                    .with_force_new(),
            )
            .with_attribute("quantity", Attribute::required_int64())
            .with_attribute("price", Attribute::computed_money())
            .with_attribute("id", Attribute::computed_string())
    }

    fn validate(model: &CrackersModel) -> Vec<Diagnostic> {
        non_negative("quantity", model.quantity).into_iter().collect()
    }

    fn compute(
        mut model: CrackersModel,
        config: &ProviderConfig,
    ) -> Result<CrackersModel, ProviderError> {
        let count = quantity("quantity", model.quantity)?;
        let id = compute_id("crackers", &model.kind);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.price = Some(compute_price(&CRACKERS, &model.kind, count, config.upcharge));
        model.id = Some(id);
        Ok(model)
    }
}
