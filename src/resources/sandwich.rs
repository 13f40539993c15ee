use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{note_id_change, ResourceHandler};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::{composite_id, extract_kind};
use crate::pricing::{BREAD, CHEESE, MEAT};
use crate::schema::{Attribute, Schema};

/// Price of a sandwich from the kinds of its ingredients, upcharge included.
pub(crate) fn sandwich_price(
    bread: &str,
    meat: &str,
    cheese: Option<&str>,
    upcharge: Decimal,
) -> Decimal {
    let cheese = cheese.map(|kind| CHEESE.base_rate(kind)).unwrap_or_default();
    BREAD.base_rate(bread) + MEAT.base_rate(meat) + cheese + upcharge
}

/// State of a sandwich.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandwichModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub bread_id: String,
    pub meat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheese_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Bread, meat and optionally cheese, priced from the kinds in their ids.
pub struct Sandwich;

impl ResourceHandler for Sandwich {
    const TYPE_NAME: &'static str = "hw_sandwich";
    type Model = SandwichModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("A sandwich assembled from existing bread, meat and cheese")
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "bread_id",
                Attribute::required_string()
                    .with_description("Id of an hw_bread")
                    .with_force_new(),
            )
            .with_attribute(
                "meat_id",
                Attribute::required_string()
                    .with_description("Id of an hw_meat")
                    .with_force_new(),
            )
            .with_attribute(
                "cheese_id",
                Attribute::optional_string()
                    .with_description("Id of an hw_cheese")
                    .with_force_new(),
            )
            .with_attribute(
                "price",
                Attribute::computed_money()
                    .with_description("Bread, meat and cheese rates plus the upcharge"),
            )
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("Concatenated ingredient ids"),
            )
    }

    fn compute(
        mut model: SandwichModel,
        config: &ProviderConfig,
    ) -> Result<SandwichModel, ProviderError> {
        let bread = extract_kind("bread", &model.bread_id)?;
        let meat = extract_kind("meat", &model.meat_id)?;
        let cheese = model
            .cheese_id
            .as_deref()
            .map(|id| extract_kind("cheese", id))
            .transpose()?;

        let price = sandwich_price(&bread, &meat, cheese.as_deref(), config.upcharge);

        let mut parts = vec![model.bread_id.as_str(), model.meat_id.as_str()];
        parts.extend(model.cheese_id.as_deref());
        let id = composite_id(parts);

        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.price = Some(price);
        model.id = Some(id);
        Ok(model)
    }
}
