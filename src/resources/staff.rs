use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{note_id_change, ResourceHandler};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::compute_id;
use crate::pricing::{unit_price, COOK};
use crate::schema::{Attribute, Schema};

/// Customers a cook serves per hour at a given experience level.
///
/// Unknown levels count as the least experienced.
pub(crate) fn throughput(experience: &str) -> i64 {
    match COOK.resolve(experience).name {
        "intermediate" => 15,
        "senior" => 22,
        "master" => 30,
        _ => 10,
    }
}

/// Hourly wage for `experience`, upcharge included.
pub(crate) fn wage(experience: &str, upcharge: Decimal) -> Decimal {
    unit_price(&COOK, experience, upcharge)
}

/// State of a cook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookModel {
    pub name: String,
    pub experience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers_per_hour: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub struct Cook;

impl ResourceHandler for Cook {
    const TYPE_NAME: &'static str = "hw_cook";
    type Model = CookModel;

    fn schema() -> Schema {
        Schema::v0()
            .with_description("A cook working the line")
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "experience",
                Attribute::required_string()
                    .with_description(
                        "One of `junior`, `intermediate`, `senior` or `master`; \
                         determines wage and throughput",
                    )
                    .with_force_new(),
            )
            .with_attribute(
                "wage",
                Attribute::computed_money().with_description("Hourly wage, upcharge included"),
            )
            .with_attribute("customers_per_hour", Attribute::computed_int64())
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("`cook-<experience>-<len>`"),
            )
    }

    fn compute(mut model: CookModel, config: &ProviderConfig) -> Result<CookModel, ProviderError> {
        let id = compute_id("cook", &model.experience);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.wage = Some(wage(&model.experience, config.upcharge));
        model.customers_per_hour = Some(throughput(&model.experience));
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
    fn test_cook_wage_and_throughput() {
        let state = ResourceType::Cook
            .apply(
                json!({"name": "Ana", "experience": "senior"}),
                &ProviderConfig::with_upcharge(Decimal::new(2, 0)),
            )
            .unwrap();
        assert_eq!(state["wage"], "30.00");
        assert_eq!(state["customers_per_hour"], 22);
        assert_eq!(state["id"], "cook-senior-6");
    }

    #[test]
    fn test_unknown_experience_is_junior() {
        assert_eq!(throughput("apprentice"), 10);
        assert_eq!(throughput("MASTER"), 30);
        assert_eq!(wage("apprentice", Decimal::ZERO), Decimal::new(1500, 2));
    }

    #[test]
    fn test_cook_import_unsupported() {
        assert!(ResourceType::Cook.import("cook-junior-6").is_err());
    }
}
