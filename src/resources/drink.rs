//! Drinks and their ice configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{import_simple, note_id_change, ResourceHandler, SimpleId};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::compute_id;
use crate::pricing::{unit_price, DRINK};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};

/// One `ice` block of a drink.
///
/// At most one of the flags may be set; none set means no ice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ice {
    /// A little ice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub some: Option<bool>,
    /// A lot of ice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lots: Option<bool>,
    /// As much ice as fits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<bool>,
}

impl Ice {
    fn flags_set(&self) -> Vec<&'static str> {
        [("some", self.some), ("lots", self.lots), ("max", self.max)]
            .into_iter()
            .filter(|(_, flag)| flag.unwrap_or(false))
            .map(|(name, _)| name)
            .collect()
    }
}

/// Check the `ice` blocks of a drink.
///
/// Exactly one block must be present and at most one of its `some`, `lots`
/// and `max` flags may be true.
pub fn validate_ice(ice: &[Ice]) -> Vec<Diagnostic> {
    let block = match ice {
        [block] => block,
        _ => {
            return vec![Diagnostic::error("Invalid ice configuration")
                .with_detail(format!(
                    "Exactly one ice block is required, got {}",
                    ice.len()
                ))
                .with_attribute("ice")]
        },
    };

    let set = block.flags_set();
    if set.len() > 1 {
        return vec![Diagnostic::error("Invalid ice configuration")
            .with_detail(format!(
                "Only one of some, lots or max may be true, got {}",
                set.join(", ")
            ))
            .with_attribute("ice.0")];
    }

    Vec::new()
}

/// State of a drink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub ice: Vec<Ice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub struct Drink;

impl ResourceHandler for Drink {
    const TYPE_NAME: &'static str = "hw_drink";
    type Model = DrinkModel;

    fn schema() -> Schema {
        let ice = Block::new()
            .with_description("How much ice goes in; set at most one flag")
            .with_attribute("some", Attribute::optional_bool())
            .with_attribute("lots", Attribute::optional_bool())
            .with_attribute("max", Attribute::optional_bool());

        Schema::v0()
            .with_description("A fountain or bottled drink")
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "kind",
                Attribute::required_string()
                    .with_description("Kind of drink, e.g. `lemonade`")
                    .with_force_new(),
            )
            .with_attribute("price", Attribute::computed_money())
            .with_attribute("id", Attribute::computed_string())
            .with_block("ice", NestedBlock::list(ice))
    }

    fn validate(model: &DrinkModel) -> Vec<Diagnostic> {
        validate_ice(&model.ice)
    }

    fn compute(
        mut model: DrinkModel,
        config: &ProviderConfig,
    ) -> Result<DrinkModel, ProviderError> {
        let id = compute_id(Self::TAG, &model.kind);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.price = Some(unit_price(&DRINK, &model.kind, config.upcharge));
        model.id = Some(id);
        Ok(model)
    }

    fn import(id: &str) -> Result<DrinkModel, ProviderError> {
        import_simple::<Self>(id)
    }
}

impl SimpleId for Drink {
    const TAG: &'static str = "drink";

    // Ice is not encoded in the id: an imported drink gets a single empty
    // block, which reads as "no ice".
    fn partial(id: String, kind: String) -> DrinkModel {
        DrinkModel {
            description: None,
            kind,
            ice: vec![Ice::default()],
            price: None,
            id: Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceType;
    use serde_json::json;

    fn ice(some: bool, lots: bool, max: bool) -> Ice {
        Ice {
            some: Some(some),
            lots: Some(lots),
            max: Some(max),
        }
    }

    #[test]
    fn test_ice_accepts_zero_or_one_flag() {
        assert!(validate_ice(&[Ice::default()]).is_empty());
        assert!(validate_ice(&[ice(false, false, false)]).is_empty());
        assert!(validate_ice(&[ice(true, false, false)]).is_empty());
        assert!(validate_ice(&[ice(false, true, false)]).is_empty());
        assert!(validate_ice(&[ice(false, false, true)]).is_empty());
    }

    #[test]
    fn test_ice_rejects_several_flags() {
        for block in [
            ice(true, true, false),
            ice(true, false, true),
            ice(false, true, true),
            ice(true, true, true),
        ] {
            let diagnostics = validate_ice(&[block]);
            assert_eq!(diagnostics.len(), 1);
            assert!(diagnostics[0].is_error());
            assert_eq!(diagnostics[0].attribute, Some("ice.0".to_string()));
        }

        let detail = validate_ice(&[ice(true, false, true)])[0].detail.clone().unwrap();
        assert_eq!(detail, "Only one of some, lots or max may be true, got some, max");
    }

    #[test]
    fn test_ice_requires_exactly_one_block() {
        let diagnostics = validate_ice(&[]);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_ref().unwrap().contains("got 0"));

        let diagnostics = validate_ice(&[Ice::default(), Ice::default()]);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_ref().unwrap().contains("got 2"));
    }

    #[test]
    fn test_drink_price() {
        let config = ProviderConfig::with_upcharge(Decimal::new(50, 2));
        let state = ResourceType::Drink
            .apply(json!({"kind": "lemonade", "ice": [{"lots": true}]}), &config)
            .unwrap();
        assert_eq!(state["price"], "2.50");
        assert_eq!(state["id"], "drink-lemonade-8");
        assert_eq!(state["ice"], json!([{"lots": true}]));
    }

    #[test]
    fn test_invalid_ice_aborts_apply() {
        let err = ResourceType::Drink
            .apply(
                json!({"kind": "soda", "ice": [{"some": true, "max": true}]}),
                &ProviderConfig::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(err.message().contains("Only one of some, lots or max"));

        let err = ResourceType::Drink
            .apply(json!({"kind": "soda"}), &ProviderConfig::default())
            .unwrap_err();
        assert!(err.message().contains("Exactly one ice block"));
    }

    #[test]
    fn test_validate_reports_ice_after_schema() {
        let diagnostics = ResourceType::Drink.validate(&json!({
            "kind": "coffee",
            "ice": [{"some": true}, {"lots": true}]
        }));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("ice".to_string()));
    }

    #[test]
    fn test_import_reads_as_no_ice() {
        let partial = ResourceType::Drink.import("drink-water-5").unwrap();
        let read = ResourceType::Drink
            .apply(partial, &ProviderConfig::default())
            .unwrap();
        assert_eq!(read["price"], "1.00");
        assert_eq!(read["ice"], json!([{}]));
    }
}
