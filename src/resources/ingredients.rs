//! Sandwich ingredients: bread, meat and cheese.
//!
//! Bread and meat only carry an identity; their price is charged when they
//! go into a sandwich. Cheese is sold by the slice and is priced directly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{import_simple, note_id_change, ResourceHandler, SimpleId};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::compute_id;
use crate::pricing::{unit_price, CHEESE};
use crate::schema::{Attribute, Schema};

/// State of an unpriced ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// State of a cheese.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheeseModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn ingredient_schema(noun: &str, example: &str) -> Schema {
    Schema::v0()
        .with_description(format!("A {} that can go into a sandwich", noun))
        .with_attribute(
            "description",
            Attribute::optional_string()
                .with_description(format!("Free-form note on the {}", noun)),
        )
        .with_attribute(
            "kind",
            Attribute::required_string()
                .with_description(format!("Kind of {}, e.g. `{}`", noun, example))
                .with_force_new(),
        )
        .with_attribute(
            "id",
            Attribute::computed_string().with_description(format!("`{}-<kind>-<len>`", noun)),
        )
}

fn compute_ingredient(tag: &str, type_name: &str, mut model: IngredientModel) -> IngredientModel {
    let id = compute_id(tag, &model.kind);
    note_id_change(type_name, model.id.as_deref(), &id);
    model.id = Some(id);
    model
}

pub struct Bread;

impl ResourceHandler for Bread {
    const TYPE_NAME: &'static str = "hw_bread";
    type Model = IngredientModel;

    fn schema() -> Schema {
        ingredient_schema("bread", "sourdough")
    }

    fn compute(
        model: IngredientModel,
        _config: &ProviderConfig,
    ) -> Result<IngredientModel, ProviderError> {
        Ok(compute_ingredient(Self::TAG, Self::TYPE_NAME, model))
    }

    fn import(id: &str) -> Result<IngredientModel, ProviderError> {
        import_simple::<Self>(id)
    }
}

impl SimpleId for Bread {
    const TAG: &'static str = "bread";

    fn partial(id: String, kind: String) -> IngredientModel {
        IngredientModel {
            description: None,
            kind,
            id: Some(id),
        }
    }
}

pub struct Meat;

impl ResourceHandler for Meat {
    const TYPE_NAME: &'static str = "hw_meat";
    type Model = IngredientModel;

    fn schema() -> Schema {
        ingredient_schema("meat", "pastrami")
    }

    fn compute(
        model: IngredientModel,
        _config: &ProviderConfig,
    ) -> Result<IngredientModel, ProviderError> {
        Ok(compute_ingredient(Self::TAG, Self::TYPE_NAME, model))
    }

    fn import(id: &str) -> Result<IngredientModel, ProviderError> {
        import_simple::<Self>(id)
    }
}

impl SimpleId for Meat {
    const TAG: &'static str = "meat";

    fn partial(id: String, kind: String) -> IngredientModel {
        IngredientModel {
            description: None,
            kind,
            id: Some(id),
        }
    }
}

pub struct Cheese;

impl ResourceHandler for Cheese {
    const TYPE_NAME: &'static str = "hw_cheese";
    type Model = CheeseModel;

    fn schema() -> Schema {
        ingredient_schema("cheese", "swiss").with_attribute(
            "price",
            Attribute::computed_money().with_description("Price of one slice, upcharge included"),
        )
    }

    fn compute(
        mut model: CheeseModel,
        config: &ProviderConfig,
    ) -> Result<CheeseModel, ProviderError> {
        let id = compute_id(Self::TAG, &model.kind);
        note_id_change(Self::TYPE_NAME, model.id.as_deref(), &id);
        model.price = Some(unit_price(&CHEESE, &model.kind, config.upcharge));
        model.id = Some(id);
        Ok(model)
    }

    fn import(id: &str) -> Result<CheeseModel, ProviderError> {
        import_simple::<Self>(id)
    }
}

impl SimpleId for Cheese {
    const TAG: &'static str = "cheese";

    fn partial(id: String, kind: String) -> CheeseModel {
        CheeseModel {
            description: None,
            kind,
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

    #[test]
    fn test_bread_id() {
        let state = ResourceType::Bread
            .apply(
                json!({"kind": "rye", "description": "dark"}),
                &ProviderConfig::default(),
            )
            .unwrap();
        assert_eq!(
            state,
            json!({"kind": "rye", "description": "dark", "id": "bread-rye-3"})
        );
    }

    #[test]
    fn test_id_stable_across_reads() {
        let config = ProviderConfig::default();
        let created = ResourceType::Meat
            .apply(json!({"kind": "ham"}), &config)
            .unwrap();
        let read = ResourceType::Meat.apply(created.clone(), &config).unwrap();
        assert_eq!(created, read);
        assert_eq!(read["id"], "meat-ham-3");
    }

    #[test]
    fn test_id_follows_kind() {
        let config = ProviderConfig::default();
        let updated = ResourceType::Bread
            .apply(json!({"kind": "sourdough", "id": "bread-rye-3"}), &config)
            .unwrap();
        assert_eq!(updated["id"], "bread-sourdough-9");
    }

    #[test]
    fn test_cheese_price_includes_upcharge() {
        let config = ProviderConfig::with_upcharge(Decimal::new(25, 2));
        let state = ResourceType::Cheese
            .apply(json!({"kind": "swiss"}), &config)
            .unwrap();
        assert_eq!(state["price"], "1.00");
        assert_eq!(state["id"], "cheese-swiss-5");
    }

    #[test]
    fn test_cheese_unknown_kind_falls_back() {
        let state = ResourceType::Cheese
            .apply(json!({"kind": "gouda"}), &ProviderConfig::default())
            .unwrap();
        assert_eq!(state["price"], "0.50");
        assert_eq!(state["id"], "cheese-gouda-5");
    }

    #[test]
    fn test_import_then_read() {
        let partial = ResourceType::Bread.import("bread-sour-dough-10").unwrap();
        assert_eq!(partial, json!({"kind": "sour-dough", "id": "bread-sour-dough-10"}));

        let read = ResourceType::Bread
            .apply(partial, &ProviderConfig::default())
            .unwrap();
        assert_eq!(read["id"], "bread-sour-dough-10");

        assert!(ResourceType::Meat.import("bread-rye-3").is_err());
    }
}
