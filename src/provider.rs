//! The hw provider: configuration plus every resource and data source.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::ProviderConfig;
use crate::data_sources::DataSourceType;
use crate::error::ProviderError;
use crate::resources::ResourceType;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
};
use crate::validation;

/// Mock sandwich-shop provider.
///
/// The only shared state is the configuration. Configure swaps in a new
/// snapshot; every operation works on the snapshot current when it starts.
#[derive(Debug, Default)]
pub struct HwProvider {
    config: RwLock<Arc<ProviderConfig>>,
}

impl HwProvider {
    /// Provider with the default (zero upcharge) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider already configured with `config`.
    pub fn with_config(config: ProviderConfig) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
        }
    }

    /// The configuration currently in effect.
    pub async fn config(&self) -> Arc<ProviderConfig> {
        Arc::clone(&*self.config.read().await)
    }

    fn check_provider_config(config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = validation::validate(&ProviderConfig::schema(), config);
        if diagnostics.is_empty() {
            if let Err(e) = ProviderConfig::from_sources(config, None) {
                diagnostics.push(e.into_diagnostic().with_attribute("upcharge"));
            }
        }
        diagnostics
    }
}

#[async_trait::async_trait]
impl ProviderService for HwProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = ResourceType::ALL
            .into_iter()
            .fold(schema, |schema, kind| schema.with_resource(kind.type_name(), kind.schema()));
        DataSourceType::ALL
            .into_iter()
            .fold(schema, |schema, kind| schema.with_data_source(kind.type_name(), kind.schema()))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: ResourceType::ALL
                .iter()
                .map(|kind| kind.type_name().to_string())
                .collect(),
            data_sources: DataSourceType::ALL
                .iter()
                .map(|kind| kind.type_name().to_string())
                .collect(),
            capabilities: ServerCapabilities { plan_destroy: true },
        }
    }

    #[instrument(skip_all)]
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(Self::check_provider_config(&config))
    }

    #[instrument(skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = Self::check_provider_config(&config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Ok(diagnostics);
        }

        match ProviderConfig::from_value(&config) {
            Ok(parsed) => {
                info!(upcharge = %parsed.upcharge, "Provider configured");
                *self.config.write().await = Arc::new(parsed);
                Ok(diagnostics)
            },
            Err(e) => Ok(vec![e.into_diagnostic().with_attribute("upcharge")]),
        }
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Provider stopping");
        Ok(())
    }

    #[instrument(skip(self, config))]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let kind: ResourceType = resource_type.parse()?;
        Ok(kind.validate(&config))
    }

    #[instrument(skip(self, state))]
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let kind: ResourceType = resource_type.parse()?;
        let current = kind.schema().version;
        if u64::try_from(version).map_or(true, |version| version > current) {
            return Err(ProviderError::InvalidRequest(format!(
                "{} state has schema version {}, this provider reads up to {}",
                kind, version, current
            )));
        }
        Ok(state)
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let kind: ResourceType = resource_type.parse()?;

        if proposed_state.is_null() {
            return Ok(match prior_state {
                Some(prior) => {
                    let changes = AttributeChange::diff(&prior, &Value::Null);
                    PlanResult::with_changes(Value::Null, changes, false)
                },
                None => PlanResult::no_change(Value::Null),
            });
        }

        ProviderError::from_diagnostics(&kind.validate(&proposed_state))?;
        let config = self.config().await;
        let planned = kind.apply(proposed_state, &config)?;

        let prior = prior_state.unwrap_or(Value::Null);
        let changes = AttributeChange::diff(&prior, &planned);
        if changes.is_empty() {
            return Ok(PlanResult::no_change(planned));
        }

        let requires_replace = !prior.is_null()
            && kind
                .schema()
                .force_new_attributes()
                .any(|name| changes.iter().any(|change| change.path == name));
        if requires_replace {
            debug!(resource_type, "Plan requires replacement");
        }
        Ok(PlanResult::with_changes(planned, changes, requires_replace))
    }

    #[instrument(skip(self, planned_state))]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let kind: ResourceType = resource_type.parse()?;
        let state = kind.apply(planned_state, &*self.config().await)?;
        info!(id = %state["id"], "Resource created");
        Ok(state)
    }

    #[instrument(skip(self, current_state))]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let kind: ResourceType = resource_type.parse()?;
        kind.apply(current_state, &*self.config().await)
    }

    #[instrument(skip(self, _prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        _prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let kind: ResourceType = resource_type.parse()?;
        let state = kind.apply(planned_state, &*self.config().await)?;
        info!(id = %state["id"], "Resource updated");
        Ok(state)
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        resource_type.parse::<ResourceType>()?;
        debug!(id = %current_state["id"], "Nothing to delete");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let kind: ResourceType = resource_type.parse()?;
        let state = kind.import(id)?;
        info!("Resource imported");
        Ok(vec![ImportedResource::new(kind.type_name(), state)])
    }

    #[instrument(skip(self, config))]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let kind: DataSourceType = data_source_type.parse()?;
        Ok(kind.validate(&config))
    }

    #[instrument(skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let kind: DataSourceType = data_source_type.parse()?;
        ProviderError::from_diagnostics(&kind.validate(&config))?;
        kind.read(&config, &*self.config().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn tester() -> ProviderTester<HwProvider> {
        ProviderTester::new(HwProvider::new())
    }

    #[test]
    fn test_metadata_advertises_destroy_plans() {
        let metadata = HwProvider::new().metadata();
        assert!(metadata.capabilities.plan_destroy);
        assert_eq!(metadata.resources.len(), ResourceType::ALL.len());
        assert_eq!(metadata.data_sources[2], "hw_menu");
    }

    #[tokio::test]
    async fn test_schema_registers_everything() {
        let tester = tester();
        assert_eq!(tester.resource_types().len(), 16);
        assert_eq!(
            tester.data_source_types(),
            ["hw_condiments", "hw_deli_meats", "hw_menu", "hw_order"]
        );
        assert!(tester.schema().provider.block.attributes.contains_key("upcharge"));
    }

    #[tokio::test]
    async fn test_default_config_before_configure() {
        let tester = tester();
        let state = tester
            .lifecycle_create("hw_chips", json!({"size": "medium"}))
            .await
            .unwrap();
        assert_eq!(state["price"], "1.50");
    }

    #[tokio::test]
    async fn test_configure_upcharge() {
        let tester = tester();
        tester.configure(json!({"upcharge": 0.25})).await.unwrap();
        assert_eq!(tester.provider().config().await.upcharge, Decimal::new(25, 2));

        let state = tester
            .lifecycle_create("hw_tables", json!({"style": "premium", "quantity": 25}))
            .await
            .unwrap();
        assert_eq!(state["cost"], "1250.25");
    }

    #[tokio::test]
    async fn test_configure_rejects_overflowing_upcharge() {
        let tester = tester();
        let block: Value = serde_json::from_str(r#"{"upcharge": 5e28}"#).unwrap();
        assert!(tester.configure(block).await.is_err());

        let order = tester.read_data_source("hw_order", json!({})).await.unwrap();
        assert_eq!(order["total"], "19.75");
    }

    #[tokio::test]
    async fn test_configure_keeps_upcharge_digits() {
        let tester = tester();
        let block: Value = serde_json::from_str(r#"{"upcharge": 12.345678901234567891}"#).unwrap();
        tester.configure(block).await.unwrap();
        assert_eq!(
            tester.provider().config().await.upcharge.to_string(),
            "12.345678901234567891"
        );
    }

    #[tokio::test]
    async fn test_configure_rejects_negative_upcharge() {
        let tester = tester();
        let err = tester.configure(json!({"upcharge": -1})).await.unwrap_err();
        match err {
            TestError::Diagnostics(diagnostics) => {
                assert_error_contains(&diagnostics, "Invalid provider configuration");
                assert_eq!(diagnostics[0].attribute, Some("upcharge".to_string()));
            },
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(tester.provider().config().await.upcharge, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_validate_provider_config() {
        let tester = tester();
        assert!(tester.validate_provider_config(json!({})).await.is_ok());
        assert!(tester
            .validate_provider_config(json!({"upcharge": true}))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_plan_create() {
        let plan = tester()
            .plan_create("hw_bread", json!({"kind": "rye"}))
            .await
            .unwrap();
        assert_plan_creates(&plan);
        assert_plan_changes_attribute(&plan, "id");
        assert_eq!(plan.planned_state["id"], "bread-rye-3");
    }

    #[tokio::test]
    async fn test_plan_replaces_on_discriminator_change() {
        let tester = tester();
        let prior = tester
            .lifecycle_create("hw_drink", json!({"kind": "soda", "ice": [{"some": true}]}))
            .await
            .unwrap();

        let mut proposed = prior.clone();
        proposed["kind"] = json!("lemonade");
        let plan = tester.plan_update("hw_drink", prior, proposed).await.unwrap();

        assert_plan_replaces(&plan);
        assert_plan_changes_attribute(&plan, "kind");
        assert_plan_changes_attribute(&plan, "price");
        assert_eq!(plan.planned_state["id"], "drink-lemonade-8");
    }

    #[tokio::test]
    async fn test_plan_updates_in_place() {
        let tester = tester();
        let prior = tester
            .lifecycle_create("hw_napkins", json!({"style": "paper", "quantity": 100}))
            .await
            .unwrap();

        let mut proposed = prior.clone();
        proposed["quantity"] = json!(200);
        let plan = tester.plan_update("hw_napkins", prior, proposed).await.unwrap();

        assert_plan_updates_in_place(&plan);
        assert_plan_changes_attribute(&plan, "price");
        assert_plan_does_not_change_attribute(&plan, "id");
    }

    #[tokio::test]
    async fn test_plan_no_changes_on_reread() {
        let tester = tester();
        let state = tester
            .lifecycle_create("hw_cook", json!({"name": "Sam", "experience": "master"}))
            .await
            .unwrap();
        let plan = tester
            .plan_update("hw_cook", state.clone(), state)
            .await
            .unwrap();
        assert_plan_no_changes(&plan);
    }

    #[tokio::test]
    async fn test_plan_delete() {
        let tester = tester();
        let state = tester
            .lifecycle_create("hw_bread", json!({"kind": "rye"}))
            .await
            .unwrap();
        let plan = tester.plan_delete("hw_bread", state).await.unwrap();
        assert_plan_changes_attribute(&plan, "id");
        assert!(plan.planned_state.is_null());
    }

    #[tokio::test]
    async fn test_plan_rejects_invalid_ice() {
        let err = tester()
            .plan_create("hw_drink", json!({"kind": "soda", "ice": [{"lots": true, "max": true}]}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_crud_lifecycle() {
        let tester = tester();
        tester.configure(json!({"upcharge": 1})).await.unwrap();

        let state = tester
            .lifecycle_crud(
                "hw_chairs",
                json!({"style": "basic", "quantity": 10}),
                json!({"style": "basic", "quantity": 20}),
            )
            .await
            .unwrap();
        assert_eq!(state["cost"], "201.00");
        assert_eq!(state["id"], "chairs-basic-5");
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let err = tester().read("hw_toaster", json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_validate_resource_config() {
        let tester = tester();
        assert!(tester
            .validate_resource_config("hw_crackers", json!({"kind": "oyster", "quantity": 3}))
            .await
            .is_ok());
        assert!(tester
            .validate_resource_config("hw_crackers", json!({"kind": "oyster"}))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_import_then_read() {
        let tester = tester();
        let imported = tester.import_resource("hw_oven", "oven-conveyor-8").await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].resource_type, "hw_oven");

        let state = tester
            .read("hw_oven", imported[0].state.clone())
            .await
            .unwrap();
        assert_eq!(state["capacity"], 80);
        assert_eq!(state["cost"], "6000.00");
    }

    #[tokio::test]
    async fn test_import_composite_unsupported() {
        let err = tester()
            .import_resource("hw_bag", "bread-rye-3meat-ham-3drink-soda-4")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unimplemented(_)));
    }

    #[tokio::test]
    async fn test_upgrade_resource_state() {
        let tester = tester();
        let state = json!({"kind": "rye", "id": "bread-rye-3"});
        assert_eq!(
            tester
                .upgrade_resource_state("hw_bread", 0, state.clone())
                .await
                .unwrap(),
            state
        );
        assert!(tester.upgrade_resource_state("hw_bread", 3, state).await.is_err());
    }

    #[tokio::test]
    async fn test_store_from_created_parts() {
        let tester = tester();
        let oven = tester
            .lifecycle_create("hw_oven", json!({"kind": "electric"}))
            .await
            .unwrap();
        let fridge = tester
            .lifecycle_create("hw_fridge", json!({"size": "small"}))
            .await
            .unwrap();
        let tables = tester
            .lifecycle_create("hw_tables", json!({"style": "basic", "quantity": 4}))
            .await
            .unwrap();
        let chairs = tester
            .lifecycle_create("hw_chairs", json!({"style": "basic", "quantity": 16}))
            .await
            .unwrap();
        let cook = tester
            .lifecycle_create("hw_cook", json!({"name": "Lee", "experience": "intermediate"}))
            .await
            .unwrap();

        let store = tester
            .lifecycle_create(
                "hw_store",
                json!({
                    "name": "main",
                    "oven_id": oven["id"],
                    "fridge_id": fridge["id"],
                    "tables_id": tables["id"],
                    "chairs_id": chairs["id"],
                    "cook_ids": [cook["id"]]
                }),
            )
            .await
            .unwrap();

        // 1800 + 800 + 20 + 10 + 20
        assert_eq!(store["cost"], "2650.00");
        assert_eq!(store["customers_per_hour"], 15);
        assert_eq!(store["id"], "store-main-4");
    }

    #[tokio::test]
    async fn test_read_data_sources() {
        let tester = tester();
        tester.configure(json!({"upcharge": 0.5})).await.unwrap();

        let order = tester.read_data_source("hw_order", json!({})).await.unwrap();
        assert_eq!(order["total"], "22.25");

        let err = tester
            .read_data_source("hw_order", json!({"customer": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));

        assert!(tester
            .validate_data_source_config("hw_menu", json!({}))
            .await
            .is_ok());
        assert!(tester.read_data_source("hw_specials", json!({})).await.is_err());
    }
}
