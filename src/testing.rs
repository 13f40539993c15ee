//! Lifecycle harness and assertions for exercising a provider in tests.
//!
//! [`ProviderTester`] drives a [`ProviderService`] directly, without the
//! stdio host loop, and turns error diagnostics into [`TestError`]s.
//!
//! # Example
//!
//! ```
//! use hw_provider::testing::{assert_money, assert_plan_replaces, ProviderTester};
//! use hw_provider::HwProvider;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let tester = ProviderTester::new(HwProvider::new());
//! tester.configure(json!({"upcharge": 0.5})).await.unwrap();
//!
//! let chips = tester
//!     .lifecycle_create("hw_chips", json!({"size": "small"}))
//!     .await
//!     .unwrap();
//! assert_money(&chips, "price", "1.50");
//!
//! let mut bigger = chips.clone();
//! bigger["size"] = json!("large");
//! let plan = tester.plan_update("hw_chips", chips, bigger).await.unwrap();
//! assert_plan_replaces(&plan);
//! # });
//! ```

use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Drives a [`ProviderService`] the way a host would.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Wrap `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The provider schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Resource type names from the metadata.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Data source type names from the metadata.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Validate a provider block, failing on any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        errors_only(self.provider.validate_provider_config(config).await?)
    }

    /// Apply a provider block, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        errors_only(self.provider.configure(config).await?)
    }

    /// Validate a resource block, failing on any error diagnostic.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        errors_only(diagnostics)
    }

    /// Plan creating a resource from `config`.
    pub async fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, config.clone(), config)
            .await
    }

    /// Plan moving `prior_state` to `proposed_state`.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        let config = proposed_state.clone();
        self.provider
            .plan(resource_type, Some(prior_state), proposed_state, config)
            .await
    }

    /// Plan deleting the resource held in `prior_state`.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Refresh a resource.
    pub async fn read(&self, resource_type: &str, state: Value) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, state).await
    }

    /// Import `id`.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Import `id` and complete the partial state with a read.
    pub async fn import_and_read(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Value, ProviderError> {
        let imported = self
            .import_resource(resource_type, id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;
        self.read(&imported.resource_type, imported.state).await
    }

    /// Bring stored state up to the current schema version.
    pub async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .upgrade_resource_state(resource_type, version, state)
            .await
    }

    /// Validate a data source block, failing on any error diagnostic.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        errors_only(diagnostics)
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Plan, create and read back a resource. Returns the read state.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self
            .provider
            .create(resource_type, plan.planned_state)
            .await?;
        self.read(resource_type, created).await
    }

    /// Create a resource, update it to `updated_config`, read it back and
    /// delete it. Returns the state read after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;

        let plan = self
            .plan_update(resource_type, created.clone(), updated_config)
            .await?;
        let updated = self
            .provider
            .update(resource_type, created, plan.planned_state)
            .await?;
        let updated = self.read(resource_type, updated).await?;

        self.plan_delete(resource_type, updated.clone()).await?;
        self.provider.delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }
}

/// A tester operation failed.
#[derive(Debug)]
pub enum TestError {
    /// The provider answered with error diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The provider returned an error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn errors_only(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

fn changed_paths(plan: &PlanResult) -> Vec<&str> {
    plan.changes.iter().map(|c| c.path.as_str()).collect()
}

/// Assert that `plan` creates a resource: it has changes and no prior state
/// to replace.
///
/// # Panics
///
/// Panics otherwise.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(!plan.changes.is_empty(), "Expected a create plan, got no changes");
    assert!(!plan.requires_replace, "Expected a create plan, got a replacement");
}

/// Assert that `plan` changes nothing.
///
/// # Panics
///
/// Panics if any attribute changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, got {:?}",
        changed_paths(plan)
    );
}

/// Assert that `plan` needs a new resource.
///
/// # Panics
///
/// Panics if the plan updates in place.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected a replacement, got an in-place plan changing {:?}",
        changed_paths(plan)
    );
}

/// Assert that `plan` changes something without replacing the resource.
///
/// # Panics
///
/// Panics if the plan is empty or requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(!plan.changes.is_empty(), "Expected an update, got no changes");
    assert!(
        !plan.requires_replace,
        "Expected an in-place update, got a replacement"
    );
}

/// Assert that `plan` removes the resource.
///
/// # Panics
///
/// Panics if the planned state is not null.
pub fn assert_plan_deletes(plan: &PlanResult) {
    assert!(
        plan.planned_state.is_null(),
        "Expected a delete plan, got planned state {}",
        plan.planned_state
    );
}

/// Assert that `plan` changes the attribute at `path`.
///
/// # Panics
///
/// Panics if no change has that path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "Expected '{}' to change, changed attributes are {:?}",
        path,
        changed_paths(plan)
    );
}

/// Assert that `plan` leaves the attribute at `path` alone.
///
/// # Panics
///
/// Panics if a change has that path.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().all(|c| c.path != path),
        "Expected '{}' to stay the same, but it changes",
        path
    );
}

/// Assert that some error diagnostic's summary contains `substring`.
///
/// # Panics
///
/// Panics if none does.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(
        errors.iter().any(|d| d.summary.contains(substring)),
        "Expected an error containing '{}', errors are {:?}",
        substring,
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that some error diagnostic points at `attribute`.
///
/// # Panics
///
/// Panics if none does.
pub fn assert_error_at(diagnostics: &[Diagnostic], attribute: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.attribute.as_deref() == Some(attribute)),
        "Expected an error at '{}', errors are at {:?}",
        attribute,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.attribute)
            .collect::<Vec<_>>()
    );
}

/// Assert that a money attribute of `state` equals `expected`.
///
/// Money is compared as a decimal, so `"2"` matches `"2.00"`.
///
/// # Panics
///
/// Panics if the attribute is missing, is not a decimal string, or differs.
pub fn assert_money(state: &Value, attribute: &str, expected: &str) {
    let actual = state
        .get(attribute)
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<Decimal>().ok());
    let expected_amount = expected.parse::<Decimal>().ok();

    assert!(
        actual.is_some() && actual == expected_amount,
        "Expected '{}' to be {}, but state has {:?}",
        attribute,
        expected,
        state.get(attribute)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::provider::HwProvider;
    use serde_json::json;

    #[tokio::test]
    async fn test_tester_configure() {
        let tester = ProviderTester::new(HwProvider::new());
        assert!(tester.configure(json!({"upcharge": 2})).await.is_ok());
        assert!(tester.configure(json!({"upcharge": "lots"})).await.is_err());
    }

    #[tokio::test]
    async fn test_tester_resource_types() {
        let tester = ProviderTester::new(HwProvider::new());
        let types = tester.resource_types();
        assert!(types.contains(&"hw_sandwich".to_string()));
        assert!(tester.schema().resources.contains_key("hw_store"));
    }

    #[tokio::test]
    async fn test_tester_plan_update_with_changes() {
        let tester = ProviderTester::new(HwProvider::new());
        let plan = tester
            .plan_update(
                "hw_cook",
                json!({"name": "Ana", "experience": "junior"}),
                json!({"name": "Bea", "experience": "junior"}),
            )
            .await
            .unwrap();

        assert_plan_changes_attribute(&plan, "name");
        assert_plan_updates_in_place(&plan);
    }

    #[tokio::test]
    async fn test_tester_lifecycle_create() {
        let tester = ProviderTester::new(HwProvider::with_config(ProviderConfig::with_upcharge(
            Decimal::new(1, 0),
        )));
        let state = tester
            .lifecycle_create("hw_cheese", json!({"kind": "cheddar"}))
            .await
            .unwrap();

        assert_eq!(state["id"], "cheese-cheddar-7");
        assert_money(&state, "price", "1.75");
    }

    #[tokio::test]
    async fn test_tester_lifecycle_crud() {
        let tester = ProviderTester::new(HwProvider::new());
        let final_state = tester
            .lifecycle_crud(
                "hw_silverware",
                json!({"style": "plastic", "quantity": 10}),
                json!({"style": "plastic", "quantity": 30}),
            )
            .await
            .unwrap();

        assert_money(&final_state, "price", "3");
    }

    #[test]
    fn test_assert_money() {
        let state = json!({"price": "2.50", "quantity": 3});
        assert_money(&state, "price", "2.5");
    }

    #[test]
    #[should_panic(expected = "Expected 'quantity' to be 3")]
    fn test_assert_money_rejects_non_money() {
        assert_money(&json!({"quantity": 3}), "quantity", "3");
    }

    #[tokio::test]
    async fn test_tester_import_and_read() {
        let tester = ProviderTester::new(HwProvider::new());
        let state = tester.import_and_read("hw_meat", "meat-pastrami-8").await.unwrap();
        assert_eq!(state["kind"], "pastrami");
        assert_money(&state, "price", "4.50");
    }

    #[tokio::test]
    async fn test_tester_plan_delete() {
        let tester = ProviderTester::new(HwProvider::new());
        let state = tester
            .lifecycle_create("hw_bread", json!({"kind": "wheat"}))
            .await
            .unwrap();
        let plan = tester.plan_delete("hw_bread", state).await.unwrap();
        assert_plan_deletes(&plan);
    }

    #[tokio::test]
    async fn test_tester_validation_diagnostics() {
        let tester = ProviderTester::new(HwProvider::new());
        let err = tester
            .validate_resource_config("hw_bag", json!({"style": "paper", "sandwich_id": "x"}))
            .await
            .unwrap_err();
        match err {
            TestError::Diagnostics(diagnostics) => assert_error_at(&diagnostics, "drink_id"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_assert_error_contains() {
        let diagnostics = vec![
            Diagnostic::warning("Unusual kind"),
            Diagnostic::error("Invalid ice configuration").with_attribute("ice"),
        ];
        assert_error_contains(&diagnostics, "ice");
        assert_error_at(&diagnostics, "ice");
    }

    #[test]
    #[should_panic(expected = "Expected an error at 'kind'")]
    fn test_assert_error_at_ignores_warnings() {
        let diagnostics = vec![Diagnostic::warning("Unusual kind").with_attribute("kind")];
        assert_error_at(&diagnostics, "kind");
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("Missing required attribute 'kind'").with_attribute("kind"),
            Diagnostic::error("Invalid drink reference").with_detail("'soda' is not a drink"),
        ]);

        let display = format!("{}", err);
        assert!(display.contains("Missing required attribute"));
        assert!(display.contains("(at kind)"));
        assert!(display.contains("'soda' is not a drink"));
    }
}
