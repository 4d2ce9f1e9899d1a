//! The application shell.
//!
//! Bootstrap runs in a fixed order, and every step must succeed before the
//! next one starts:
//!
//! 1. install the diagnostics policy
//! 2. resolve the data directory
//! 3. load and validate `config.json`
//! 4. bind the manifest manager to the data directory
//!
//! Escalated diagnostics are checked between steps. A failed bootstrap
//! returns an error and no [`Application`] exists.

use conduit_config::{Config, ConfigDefinition};
use conduit_manifest::ManifestManager;
use conduit_telemetry::Diagnostics;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::data_dir::{DATA_DIR_ENV, DataDir};
use crate::error::RuntimeResult;

/// A fully bootstrapped component invocation.
///
/// `P` is the typed shape of the `parameters` object in `config.json`.
#[derive(Debug)]
pub struct Application<P = Map<String, Value>> {
    diagnostics: Diagnostics,
    data_dir: DataDir,
    config: Config<P>,
    manifest_manager: ManifestManager,
}

impl<P: DeserializeOwned> Application<P> {
    /// Bootstrap with a fresh diagnostics policy.
    ///
    /// `env_value` is the raw value of [`DATA_DIR_ENV`], `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub fn bootstrap(
        definition: &dyn ConfigDefinition,
        env_value: Option<&str>,
    ) -> RuntimeResult<Self> {
        Self::with_diagnostics(Diagnostics::install(), definition, env_value)
    }

    /// Bootstrap using the data directory named by [`DATA_DIR_ENV`].
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub fn from_env(definition: &dyn ConfigDefinition) -> RuntimeResult<Self> {
        let env_value = std::env::var(DATA_DIR_ENV).ok();
        Self::bootstrap(definition, env_value.as_deref())
    }

    /// Bootstrap with an existing diagnostics policy, typically the one
    /// whose layer is installed in the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub fn with_diagnostics(
        diagnostics: Diagnostics,
        definition: &dyn ConfigDefinition,
        env_value: Option<&str>,
    ) -> RuntimeResult<Self> {
        diagnostics.check()?;

        let data_dir = DataDir::resolve(env_value);
        debug!(data_dir = %data_dir, "resolved data directory");
        diagnostics.check()?;

        let config = Config::<P>::load(data_dir.path(), definition)?;
        diagnostics.check()?;

        let manifest_manager = ManifestManager::new(data_dir.path());
        diagnostics.check()?;

        info!(
            data_dir = %data_dir,
            action = config.action(),
            "component bootstrapped"
        );

        Ok(Self {
            diagnostics,
            data_dir,
            config,
            manifest_manager,
        })
    }
}

impl<P> Application<P> {
    /// The resolved data directory.
    pub fn data_dir(&self) -> &DataDir {
        &self.data_dir
    }

    /// The validated configuration.
    pub fn config(&self) -> &Config<P> {
        &self.config
    }

    /// Manifest manager bound to the data directory.
    pub fn manifest_manager(&self) -> &ManifestManager {
        &self.manifest_manager
    }

    /// The diagnostics policy of this invocation.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_config::{BaseDefinition, ConfigError, Field, ObjectSchema, SchemaNode};
    use conduit_manifest::TableManifest;
    use conduit_telemetry::{Diagnostic, ReportingMask, Severity};
    use conduit_test::DataDirFixture;
    use serde::Deserialize;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;

    use crate::error::RuntimeError;

    struct OrdersDefinition;

    impl ConfigDefinition for OrdersDefinition {
        fn parameters_schema(&self) -> ObjectSchema {
            ObjectSchema::new().field("table", Field::required(SchemaNode::String))
        }
    }

    #[derive(Debug, Deserialize)]
    struct OrdersParams {
        table: String,
    }

    #[test]
    fn test_bootstrap() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {"table": "orders"}}));

        let app =
            Application::<OrdersParams>::bootstrap(&OrdersDefinition, Some(fixture.env_value()))
                .unwrap();

        assert_eq!(app.config().parameters().table, "orders");
        assert!(app.data_dir().as_str().ends_with('/'));
        assert_eq!(app.manifest_manager().data_dir(), app.data_dir().path());
        assert_eq!(app.diagnostics().mask(), ReportingMask::ALL);
    }

    #[test]
    fn test_bootstrap_normalizes_data_dir() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let env_value = format!("{}///", fixture.env_value());

        let app: Application = Application::bootstrap(&BaseDefinition, Some(&env_value)).unwrap();
        assert_eq!(app.data_dir().as_str(), format!("{}/", fixture.env_value()));
    }

    #[test]
    fn test_bootstrap_fails_without_config() {
        let fixture = DataDirFixture::new();
        let result = Application::<Map<String, Value>>::bootstrap(
            &BaseDefinition,
            Some(fixture.env_value()),
        );
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::ReadError { .. }))
        ));
    }

    #[test]
    fn test_bootstrap_fails_on_schema_violation() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {"table": 7}}));
        let err = Application::<OrdersParams>::bootstrap(
            &OrdersDefinition,
            Some(fixture.env_value()),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), crate::EXIT_USER_ERROR);
    }

    #[test]
    fn test_bootstrap_aborts_on_prior_diagnostic() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let diagnostics = Diagnostics::install();
        let subscriber = tracing_subscriber::registry().with(diagnostics.layer());

        let result = tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("locale not set, falling back to C");
            Application::<Map<String, Value>>::with_diagnostics(
                diagnostics.clone(),
                &BaseDefinition,
                Some(fixture.env_value()),
            )
        });

        match result {
            Err(RuntimeError::Diagnostic(escalated)) => {
                assert_eq!(escalated.message, "locale not set, falling back to C");
                assert_eq!(escalated.severity, Severity::Warning);
            },
            other => panic!("expected escalated diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn test_manifest_manager_writes_under_data_dir() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let app: Application =
            Application::bootstrap(&BaseDefinition, Some(fixture.env_value())).unwrap();

        let manifest = TableManifest::new("out.c-shop.orders", ["id"]);
        let path = app
            .manifest_manager()
            .write_manifest("out/tables/orders.csv", &manifest)
            .unwrap();
        assert_eq!(path, fixture.path().join("out/tables/orders.csv.manifest"));
    }

    #[test]
    fn test_raise_through_application() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let app: Application =
            Application::bootstrap(&BaseDefinition, Some(fixture.env_value())).unwrap();

        let diagnostic = Diagnostic::new(Severity::Notice, "empty row skipped", "src/lib.rs", 1);
        assert!(app.diagnostics().raise(diagnostic).is_err());
    }
}
