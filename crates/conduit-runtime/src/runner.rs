//! Process entry point for components.

use std::process::ExitCode;

use conduit_telemetry::{DiagnosticEscalated, Diagnostics, LogConfig, setup_logging};
use tracing::{error, info};

use crate::application::Application;
use crate::component::Component;
use crate::data_dir::DATA_DIR_ENV;
use crate::error::{EXIT_APPLICATION_ERROR, RuntimeError, RuntimeResult};

/// Run a component as the whole process.
///
/// Sets up logging from the environment with escalation enabled,
/// bootstraps from [`DATA_DIR_ENV`], runs the component and maps the
/// outcome to an exit code: `0` on success, `1` for user errors, `2` for
/// everything else. Failures are reported on stderr.
pub fn run_component<C: Component>(mut component: C) -> ExitCode {
    let diagnostics = Diagnostics::install();

    if let Err(err) = LogConfig::from_env()
        .and_then(|config| setup_logging(&config, Some(&diagnostics)))
        .map_err(RuntimeError::from)
    {
        eprintln!("error: {err}");
        return ExitCode::from(EXIT_APPLICATION_ERROR);
    }

    let env_value = std::env::var(DATA_DIR_ENV).ok();
    match execute(&mut component, diagnostics, env_value.as_deref()) {
        Ok(()) => {
            info!("component finished");
            ExitCode::SUCCESS
        },
        Err(err) => {
            let code = err.exit_code();
            error!(escalate = false, exit_code = code, error = %err, "component failed");
            eprintln!("error: {err}");
            ExitCode::from(code)
        },
    }
}

/// Bootstrap and run a component without touching global state.
///
/// The diagnostics policy is checked once more after the run step, so a
/// warning logged by the component fails the invocation even when `run`
/// returned `Ok`.
///
/// # Errors
///
/// Returns the bootstrap error, the component's error, or the escalated
/// diagnostic, in that order of precedence.
pub fn execute<C: Component>(
    component: &mut C,
    diagnostics: Diagnostics,
    env_value: Option<&str>,
) -> RuntimeResult<()> {
    let definition = component.definition();
    let app = Application::<C::Parameters>::with_diagnostics(
        diagnostics,
        definition.as_ref(),
        env_value,
    )?;

    component.run(&app).map_err(component_error)?;
    app.diagnostics().check()?;
    Ok(())
}

/// A diagnostic raised inside `run` keeps its own variant.
fn component_error(err: anyhow::Error) -> RuntimeError {
    match err.downcast::<DiagnosticEscalated>() {
        Ok(escalated) => RuntimeError::Diagnostic(escalated),
        Err(err) => RuntimeError::Component(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use conduit_config::{ConfigDefinition, Field, ObjectSchema, SchemaNode};
    use conduit_manifest::TableManifest;
    use conduit_telemetry::{ReportingMask, Severity, diagnostic};
    use conduit_test::DataDirFixture;
    use serde::Deserialize;
    use serde_json::{Map, Value, json};
    use tracing_subscriber::layer::SubscriberExt;

    use crate::error::{EXIT_USER_ERROR, UserError};

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

    #[derive(Default)]
    struct Exporter {
        seen_table: Option<String>,
    }

    impl Component for Exporter {
        type Parameters = OrdersParams;

        fn definition(&self) -> Box<dyn ConfigDefinition> {
            Box::new(OrdersDefinition)
        }

        fn run(&mut self, app: &Application<OrdersParams>) -> anyhow::Result<()> {
            let table = &app.config().parameters().table;
            app.manifest_manager().write_manifest(
                format!("out/tables/{table}.csv"),
                &TableManifest::new(format!("out.c-shop.{table}"), ["id", "amount"])
                    .with_primary_key(["id"]),
            )?;
            self.seen_table = Some(table.clone());
            Ok(())
        }
    }

    struct Noop;

    impl Component for Noop {
        type Parameters = Map<String, Value>;
    }

    struct Failing(fn() -> anyhow::Result<()>);

    impl Component for Failing {
        type Parameters = Map<String, Value>;

        fn run(&mut self, _app: &Application<Self::Parameters>) -> anyhow::Result<()> {
            (self.0)()
        }
    }

    #[test]
    fn test_execute_runs_component() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {"table": "orders"}}));
        let mut exporter = Exporter::default();

        execute(&mut exporter, Diagnostics::install(), Some(fixture.env_value())).unwrap();

        assert_eq!(exporter.seen_table.as_deref(), Some("orders"));
        assert!(
            fixture
                .path()
                .join("out/tables/orders.csv.manifest")
                .exists()
        );
    }

    #[test]
    fn test_default_run_is_noop() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        execute(&mut Noop, Diagnostics::install(), Some(fixture.env_value())).unwrap();
    }

    #[test]
    fn test_component_is_not_run_after_failed_bootstrap() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let mut exporter = Exporter::default();

        let err = execute(&mut exporter, Diagnostics::install(), Some(fixture.env_value()))
            .unwrap_err();

        assert!(exporter.seen_table.is_none());
        assert_eq!(err.exit_code(), EXIT_USER_ERROR);
    }

    #[test]
    fn test_component_errors() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));

        let err = execute(
            &mut Failing(|| Err(UserError::new("table 'orders' not mapped").into())),
            Diagnostics::install(),
            Some(fixture.env_value()),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USER_ERROR);

        let err = execute(
            &mut Failing(|| Err(anyhow::anyhow!("disk full")).context("writing orders.csv")),
            Diagnostics::install(),
            Some(fixture.env_value()),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), EXIT_APPLICATION_ERROR);
        assert_eq!(err.to_string(), "writing orders.csv: disk full");
    }

    #[test]
    fn test_warning_during_run_escalates() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let diagnostics = Diagnostics::install();
        let subscriber = tracing_subscriber::registry().with(diagnostics.layer());

        let result = tracing::subscriber::with_default(subscriber, || {
            execute(
                &mut Failing(|| {
                    tracing::warn!("value truncated to 255 characters");
                    Ok(())
                }),
                diagnostics.clone(),
                Some(fixture.env_value()),
            )
        });

        match result {
            Err(RuntimeError::Diagnostic(escalated)) => {
                assert_eq!(escalated.message, "value truncated to 255 characters");
                assert!(escalated.file.ends_with("runner.rs"));
                assert!(escalated.line > 0);
            },
            other => panic!("expected escalated diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn test_exempt_and_masked_events_do_not_escalate() {
        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let diagnostics = Diagnostics::with_mask(ReportingMask::ALL.without(Severity::Warning));
        let subscriber = tracing_subscriber::registry().with(diagnostics.layer());

        let result = tracing::subscriber::with_default(subscriber, || {
            execute(
                &mut Failing(|| {
                    tracing::warn!("deprecated option 'delimiter' used");
                    tracing::error!(escalate = false, "retrying upload");
                    Ok(())
                }),
                diagnostics.clone(),
                Some(fixture.env_value()),
            )
        });

        assert!(result.is_ok(), "unexpected failure: {result:?}");
    }

    #[test]
    fn test_raised_diagnostic_aborts_run() {
        struct Raising;

        impl Component for Raising {
            type Parameters = Map<String, Value>;

            fn run(&mut self, app: &Application<Self::Parameters>) -> anyhow::Result<()> {
                app.diagnostics()
                    .raise(diagnostic!(Severity::Notice, "undefined index 'amount'"))?;
                Ok(())
            }
        }

        let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
        let err = execute(&mut Raising, Diagnostics::install(), Some(fixture.env_value()))
            .unwrap_err();
        assert_eq!(err.exit_code(), EXIT_APPLICATION_ERROR);
        assert!(err.to_string().starts_with("notice: undefined index 'amount' in "));
        match err {
            RuntimeError::Diagnostic(escalated) => {
                assert_eq!(escalated.severity, Severity::Notice);
                assert!(escalated.file.ends_with("runner.rs"));
            },
            other => panic!("expected escalated diagnostic, got {other:?}"),
        }
    }
}
