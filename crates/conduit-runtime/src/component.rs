//! The component extension point.

use conduit_config::{BaseDefinition, ConfigDefinition};
use serde::de::DeserializeOwned;

use crate::application::Application;

/// A data-pipeline component run by [`run_component`](crate::run_component).
///
/// ```rust,no_run
/// use conduit_config::{ConfigDefinition, Field, ObjectSchema, SchemaNode};
/// use conduit_manifest::TableManifest;
/// use conduit_runtime::{Application, Component, run_component};
/// use serde::Deserialize;
///
/// struct OrdersDefinition;
///
/// impl ConfigDefinition for OrdersDefinition {
///     fn parameters_schema(&self) -> ObjectSchema {
///         ObjectSchema::new().field("table", Field::required(SchemaNode::String))
///     }
/// }
///
/// #[derive(Deserialize)]
/// struct Params {
///     table: String,
/// }
///
/// struct Exporter;
///
/// impl Component for Exporter {
///     type Parameters = Params;
///
///     fn definition(&self) -> Box<dyn ConfigDefinition> {
///         Box::new(OrdersDefinition)
///     }
///
///     fn run(&mut self, app: &Application<Params>) -> anyhow::Result<()> {
///         let table = &app.config().parameters().table;
///         let csv = app.data_dir().join(format!("out/tables/{table}.csv"));
///         std::fs::write(&csv, "id,amount\n1,10\n")?;
///         app.manifest_manager().write_manifest(
///             &csv,
///             &TableManifest::new(format!("out.c-shop.{table}"), ["id", "amount"])
///                 .with_primary_key(["id"]),
///         )?;
///         Ok(())
///     }
/// }
///
/// fn main() -> std::process::ExitCode {
///     run_component(Exporter)
/// }
/// ```
pub trait Component {
    /// Typed shape of the `parameters` object.
    type Parameters: DeserializeOwned;

    /// The schema `config.json` is validated against.
    fn definition(&self) -> Box<dyn ConfigDefinition> {
        Box::new(BaseDefinition)
    }

    /// The component's work.
    ///
    /// The default does nothing: implementing it is the concrete
    /// component's job.
    ///
    /// # Errors
    ///
    /// Any error aborts the invocation. Wrap user-caused failures in
    /// [`UserError`](crate::UserError) to get exit code 1.
    fn run(&mut self, _app: &Application<Self::Parameters>) -> anyhow::Result<()> {
        Ok(())
    }
}
