//! Shared components and definitions for integration tests.

use conduit_config::{ConfigDefinition, Field, ObjectSchema, SchemaNode};
use conduit_manifest::TableManifest;
use conduit_runtime::{Application, Component, UserError};
use serde::Deserialize;

/// Definition requiring `parameters.table` as a string.
#[allow(dead_code)]
pub struct OrdersDefinition;

impl ConfigDefinition for OrdersDefinition {
    fn parameters_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
            .field("table", Field::required(SchemaNode::String))
            .field(
                "incremental",
                Field::optional(SchemaNode::Boolean).with_default(false),
            )
    }
}

/// Typed parameters of [`OrdersDefinition`].
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct OrdersParams {
    pub table: String,
    pub incremental: bool,
}

/// Copies the mapped input table to `out/tables/` and writes its manifest,
/// reusing the columns of the upstream manifest.
#[derive(Default)]
#[allow(dead_code)]
pub struct OrdersExporter {
    pub written: Option<std::path::PathBuf>,
}

impl Component for OrdersExporter {
    type Parameters = OrdersParams;

    fn definition(&self) -> Box<dyn ConfigDefinition> {
        Box::new(OrdersDefinition)
    }

    fn run(&mut self, app: &Application<OrdersParams>) -> anyhow::Result<()> {
        let params = app.config().parameters();
        let manager = app.manifest_manager();
        let input = format!("in/tables/{}.csv", params.table);
        let output = format!("out/tables/{}.csv", params.table);

        let upstream = match manager.read_manifest(&input) {
            Ok(manifest) => manifest,
            Err(conduit_manifest::ManifestError::NotFound { .. }) => {
                return Err(UserError::new(format!("input table '{input}' is not mapped")).into());
            },
            Err(e) => return Err(e.into()),
        };

        std::fs::create_dir_all(app.data_dir().join("out/tables"))?;
        std::fs::copy(app.data_dir().join(&input), app.data_dir().join(&output))?;

        let manifest = TableManifest {
            destination: format!("out.c-shop.{}", params.table),
            ..upstream
        }
        .incremental(params.incremental);
        self.written = Some(manager.write_manifest(&output, &manifest)?);
        Ok(())
    }
}
