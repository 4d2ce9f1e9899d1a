//! The inspection component.

use std::path::PathBuf;

use anyhow::Context;
use conduit_config::DEFAULT_ACTION;
use conduit_manifest::TableManifest;
use conduit_runtime::{Application, Component, UserError};
use serde_json::{Map, Value};
use tracing::info;

/// Validates `config.json` and summarizes the mapped input tables.
pub(crate) struct Inspect;

/// What [`inspect`] found.
#[derive(Debug)]
pub(crate) struct Summary {
    pub(crate) parameter_keys: Vec<String>,
    pub(crate) input_tables: Vec<(PathBuf, TableManifest)>,
}

impl Component for Inspect {
    type Parameters = Map<String, Value>;

    fn run(&mut self, app: &Application<Self::Parameters>) -> anyhow::Result<()> {
        let summary = inspect(app)?;
        info!(
            parameters = summary.parameter_keys.len(),
            tables = summary.input_tables.len(),
            "inspection finished"
        );
        Ok(())
    }
}

pub(crate) fn inspect(app: &Application<Map<String, Value>>) -> anyhow::Result<Summary> {
    let config = app.config();
    if config.action() != DEFAULT_ACTION {
        return Err(UserError::new(format!(
            "action '{}' is not supported, only '{DEFAULT_ACTION}'",
            config.action()
        ))
        .into());
    }

    let parameter_keys: Vec<String> = config.parameters().keys().cloned().collect();
    info!(
        action = config.action(),
        parameters = ?parameter_keys,
        input_tables = config.input_tables().len(),
        input_files = config.input_files().len(),
        expected_output_tables = config.expected_output_tables().len(),
        "configuration"
    );

    let manager = app.manifest_manager();
    let mut input_tables = Vec::new();
    for artifact in manager.artifacts_with_manifests(manager.in_tables_dir())? {
        let manifest = manager
            .read_manifest(&artifact)
            .with_context(|| format!("inspecting {}", artifact.display()))?;
        info!(
            artifact = %artifact.display(),
            destination = %manifest.destination,
            columns = manifest.columns.len(),
            primary_key = ?manifest.primary_key,
            incremental = manifest.incremental,
            "input table"
        );
        input_tables.push((artifact, manifest));
    }

    Ok(Summary {
        parameter_keys,
        input_tables,
    })
}
