use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use dbreflect_core::{Database, ImportFailure, RedactedConnection, SchemaMetrics};
use dbreflect_introspect::ImportOptions;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub engine: String,
    pub schema_version: String,
    pub run_dir: PathBuf,
    pub out: Option<PathBuf>,
    pub options: ImportOptions,
    pub connection: RedactedConnection,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub engine: String,
    pub schema_version: String,
    pub options: ImportOptions,
    pub connection: RedactedConnection,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Import outcome written next to the schema.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: &'a str,
    pub cancelled: bool,
    pub failures: &'a [ImportFailure],
    /// Validation error, when the imported model is inconsistent.
    pub validation: Option<String>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub schema_path: PathBuf,
    pub report_path: PathBuf,
    pub logs_path: PathBuf,
    pub metrics_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        engine: ctx.engine.clone(),
        schema_version: ctx.schema_version.clone(),
        options: ctx.options.clone(),
        connection: ctx.connection.clone(),
        git: collect_git_info(),
    };
    write_json(&root.join("config.json"), &config)?;

    let paths = RunPaths {
        schema_path: root.join("schema.json"),
        report_path: root.join("report.json"),
        logs_path: root.join("logs.ndjson"),
        metrics_path: root.join("metrics.json"),
        root,
    };

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

pub fn write_schema(
    paths: &RunPaths,
    database: &Database,
    out_path: Option<&Path>,
) -> RegistryResult<()> {
    write_json(&paths.schema_path, database)?;

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        write_json(out_path, database)?;
    }

    Ok(())
}

pub fn write_report(paths: &RunPaths, report: &RunReport<'_>) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

pub fn write_metrics(paths: &RunPaths, metrics: &SchemaMetrics) -> RegistryResult<()> {
    write_json(&paths.metrics_path, metrics)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
