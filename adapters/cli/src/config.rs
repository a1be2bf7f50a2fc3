//! Settings assembled from an optional TOML file and command-line overrides.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use match3_core::{GravityDirection, GridConfig};
use serde::Deserialize;

/// Contents of a settings file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileSettings {
    seed: Option<u64>,
    step_ms: Option<u64>,
    grid: GridConfig,
}

/// Values supplied on the command line; `Some` wins over the file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) step_ms: Option<u64>,
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) threshold: Option<u32>,
    pub(crate) gravity: Option<GravityDirection>,
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) grid: GridConfig,
    pub(crate) seed: u64,
    pub(crate) step: Duration,
}

/// Reads the settings file when one is given, then applies the overrides.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let file = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file at {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("invalid settings file {}", path.display()))?
        }
        None => FileSettings::default(),
    };
    resolve(file, overrides)
}

fn parse(contents: &str) -> Result<FileSettings> {
    toml::from_str(contents).context("failed to parse settings toml contents")
}

fn resolve(file: FileSettings, overrides: Overrides) -> Result<Settings> {
    let mut grid = file.grid;
    if let Some(columns) = overrides.columns {
        grid.columns = columns;
    }
    if let Some(rows) = overrides.rows {
        grid.rows = rows;
    }
    if let Some(threshold) = overrides.threshold {
        grid.win_threshold = threshold;
    }
    if let Some(gravity) = overrides.gravity {
        grid.gravity = gravity;
    }
    grid.validate().context("invalid grid configuration")?;

    let seed = overrides
        .seed
        .or(file.seed)
        .unwrap_or_else(rand::random::<u64>);
    let step_ms = overrides.step_ms.or(file.step_ms).unwrap_or(0);

    Ok(Settings {
        grid,
        seed,
        step: Duration::from_millis(step_ms),
    })
}
