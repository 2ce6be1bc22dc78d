//! Mapping job description, from flags or a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use mapper_core::MappingKind;
use serde::{Deserialize, Serialize};

use crate::fill::FillType;

fn default_spacing() -> f64 {
    1.0
}

fn default_field() -> String {
    "values".to_string()
}

fn default_fill() -> FillType {
    FillType::Arange
}

fn default_seed() -> u64 {
    123
}

fn all_mappings() -> Vec<MappingKind> {
    MappingKind::ALL.to_vec()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapJob {
    pub rows: usize,
    pub cols: usize,
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    /// Name of the node field being mapped.
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_fill")]
    pub fill: FillType,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "all_mappings")]
    pub mappings: Vec<MappingKind>,
}

impl MapJob {
    pub fn from_json_file(path: &Path) -> Result<MapJob> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading job file {}", path.display()))?;
        let job: MapJob = serde_json::from_str(&text)
            .with_context(|| format!("parsing job file {}", path.display()))?;
        job.validate()?;
        Ok(job)
    }

    /// Checks that don't need a grid; shape errors surface when it is built.
    pub fn validate(&self) -> Result<()> {
        if self.field.trim().is_empty() {
            bail!("field name cannot be empty");
        }
        if self.mappings.is_empty() {
            bail!("job lists no mappings");
        }
        Ok(())
    }

    /// Destination field name for one mapping.
    pub fn output_name(&self, kind: MappingKind) -> String {
        format!("{}_{}", self.field, kind)
    }
}

/// Comma-separated mapping names, e.g. "tail,mean,cell". Duplicates dropped.
pub fn parse_mappings(s: &str) -> Result<Vec<MappingKind>> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let p = part.trim();
        if p.is_empty() {
            continue;
        }
        let kind: MappingKind = p.parse().map_err(anyhow::Error::msg)?;
        if !out.contains(&kind) {
            out.push(kind);
        }
    }
    Ok(out)
}
