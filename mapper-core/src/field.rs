//! Named scalar fields attached to grid elements.
//!
//! A [`FieldStore`] is sized from a topology once, and every insert is
//! checked against that size. Mappers can therefore trust the length of
//! anything they read back out of it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{MapperError, MapperResult};
use crate::topology::GridTopology;

/// Grid element a field is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Link,
    Cell,
}

impl ElementKind {
    pub const ALL: [ElementKind; 3] = [ElementKind::Node, ElementKind::Link, ElementKind::Cell];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Link => "link",
            ElementKind::Cell => "cell",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "node" => Ok(ElementKind::Node),
            "link" => Ok(ElementKind::Link),
            "cell" => Ok(ElementKind::Cell),
            other => Err(format!("unknown element kind '{other}' (expected node|link|cell)")),
        }
    }
}

/// Per-element-kind map from field name to values.
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    node_count: usize,
    link_count: usize,
    cell_count: usize,

    at_node: HashMap<String, Vec<f64>>,
    at_link: HashMap<String, Vec<f64>>,
    at_cell: HashMap<String, Vec<f64>>,
}

impl FieldStore {
    /// Empty store sized for `grid`.
    pub fn new<G: GridTopology + ?Sized>(grid: &G) -> FieldStore {
        Self::with_counts(grid.node_count(), grid.link_count(), grid.cell_count())
    }

    pub fn with_counts(node_count: usize, link_count: usize, cell_count: usize) -> FieldStore {
        FieldStore {
            node_count,
            link_count,
            cell_count,
            ..FieldStore::default()
        }
    }

    /// Number of values every field at `kind` must hold.
    pub fn count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Node => self.node_count,
            ElementKind::Link => self.link_count,
            ElementKind::Cell => self.cell_count,
        }
    }

    /// True when the store was sized for a grid with these element counts.
    pub fn matches<G: GridTopology + ?Sized>(&self, grid: &G) -> bool {
        ElementKind::ALL
            .iter()
            .all(|&kind| self.count(kind) == grid.element_count(kind))
    }

    fn group(&self, kind: ElementKind) -> &HashMap<String, Vec<f64>> {
        match kind {
            ElementKind::Node => &self.at_node,
            ElementKind::Link => &self.at_link,
            ElementKind::Cell => &self.at_cell,
        }
    }

    fn group_mut(&mut self, kind: ElementKind) -> &mut HashMap<String, Vec<f64>> {
        match kind {
            ElementKind::Node => &mut self.at_node,
            ElementKind::Link => &mut self.at_link,
            ElementKind::Cell => &mut self.at_cell,
        }
    }

    // ---- Insertion ----

    /// Store `values` as `name` at `kind`, replacing any field of that name.
    ///
    /// Fails with [`MapperError::LengthMismatch`] if `values` does not hold
    /// exactly one value per element; the store is unchanged in that case.
    pub fn add_field(&mut self, kind: ElementKind, name: &str, values: Vec<f64>) -> MapperResult<()> {
        let expected = self.count(kind);
        if values.len() != expected {
            return Err(MapperError::LengthMismatch {
                kind,
                name: name.to_string(),
                expected,
                actual: values.len(),
            });
        }
        trace!(%kind, field = name, len = values.len(), "storing field");
        self.group_mut(kind).insert(name.to_string(), values);
        Ok(())
    }

    /// Like [`add_field`](Self::add_field), converting each value to `f64`.
    ///
    /// Accepts anything losslessly convertible, e.g. `i32`, `u32` or `f32`.
    pub fn add_field_from<I, T>(&mut self, kind: ElementKind, name: &str, values: I) -> MapperResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        self.add_field(kind, name, values.into_iter().map(Into::into).collect())
    }

    /// Zero-filled field, returned for in-place filling.
    pub fn add_zeros(&mut self, kind: ElementKind, name: &str) -> &mut [f64] {
        let len = self.count(kind);
        let slot = self.group_mut(kind).entry(name.to_string()).or_default();
        slot.clear();
        slot.resize(len, 0.0);
        slot.as_mut_slice()
    }

    // ---- Access ----

    pub fn field(&self, kind: ElementKind, name: &str) -> Option<&[f64]> {
        self.group(kind).get(name).map(|v| v.as_slice())
    }

    /// Mutable view; the length cannot change through it.
    pub fn field_mut(&mut self, kind: ElementKind, name: &str) -> Option<&mut [f64]> {
        self.group_mut(kind).get_mut(name).map(|v| v.as_mut_slice())
    }

    /// Like [`field`](Self::field) but reports a missing field as an error.
    pub fn require(&self, kind: ElementKind, name: &str) -> MapperResult<&[f64]> {
        self.field(kind, name)
            .ok_or_else(|| MapperError::missing(kind, name))
    }

    pub fn has_field(&self, kind: ElementKind, name: &str) -> bool {
        self.group(kind).contains_key(name)
    }

    pub fn remove_field(&mut self, kind: ElementKind, name: &str) -> Option<Vec<f64>> {
        self.group_mut(kind).remove(name)
    }

    /// Field names at `kind`, sorted.
    pub fn field_names(&self, kind: ElementKind) -> Vec<&str> {
        let mut names: Vec<&str> = self.group(kind).keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
