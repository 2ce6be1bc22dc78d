//! Projections of node fields onto links and cells.
//!
//! Slice functions return a new vector in element order; store functions
//! read a named node field and write the result back at links or cells.
//! All checks run before anything is written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MapperError, MapperResult};
use crate::field::{ElementKind, FieldStore};
use crate::topology::GridTopology;

// ---- Reductions ----

/// How the two end-node values of a link combine into one link value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkReduction {
    Tail,
    Head,
    Mean,
    Max,
    Min,
}

impl LinkReduction {
    /// Combine the tail and head values.
    ///
    /// Max and min use plain `>`/`<` comparison, so a NaN on either end
    /// follows IEEE-754 comparison rules rather than any special policy.
    #[inline]
    pub fn reduce(self, tail: f64, head: f64) -> f64 {
        match self {
            LinkReduction::Tail => tail,
            LinkReduction::Head => head,
            LinkReduction::Mean => (tail + head) / 2.0,
            LinkReduction::Max => {
                if head > tail {
                    head
                } else {
                    tail
                }
            }
            LinkReduction::Min => {
                if head < tail {
                    head
                } else {
                    tail
                }
            }
        }
    }
}

/// Which end node wins when picking by a control field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extreme {
    Max,
    Min,
}

/// Named mapping operations, as selected by hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingKind {
    Tail,
    Head,
    Mean,
    Max,
    Min,
    Cell,
}

impl MappingKind {
    pub const ALL: [MappingKind; 6] = [
        MappingKind::Tail,
        MappingKind::Head,
        MappingKind::Mean,
        MappingKind::Max,
        MappingKind::Min,
        MappingKind::Cell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MappingKind::Tail => "tail",
            MappingKind::Head => "head",
            MappingKind::Mean => "mean",
            MappingKind::Max => "max",
            MappingKind::Min => "min",
            MappingKind::Cell => "cell",
        }
    }

    /// Element kind the result is attached to.
    pub fn target(&self) -> ElementKind {
        match self {
            MappingKind::Cell => ElementKind::Cell,
            _ => ElementKind::Link,
        }
    }

    pub fn link_reduction(&self) -> Option<LinkReduction> {
        match self {
            MappingKind::Tail => Some(LinkReduction::Tail),
            MappingKind::Head => Some(LinkReduction::Head),
            MappingKind::Mean => Some(LinkReduction::Mean),
            MappingKind::Max => Some(LinkReduction::Max),
            MappingKind::Min => Some(LinkReduction::Min),
            MappingKind::Cell => None,
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MappingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                format!("unknown mapping '{s}' (expected tail|head|mean|max|min|cell)")
            })
    }
}

// ---- Shared lookups ----

fn check_node_len<G: GridTopology + ?Sized>(grid: &G, values: &[f64], name: &str) -> MapperResult<()> {
    let expected = grid.node_count();
    if values.len() != expected {
        return Err(MapperError::LengthMismatch {
            kind: ElementKind::Node,
            name: name.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

/// End nodes of `link`, checked against the node range.
fn link_ends<G: GridTopology + ?Sized>(grid: &G, link: usize) -> MapperResult<(usize, usize)> {
    let (tail, head) = grid.link_nodes(link);
    let n = grid.node_count();
    if tail >= n || head >= n {
        return Err(MapperError::topology(format!(
            "link {link} joins nodes {tail} -> {head} but the grid has {n} nodes"
        )));
    }
    Ok((tail, head))
}

/// Node under `cell`, checked against the node range.
fn cell_node<G: GridTopology + ?Sized>(grid: &G, cell: usize) -> MapperResult<usize> {
    let node = grid.node_of_cell(cell);
    if node >= grid.node_count() {
        return Err(MapperError::topology(format!(
            "cell {cell} sits on node {node} but the grid has {} nodes",
            grid.node_count()
        )));
    }
    Ok(node)
}

// ---- Slice mappers ----

/// One value per link, in link order, from the values at each link's ends.
pub fn map_nodes_to_links<G: GridTopology + ?Sized>(
    grid: &G,
    node_values: &[f64],
    reduction: LinkReduction,
) -> MapperResult<Vec<f64>> {
    grid.validate_links()?;
    check_node_len(grid, node_values, "node_values")?;

    (0..grid.link_count())
        .map(|link| {
            let (tail, head) = link_ends(grid, link)?;
            Ok(reduction.reduce(node_values[tail], node_values[head]))
        })
        .collect()
}

/// One value per cell, copied from the node the cell sits on.
pub fn map_nodes_to_cells<G: GridTopology + ?Sized>(grid: &G, node_values: &[f64]) -> MapperResult<Vec<f64>> {
    grid.validate_cells()?;
    check_node_len(grid, node_values, "node_values")?;

    (0..grid.cell_count())
        .map(|cell| Ok(node_values[cell_node(grid, cell)?]))
        .collect()
}

/// For each link, the `values` entry at whichever end node has the larger
/// (or smaller) `control` entry. Ties go to the head node.
pub fn map_value_at_extreme_node_to_links<G: GridTopology + ?Sized>(
    grid: &G,
    control: &[f64],
    values: &[f64],
    pick: Extreme,
) -> MapperResult<Vec<f64>> {
    grid.validate_links()?;
    check_node_len(grid, control, "control")?;
    check_node_len(grid, values, "values")?;

    (0..grid.link_count())
        .map(|link| {
            let (tail, head) = link_ends(grid, link)?;
            let take_tail = match pick {
                Extreme::Max => control[tail] > control[head],
                Extreme::Min => control[tail] < control[head],
            };
            Ok(if take_tail { values[tail] } else { values[head] })
        })
        .collect()
}

/// Parallel version of [`map_nodes_to_links`]. Output is identical.
#[cfg(feature = "parallel")]
pub fn map_nodes_to_links_parallel<G: GridTopology + Sync + ?Sized>(
    grid: &G,
    node_values: &[f64],
    reduction: LinkReduction,
) -> MapperResult<Vec<f64>> {
    use rayon::prelude::*;

    grid.validate_links()?;
    check_node_len(grid, node_values, "node_values")?;

    // Indexed range collects in order
    (0..grid.link_count())
        .into_par_iter()
        .map(|link| {
            let (tail, head) = link_ends(grid, link)?;
            Ok(reduction.reduce(node_values[tail], node_values[head]))
        })
        .collect()
}

/// Parallel version of [`map_nodes_to_cells`]. Output is identical.
#[cfg(feature = "parallel")]
pub fn map_nodes_to_cells_parallel<G: GridTopology + Sync + ?Sized>(
    grid: &G,
    node_values: &[f64],
) -> MapperResult<Vec<f64>> {
    use rayon::prelude::*;

    grid.validate_cells()?;
    check_node_len(grid, node_values, "node_values")?;

    (0..grid.cell_count())
        .into_par_iter()
        .map(|cell| Ok(node_values[cell_node(grid, cell)?]))
        .collect()
}

// ---- Store mappers ----

fn ensure_store_fits<G: GridTopology + ?Sized>(grid: &G, fields: &FieldStore) -> MapperResult<()> {
    if fields.matches(grid) {
        return Ok(());
    }
    Err(MapperError::topology(format!(
        "field store sized for {}/{}/{} nodes/links/cells, grid has {}/{}/{}",
        fields.count(ElementKind::Node),
        fields.count(ElementKind::Link),
        fields.count(ElementKind::Cell),
        grid.node_count(),
        grid.link_count(),
        grid.cell_count(),
    )))
}

fn reduce_in_store<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
    reduction: LinkReduction,
) -> MapperResult<&'a [f64]> {
    ensure_store_fits(grid, fields)?;
    let nodes = fields.require(ElementKind::Node, name_in)?;
    let out = map_nodes_to_links(grid, nodes, reduction)?;

    debug!(?reduction, from = name_in, to = name_out, links = out.len(), "mapped node field to links");
    fields.add_field(ElementKind::Link, name_out, out)?;
    fields.require(ElementKind::Link, name_out)
}

/// Link field holding the value at each link's tail node.
pub fn map_link_tail_node_to_link<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    reduce_in_store(grid, fields, name_in, name_out, LinkReduction::Tail)
}

/// Link field holding the value at each link's head node.
pub fn map_link_head_node_to_link<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    reduce_in_store(grid, fields, name_in, name_out, LinkReduction::Head)
}

/// Link field holding `(tail + head) / 2`.
pub fn map_mean_of_link_nodes_to_link<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    reduce_in_store(grid, fields, name_in, name_out, LinkReduction::Mean)
}

pub fn map_max_of_link_nodes_to_link<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    reduce_in_store(grid, fields, name_in, name_out, LinkReduction::Max)
}

pub fn map_min_of_link_nodes_to_link<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    reduce_in_store(grid, fields, name_in, name_out, LinkReduction::Min)
}

/// Cell field holding the value at the node under each cell.
pub fn map_node_to_cell<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    ensure_store_fits(grid, fields)?;
    let nodes = fields.require(ElementKind::Node, name_in)?;
    let out = map_nodes_to_cells(grid, nodes)?;

    debug!(from = name_in, to = name_out, cells = out.len(), "mapped node field to cells");
    fields.add_field(ElementKind::Cell, name_out, out)?;
    fields.require(ElementKind::Cell, name_out)
}

fn extreme_in_store<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    control_name: &str,
    value_name: &str,
    name_out: &str,
    pick: Extreme,
) -> MapperResult<&'a [f64]> {
    ensure_store_fits(grid, fields)?;
    let control = fields.require(ElementKind::Node, control_name)?;
    let values = fields.require(ElementKind::Node, value_name)?;
    let out = map_value_at_extreme_node_to_links(grid, control, values, pick)?;

    debug!(?pick, control = control_name, from = value_name, to = name_out, "mapped by control field");
    fields.add_field(ElementKind::Link, name_out, out)?;
    fields.require(ElementKind::Link, name_out)
}

/// Link field holding `value_name` at the end node with the larger
/// `control_name` value.
pub fn map_value_at_max_node_to_link<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    control_name: &str,
    value_name: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    extreme_in_store(grid, fields, control_name, value_name, name_out, Extreme::Max)
}

/// Link field holding `value_name` at the end node with the smaller
/// `control_name` value.
pub fn map_value_at_min_node_to_link<'a, G: GridTopology + ?Sized>(
    grid: &G,
    fields: &'a mut FieldStore,
    control_name: &str,
    value_name: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    extreme_in_store(grid, fields, control_name, value_name, name_out, Extreme::Min)
}

/// Run the mapping named by `kind`.
pub fn map<'a, G: GridTopology + ?Sized>(
    kind: MappingKind,
    grid: &G,
    fields: &'a mut FieldStore,
    name_in: &str,
    name_out: &str,
) -> MapperResult<&'a [f64]> {
    match kind.link_reduction() {
        Some(reduction) => reduce_in_store(grid, fields, name_in, name_out, reduction),
        None => map_node_to_cell(grid, fields, name_in, name_out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterGrid;

    #[test]
    fn reductions_on_a_pair() {
        assert_eq!(LinkReduction::Tail.reduce(1.0, 4.0), 1.0);
        assert_eq!(LinkReduction::Head.reduce(1.0, 4.0), 4.0);
        assert_eq!(LinkReduction::Mean.reduce(1.0, 4.0), 2.5);
        assert_eq!(LinkReduction::Max.reduce(4.0, 1.0), 4.0);
        assert_eq!(LinkReduction::Min.reduce(4.0, 1.0), 1.0);
        assert_eq!(LinkReduction::Max.reduce(-2.0, -2.0), -2.0);
    }

    #[test]
    fn mapping_kind_names() {
        for kind in MappingKind::ALL {
            assert_eq!(kind.as_str().parse::<MappingKind>(), Ok(kind));
        }
        assert_eq!("MEAN".parse::<MappingKind>(), Ok(MappingKind::Mean));
        assert!("median".parse::<MappingKind>().is_err());
        assert_eq!(MappingKind::Cell.target(), ElementKind::Cell);
        assert_eq!(MappingKind::Min.target(), ElementKind::Link);
    }

    #[test]
    fn short_node_slice_is_a_length_mismatch() {
        let grid = RasterGrid::new(3, 3).unwrap();
        let err = map_nodes_to_links(&grid, &[0.0; 8], LinkReduction::Mean).unwrap_err();
        assert!(matches!(
            err,
            MapperError::LengthMismatch {
                expected: 9,
                actual: 8,
                ..
            }
        ));
    }

    #[test]
    fn cell_mapping_needs_cells() {
        let grid = RasterGrid::new(2, 6).unwrap();
        let err = map_nodes_to_cells(&grid, &[0.0; 12]).unwrap_err();
        assert!(matches!(err, MapperError::InvalidTopology { .. }));
    }

    /// Claims four nodes but points one link outside them.
    struct Broken;

    impl GridTopology for Broken {
        fn node_count(&self) -> usize {
            4
        }
        fn link_count(&self) -> usize {
            2
        }
        fn cell_count(&self) -> usize {
            1
        }
        fn tail_node(&self, link: usize) -> usize {
            link
        }
        fn head_node(&self, link: usize) -> usize {
            link * 5 + 1
        }
        fn node_of_cell(&self, _cell: usize) -> usize {
            9
        }
    }

    #[test]
    fn out_of_range_connectivity_is_reported() {
        let values = [0.0; 4];
        assert!(matches!(
            map_nodes_to_links(&Broken, &values, LinkReduction::Head),
            Err(MapperError::InvalidTopology { .. })
        ));
        assert!(matches!(
            map_nodes_to_cells(&Broken, &values),
            Err(MapperError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn store_sized_for_another_grid_is_rejected() {
        let grid = RasterGrid::new(3, 3).unwrap();
        let mut fields = FieldStore::new(&RasterGrid::new(3, 4).unwrap());
        fields.add_zeros(ElementKind::Node, "z");
        let err = map_link_head_node_to_link(&grid, &mut fields, "z", "z").unwrap_err();
        assert!(matches!(err, MapperError::InvalidTopology { .. }));
        assert!(!fields.has_field(ElementKind::Link, "z"));
    }

    #[test]
    fn extreme_ties_go_to_head() {
        let grid = RasterGrid::new(1, 3).unwrap();
        let control = [1.0, 1.0, 0.0];
        let values = [10.0, 20.0, 30.0];
        assert_eq!(
            map_value_at_extreme_node_to_links(&grid, &control, &values, Extreme::Max).unwrap(),
            vec![20.0, 20.0]
        );
        assert_eq!(
            map_value_at_extreme_node_to_links(&grid, &control, &values, Extreme::Min).unwrap(),
            vec![20.0, 30.0]
        );
    }
}
