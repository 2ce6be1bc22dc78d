use crate::error::{MapperError, MapperResult};
use crate::topology::GridTopology;

/// Structured raster of `num_rows x num_cols` nodes at uniform spacing.
///
/// Nodes are numbered row-major from 0. Links come in two families, each
/// enumerated row-major by tail node:
///
/// 1. links joining `(r, c)` to `(r + 1, c)`, `(num_rows - 1) * num_cols` of them;
/// 2. links joining `(r, c)` to `(r, c + 1)`, `num_rows * (num_cols - 1)` of them.
///
/// The first family is numbered before the second, and every head node has
/// a larger id than its tail. Each interior node carries one cell; cells are
/// numbered row-major over the interior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterGrid {
    num_rows: usize,
    num_cols: usize,
    spacing: f64,
}

impl RasterGrid {
    /// Unit-spaced raster.
    pub fn new(num_rows: usize, num_cols: usize) -> MapperResult<RasterGrid> {
        Self::with_spacing(num_rows, num_cols, 1.0)
    }

    pub fn with_spacing(num_rows: usize, num_cols: usize, spacing: f64) -> MapperResult<RasterGrid> {
        if num_rows == 0 || num_cols == 0 {
            return Err(MapperError::topology(format!(
                "raster shape {num_rows}x{num_cols} has no nodes"
            )));
        }
        // Node and link counts must fit in usize; link total is 2rc - r - c.
        let too_large =
            || MapperError::topology(format!("raster shape {num_rows}x{num_cols} is too large"));
        let n_nodes = num_rows.checked_mul(num_cols).ok_or_else(too_large)?;
        n_nodes
            .checked_mul(2)
            .and_then(|twice| twice.checked_sub(num_rows + num_cols))
            .ok_or_else(too_large)?;
        if n_nodes < 2 {
            return Err(MapperError::topology("a single-node raster has no links"));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(MapperError::topology(format!(
                "node spacing must be positive and finite, got {spacing}"
            )));
        }

        Ok(RasterGrid {
            num_rows,
            num_cols,
            spacing,
        })
    }

    // ---- Shape ----

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Links joining a node to the one in the next row.
    pub fn number_of_vertical_links(&self) -> usize {
        (self.num_rows - 1) * self.num_cols
    }

    /// Links joining a node to the one in the next column.
    pub fn number_of_horizontal_links(&self) -> usize {
        self.num_rows * (self.num_cols - 1)
    }

    pub fn number_of_interior_nodes(&self) -> usize {
        self.interior_rows() * self.interior_cols()
    }

    fn interior_rows(&self) -> usize {
        self.num_rows.saturating_sub(2)
    }

    fn interior_cols(&self) -> usize {
        self.num_cols.saturating_sub(2)
    }

    // ---- Node lookups ----

    pub fn node_at(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.num_rows || col >= self.num_cols {
            return None;
        }
        Some(row * self.num_cols + col)
    }

    pub fn row_col_of_node(&self, node: usize) -> (usize, usize) {
        (node / self.num_cols, node % self.num_cols)
    }

    /// True for nodes on the outer ring, which carry no cell.
    pub fn is_boundary_node(&self, node: usize) -> bool {
        let (row, col) = self.row_col_of_node(node);
        row == 0 || col == 0 || row + 1 == self.num_rows || col + 1 == self.num_cols
    }

    pub fn cell_at_node(&self, node: usize) -> Option<usize> {
        if node >= self.node_count() || self.is_boundary_node(node) {
            return None;
        }
        let (row, col) = self.row_col_of_node(node);
        Some((row - 1) * self.interior_cols() + (col - 1))
    }

    /// Every link on a raster has the same length.
    pub fn link_length(&self, _link: usize) -> f64 {
        self.spacing
    }
}

impl GridTopology for RasterGrid {
    fn node_count(&self) -> usize {
        self.num_rows * self.num_cols
    }

    fn link_count(&self) -> usize {
        self.number_of_vertical_links() + self.number_of_horizontal_links()
    }

    fn cell_count(&self) -> usize {
        self.number_of_interior_nodes()
    }

    fn tail_node(&self, link: usize) -> usize {
        let n_vertical = self.number_of_vertical_links();
        if link < n_vertical {
            return link;
        }
        let j = link - n_vertical;
        let per_row = self.num_cols - 1;
        (j / per_row) * self.num_cols + j % per_row
    }

    fn head_node(&self, link: usize) -> usize {
        if link < self.number_of_vertical_links() {
            self.tail_node(link) + self.num_cols
        } else {
            self.tail_node(link) + 1
        }
    }

    fn node_of_cell(&self, cell: usize) -> usize {
        let cols = self.interior_cols();
        (cell / cols + 1) * self.num_cols + cell % cols + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_for_four_by_five() {
        let grid = RasterGrid::new(4, 5).unwrap();
        assert_eq!(grid.node_count(), 20);
        assert_eq!(grid.number_of_vertical_links(), 15);
        assert_eq!(grid.number_of_horizontal_links(), 16);
        assert_eq!(grid.link_count(), 31);
        assert_eq!(grid.cell_count(), 6);
    }

    #[test]
    fn vertical_links_come_first() {
        let grid = RasterGrid::new(4, 5).unwrap();
        assert_eq!(grid.link_nodes(0), (0, 5));
        assert_eq!(grid.link_nodes(14), (14, 19));
        assert_eq!(grid.link_nodes(15), (0, 1));
        assert_eq!(grid.link_nodes(18), (3, 4));
        assert_eq!(grid.link_nodes(19), (5, 6));
        assert_eq!(grid.link_nodes(30), (18, 19));
    }

    #[test]
    fn head_is_always_larger_than_tail() {
        let grid = RasterGrid::new(6, 3).unwrap();
        for link in 0..grid.link_count() {
            let (tail, head) = grid.link_nodes(link);
            assert!(head > tail, "link {link}: {tail} -> {head}");
            assert!(head < grid.node_count());
        }
    }

    #[test]
    fn cells_sit_on_interior_nodes() {
        let grid = RasterGrid::new(4, 5).unwrap();
        let nodes: Vec<usize> = (0..grid.cell_count()).map(|c| grid.node_of_cell(c)).collect();
        assert_eq!(nodes, vec![6, 7, 8, 11, 12, 13]);
        for (cell, &node) in nodes.iter().enumerate() {
            assert!(!grid.is_boundary_node(node));
            assert_eq!(grid.cell_at_node(node), Some(cell));
        }
        assert_eq!(grid.cell_at_node(0), None);
        assert_eq!(grid.cell_at_node(19), None);
        assert_eq!(grid.cell_at_node(20), None);
    }

    #[test]
    fn single_row_has_links_but_no_cells() {
        let grid = RasterGrid::new(1, 4).unwrap();
        assert_eq!(grid.number_of_vertical_links(), 0);
        assert_eq!(grid.link_count(), 3);
        assert_eq!(grid.link_nodes(2), (2, 3));
        assert_eq!(grid.cell_count(), 0);
        assert!(grid.validate_cells().is_err());
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        for (rows, cols) in [(0, 5), (5, 0), (1, 1)] {
            assert!(matches!(
                RasterGrid::new(rows, cols),
                Err(MapperError::InvalidTopology { .. })
            ));
        }
        assert!(RasterGrid::with_spacing(3, 3, 0.0).is_err());
    }

    #[test]
    fn overflowing_shapes_are_rejected() {
        for (rows, cols) in [(usize::MAX / 2, 3), (3, usize::MAX / 2), (usize::MAX, usize::MAX)] {
            assert!(matches!(
                RasterGrid::new(rows, cols),
                Err(MapperError::InvalidTopology { .. })
            ));
        }
        // Fits as a node count, but twice that does not.
        let rows = 1_usize << (usize::BITS / 2);
        let cols = usize::MAX / rows;
        assert!(matches!(
            RasterGrid::new(rows, cols),
            Err(MapperError::InvalidTopology { .. })
        ));
        assert!(RasterGrid::with_spacing(3, 3, f64::NAN).is_err());
    }

    #[test]
    fn node_lookups() {
        let grid = RasterGrid::with_spacing(3, 4, 10.0).unwrap();
        assert_eq!(grid.node_at(2, 3), Some(11));
        assert_eq!(grid.node_at(3, 0), None);
        assert_eq!(grid.row_col_of_node(6), (1, 2));
        assert_eq!(grid.link_length(4), 10.0);
    }
}
