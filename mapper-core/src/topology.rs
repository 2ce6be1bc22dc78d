//! Connectivity queries the mappers are written against.
//!
//! Any grid shape that can answer "which nodes does link `i` join" and
//! "which node sits under cell `k`" can be mapped over. [`RasterGrid`]
//! is the structured implementation shipped with the crate.
//!
//! [`RasterGrid`]: crate::raster::RasterGrid

use crate::error::{MapperError, MapperResult};
use crate::field::ElementKind;

pub trait GridTopology {
    fn node_count(&self) -> usize;

    fn link_count(&self) -> usize;

    fn cell_count(&self) -> usize;

    /// Origin node of `link`. `link` must be below [`link_count`](Self::link_count).
    fn tail_node(&self, link: usize) -> usize;

    /// Destination node of `link`.
    fn head_node(&self, link: usize) -> usize;

    /// Node coincident with `cell`.
    fn node_of_cell(&self, cell: usize) -> usize;

    /// `(tail, head)` for `link`.
    fn link_nodes(&self, link: usize) -> (usize, usize) {
        (self.tail_node(link), self.head_node(link))
    }

    fn element_count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Node => self.node_count(),
            ElementKind::Link => self.link_count(),
            ElementKind::Cell => self.cell_count(),
        }
    }

    /// Fails if there is nothing to map onto links.
    fn validate_links(&self) -> MapperResult<()> {
        if self.node_count() == 0 || self.link_count() == 0 {
            return Err(MapperError::topology(format!(
                "grid has {} nodes and {} links",
                self.node_count(),
                self.link_count()
            )));
        }
        Ok(())
    }

    /// Fails if there is nothing to map onto cells.
    fn validate_cells(&self) -> MapperResult<()> {
        if self.node_count() == 0 || self.cell_count() == 0 {
            return Err(MapperError::topology(format!(
                "grid has {} nodes and {} cells",
                self.node_count(),
                self.cell_count()
            )));
        }
        Ok(())
    }
}

impl<T: GridTopology + ?Sized> GridTopology for &T {
    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    fn link_count(&self) -> usize {
        (**self).link_count()
    }

    fn cell_count(&self) -> usize {
        (**self).cell_count()
    }

    fn tail_node(&self, link: usize) -> usize {
        (**self).tail_node(link)
    }

    fn head_node(&self, link: usize) -> usize {
        (**self).head_node(link)
    }

    fn node_of_cell(&self, cell: usize) -> usize {
        (**self).node_of_cell(cell)
    }
}
