//! # mapper-core
//!
//! Field mapping over structured raster grids.
//!
//! - [`GridTopology`]: connectivity queries (link ends, cell nodes)
//! - [`RasterGrid`]: the row-major raster implementation
//! - [`FieldStore`]: named scalar fields at nodes, links and cells
//! - [`mappers`]: node → link and node → cell projections

pub mod error;
pub mod field;
pub mod mappers;
pub mod raster;
pub mod topology;

pub use error::{MapperError, MapperResult};
pub use field::{ElementKind, FieldStore};
pub use mappers::{
    Extreme, LinkReduction, MappingKind, map, map_link_head_node_to_link,
    map_link_tail_node_to_link, map_max_of_link_nodes_to_link, map_mean_of_link_nodes_to_link,
    map_min_of_link_nodes_to_link, map_node_to_cell, map_nodes_to_cells, map_nodes_to_links,
    map_value_at_extreme_node_to_links, map_value_at_max_node_to_link,
    map_value_at_min_node_to_link,
};
#[cfg(feature = "parallel")]
pub use mappers::{map_nodes_to_cells_parallel, map_nodes_to_links_parallel};
pub use raster::RasterGrid;
pub use topology::GridTopology;
