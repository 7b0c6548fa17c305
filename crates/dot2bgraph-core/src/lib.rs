//! # dot2bgraph-core
//!
//! The layout core: turns a parsed hierarchical graph into a flat block
//! graph. A single entry point, [`layout`], runs the whole pipeline:
//!
//! 1. [`tree::build`] — region tree builder
//! 2. [`classify::classify_region`] — edge classifier + depth assignment,
//!    run per region inside the grid placer
//! 3. [`grid::place`] — grid placer
//! 4. [`flatten::flatten`] — flattener + Locations container
//!
//! The whole pipeline is a single-threaded pure function: no operation
//! suspends, blocks, or touches the environment.

pub mod arena;
pub mod classify;
pub mod config;
pub mod flatten;
pub mod grid;
pub mod input;
pub mod locations;
pub mod tree;

pub use config::LayoutConfig;
pub use input::{EdgeSpec, HierarchicalGraph, NodeSpec, Subgraph};
pub use locations::{Block, Direction, EdgeEnd, Locations, LocationsOutput};
pub use tree::RegionTree;

use dot2bgraph_error::Result;

/// Runs the full layout pipeline over a parsed hierarchical graph,
/// producing a [`Locations`] value ready for serialization.
pub fn layout(graph: &HierarchicalGraph, config: &LayoutConfig) -> Result<Locations> {
    tracing::debug!(nodes = graph.nodes.len(), subgraphs = graph.subgraphs.len(), edges = graph.edges.len(), "building region tree");
    let tree = tree::build(graph)?;

    tracing::debug!("placing grids");
    let root_grid = grid::place(&tree, config, tree.root())?;

    tracing::debug!(width = root_grid.width, height = root_grid.height, "flattening");
    let locations = flatten::flatten(&tree, &root_grid, config)?;

    Ok(locations)
}
