//! The flattener: walks the nested grid in pre-order, emitting
//! absolute-coordinate Blocks and EdgeEnds and wiring matching edge
//! halves together.

use std::collections::HashMap;

use dot2bgraph_error::{Error, Result};

use crate::config::LayoutConfig;
use crate::grid::Grid;
use crate::locations::{BlockId, Direction, EdgeEndId, Locations};
use crate::tree::{EdgeId, NodeId, RegionTree};

/// EdgeEnds carry a color field in the output contract, but only Blocks
/// are colored (by depth); every EdgeEnd this core emits uses this fixed
/// color.
const EDGE_END_COLOR: u32 = 0x000000;

struct Frame<'a> {
    grid: &'a Grid,
    x: i64,
    y: i64,
    depth: u32,
}

fn collect_preorder<'a>(grid: &'a Grid, x: i64, y: i64, depth: u32, out: &mut Vec<Frame<'a>>) {
    out.push(Frame { grid, x, y, depth });
    for sub in &grid.children {
        collect_preorder(&sub.grid, x + sub.offset_x, y + sub.offset_y, depth + 1, out);
    }
}

/// Which endpoint of the edge is the peer relative to the node currently
/// being flattened.
#[derive(Clone, Copy)]
enum Peer {
    /// `node` is the source; the peer is the edge's destination.
    Destination,
    /// `node` is the destination; the peer is the edge's source.
    Source,
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn peer_of(tree: &RegionTree, edge: EdgeId, peer: Peer) -> NodeId {
    match peer {
        Peer::Destination => tree.edge_to(edge),
        Peer::Source => tree.edge_from(edge),
    }
}

/// Sorts edge halves by their peer's absolute position, to minimize
/// trivial crossings. Sort is stable, so multi-edges to the same peer keep
/// their original emission order.
fn sorted_by_peer(
    tree: &RegionTree,
    locations: &Locations,
    node_block: &HashMap<NodeId, BlockId>,
    mut edges: Vec<EdgeId>,
    peer: Peer,
    axis: Axis,
) -> Vec<EdgeId> {
    edges.sort_by_key(|&e| {
        let peer_node = peer_of(tree, e, peer);
        let block = locations.block(node_block[&peer_node]);
        match axis {
            Axis::X => block.x,
            Axis::Y => block.y,
        }
    });
    edges
}

/// Flattens a placed grid tree into a [`Locations`] output.
pub fn flatten(tree: &RegionTree, root_grid: &Grid, config: &LayoutConfig) -> Result<Locations> {
    let mut frames = Vec::new();
    collect_preorder(root_grid, 0, 0, 0, &mut frames);

    // D = max depth observed; D = 0 is treated as D = 1.
    let max_depth = frames.iter().map(|f| f.depth).max().unwrap_or(0);
    let d = (max_depth.max(1)) as f64;

    let mut locations =
        Locations::new(config.bg_color, config.highlight_bg_color, config.highlight_fg_color);
    let mut node_block: HashMap<NodeId, BlockId> = HashMap::new();

    for frame in &frames {
        let shift = 0.2 * d;
        let val = (frame.depth as f64 + shift) / (d + 2.0 * shift);
        let gray = (255.0 * (1.0 - val)).round() as i64;
        let gray = gray.clamp(0, 255) as u32;
        let color = (gray << 16) | (gray << 8) | gray;

        let label = tree.label(frame.grid.node).map(str::to_string);
        let block_id = locations.add_block(
            frame.x,
            frame.y,
            frame.grid.width,
            frame.grid.height,
            frame.depth,
            color,
            label,
        );
        node_block.insert(frame.grid.node, block_id);
    }

    let mut ee_from: HashMap<(NodeId, NodeId), Vec<EdgeEndId>> = HashMap::new();
    let mut ee_to: HashMap<(NodeId, NodeId), Vec<EdgeEndId>> = HashMap::new();

    for frame in &frames {
        let node = frame.grid.node;
        let (x, y, w, h) = (frame.x, frame.y, frame.grid.width, frame.grid.height);
        let block_id = node_block[&node];

        let local_next = sorted_by_peer(
            tree,
            &locations,
            &node_block,
            tree.local_next(node),
            Peer::Destination,
            Axis::X,
        );
        for (i, e) in local_next.into_iter().enumerate() {
            let (from, to, label) = tree.edge(e);
            let label = label.map(str::to_string);
            let ee = locations.add_edge_end(
                x + i as i64,
                y + h,
                EDGE_END_COLOR,
                Direction::Down,
                true,
                Some(block_id),
                label,
            );
            ee_from.entry((from, to)).or_default().push(ee);
        }

        let other_next = sorted_by_peer(
            tree,
            &locations,
            &node_block,
            tree.other_next(node),
            Peer::Destination,
            Axis::Y,
        );
        for (i, e) in other_next.into_iter().enumerate() {
            let (from, to, label) = tree.edge(e);
            let label = label.map(str::to_string);
            let ee = locations.add_edge_end(
                x + w,
                y + i as i64,
                EDGE_END_COLOR,
                Direction::Right,
                true,
                Some(block_id),
                label,
            );
            ee_from.entry((from, to)).or_default().push(ee);
        }

        let local_prev = sorted_by_peer(
            tree,
            &locations,
            &node_block,
            tree.local_prev(node),
            Peer::Source,
            Axis::X,
        );
        for (i, e) in local_prev.into_iter().enumerate() {
            let (from, to, label) = tree.edge(e);
            let label = label.map(str::to_string);
            let ee = locations.add_edge_end(
                x + i as i64,
                y - 1,
                EDGE_END_COLOR,
                Direction::Down,
                false,
                Some(block_id),
                label,
            );
            ee_to.entry((from, to)).or_default().push(ee);
        }

        let other_prev = sorted_by_peer(
            tree,
            &locations,
            &node_block,
            tree.other_prev(node),
            Peer::Source,
            Axis::Y,
        );
        for (i, e) in other_prev.into_iter().enumerate() {
            let (from, to, label) = tree.edge(e);
            let label = label.map(str::to_string);
            let ee = locations.add_edge_end(
                x - 1,
                y + i as i64,
                EDGE_END_COLOR,
                Direction::Right,
                false,
                Some(block_id),
                label,
            );
            ee_to.entry((from, to)).or_default().push(ee);
        }
    }

    for (pair, froms) in &ee_from {
        let tos = ee_to.get(pair).ok_or_else(|| {
            Error::invariant_violation(format!(
                "edge {:?} has source EdgeEnds but no destination EdgeEnds",
                pair
            ))
            .with_operation("flatten::wire_edges")
        })?;
        if froms.len() != tos.len() {
            return Err(Error::invariant_violation(format!(
                "edge {:?} has {} source EdgeEnds but {} destination EdgeEnds",
                pair,
                froms.len(),
                tos.len()
            ))
            .with_operation("flatten::wire_edges"));
        }
        for (src, dst) in froms.iter().zip(tos.iter()) {
            locations.add_edge(*src, *dst)?;
        }
    }

    Ok(locations)
}
