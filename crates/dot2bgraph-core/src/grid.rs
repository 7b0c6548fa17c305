//! The grid placer.
//!
//! `Grid`'s two variants are modeled as a single struct carrying a tag plus
//! a list of already-placed children with their computed offsets. The only
//! behavior the rest of the core needs is "iterate (offset_x, offset_y,
//! sub_grid)", and since the placer computes every offset once, up front,
//! a plain field satisfies that without extra indirection.

use std::collections::{BTreeMap, HashMap};

use dot2bgraph_error::{Error, Result};
use indexmap::IndexMap;

use crate::classify::classify_region;
use crate::config::LayoutConfig;
use crate::tree::{NodeId, RegionTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridVariant {
    Rows,
    Pack,
}

/// One child grid placed within its parent, at an absolute-to-parent
/// offset.
pub struct SubPlacement {
    pub child: NodeId,
    pub grid: Grid,
    pub offset_x: i64,
    pub offset_y: i64,
}

pub struct Grid {
    pub node: NodeId,
    pub padding_outer: i64,
    pub padding_inner: i64,
    pub variant: GridVariant,
    pub children: Vec<SubPlacement>,
    pub width: i64,
    pub height: i64,
}

/// Recursively places `node`, producing the `Grid` for its whole subtree.
pub fn place(tree: &RegionTree, config: &LayoutConfig, node: NodeId) -> Result<Grid> {
    if !tree.is_region(node) {
        return Ok(Grid {
            node,
            padding_outer: config.padding_outer,
            padding_inner: config.padding_inner,
            variant: GridVariant::Rows,
            children: Vec::new(),
            width: tree.width(node),
            height: tree.height(node),
        });
    }

    let classification = classify_region(tree, node)?;
    let children_ids = tree.region_children(node);

    let mut placed = Vec::with_capacity(children_ids.len());
    for &child in &children_ids {
        placed.push((child, place(tree, config, child)?));
    }

    let all_depth_zero = children_ids.len() >= 2
        && children_ids.iter().all(|c| classification.depth.get(c).copied().unwrap_or(0) == 0);

    if all_depth_zero {
        compose_pack(tree, config, node, placed)
    } else {
        compose_rows(tree, config, node, placed, &classification.depth)
    }
}

fn compose_rows(
    tree: &RegionTree,
    config: &LayoutConfig,
    node: NodeId,
    children: Vec<(NodeId, Grid)>,
    depth: &IndexMap<NodeId, u32>,
) -> Result<Grid> {
    let padding_outer = config.padding_outer;
    let padding_inner = config.padding_inner;

    let index_of: HashMap<NodeId, usize> =
        children.iter().enumerate().map(|(i, (id, _))| (*id, i)).collect();

    // Rows grouped by depth, ascending; within a row, children appear in
    // the order the depth map first reached them.
    let mut rows: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (&child, &d) in depth.iter() {
        if let Some(&idx) = index_of.get(&child) {
            rows.entry(d).or_default().push(idx);
        }
    }
    let placed_count: usize = rows.values().map(|v| v.len()).sum();
    if placed_count != children.len() {
        return Err(Error::invariant_violation(
            "every sibling must receive a depth before RowsGrid composition",
        )
        .with_operation("grid::compose_rows"));
    }

    let mut children: Vec<Option<(NodeId, Grid)>> = children.into_iter().map(Some).collect();

    let mut row_content_width: HashMap<u32, i64> = HashMap::new();
    let mut row_height: HashMap<u32, i64> = HashMap::new();
    for (&d, idxs) in &rows {
        let w: i64 = idxs.iter().map(|&i| children[i].as_ref().unwrap().1.width).sum::<i64>()
            + padding_inner * (idxs.len() as i64 - 1).max(0);
        let h: i64 =
            idxs.iter().map(|&i| children[i].as_ref().unwrap().1.height).max().unwrap_or(0);
        row_content_width.insert(d, w);
        row_height.insert(d, h);
    }

    let num_rows = rows.len() as i64;
    let content_width = row_content_width.values().copied().max().unwrap_or(0);
    let sum_row_heights: i64 = row_height.values().copied().sum();

    let width = if num_rows > 0 {
        tree.width(node).max(padding_outer * 2 + content_width)
    } else {
        tree.width(node)
    };
    let height = if num_rows > 0 {
        tree.height(node)
            .max(padding_outer * 2 + sum_row_heights + padding_inner * (num_rows - 1).max(0))
    } else {
        tree.height(node)
    };

    let mut sub_placements = Vec::with_capacity(children.len());
    let mut offset_y = 0i64;
    for (ri, (&d, idxs)) in rows.iter().enumerate() {
        offset_y += if ri == 0 { padding_outer } else { padding_inner };

        let padded_row_width = row_content_width[&d] + padding_outer * 2;
        let row_offset = (width - padded_row_width) / 2;
        let mut x = row_offset + padding_outer;

        for (k, &idx) in idxs.iter().enumerate() {
            if k > 0 {
                x += padding_inner;
            }
            let (child, grid) = children[idx].take().expect("each child placed exactly once");
            let child_width = grid.width;
            sub_placements.push(SubPlacement { child, grid, offset_x: x, offset_y });
            x += child_width;
        }
        offset_y += row_height[&d];
    }

    Ok(Grid {
        node,
        padding_outer,
        padding_inner,
        variant: GridVariant::Rows,
        children: sub_placements,
        width,
        height,
    })
}

fn compose_pack(
    tree: &RegionTree,
    config: &LayoutConfig,
    node: NodeId,
    children: Vec<(NodeId, Grid)>,
) -> Result<Grid> {
    let padding_outer = config.padding_outer;
    let padding_inner = config.padding_inner;

    let rects: Vec<(i64, i64)> =
        children.iter().map(|(_, g)| (g.width + padding_inner, g.height + padding_inner)).collect();
    let (packed_w, packed_h, placements) = pack_rectangles(&rects)?;

    let width = tree.width(node).max(packed_w + padding_outer * 2);
    let height = tree.height(node).max(packed_h + padding_outer * 2);

    let sub_placements = children
        .into_iter()
        .zip(placements)
        .map(|((child, grid), p)| SubPlacement {
            child,
            grid,
            offset_x: p.x + padding_outer,
            offset_y: p.y + padding_outer,
        })
        .collect();

    Ok(Grid {
        node,
        padding_outer,
        padding_inner,
        variant: GridVariant::Pack,
        children: sub_placements,
        width,
        height,
    })
}

/// The PackGrid driver loop: square bound search, square binary search,
/// then independent width-only and height-only binary searches from that
/// square bound, picking whichever of the two yields the smaller
/// non-fixed dimension.
fn pack_rectangles(
    rects: &[(i64, i64)],
) -> Result<(i64, i64, Vec<dot2bgraph_pack::Placement>)> {
    if rects.is_empty() {
        return Ok((0, 0, Vec::new()));
    }

    let max_side = rects.iter().map(|&(w, h)| w.max(h)).max().unwrap();
    let mut fit = max_side;
    let mut non_fit: Option<i64> = None;
    let mut guard = 0;
    while dot2bgraph_pack::pack(fit, fit, rects).is_none() {
        non_fit = Some(fit);
        fit *= 2;
        guard += 1;
        if guard > 64 {
            return Err(Error::invariant_violation("rectangle packing did not converge")
                .with_operation("grid::pack_rectangles"));
        }
    }

    if let Some(mut lo) = non_fit {
        let mut hi = fit;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if dot2bgraph_pack::pack(mid, mid, rects).is_some() {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        fit = hi;
    }

    let width_fit = binary_search_dim(rects, fit, true);
    let height_fit = binary_search_dim(rects, fit, false);

    let (final_w, final_h) =
        if width_fit < height_fit { (width_fit, fit) } else { (fit, height_fit) };

    let placements = dot2bgraph_pack::pack(final_w, final_h, rects).ok_or_else(|| {
        Error::invariant_violation("final pack dimensions unexpectedly did not fit")
            .with_operation("grid::pack_rectangles")
    })?;

    Ok((final_w, final_h, placements))
}

fn binary_search_dim(rects: &[(i64, i64)], fixed: i64, optimize_width: bool) -> i64 {
    let mut lo = 0i64;
    let mut hi = fixed;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        let fits = if optimize_width {
            dot2bgraph_pack::pack(mid, fixed, rects).is_some()
        } else {
            dot2bgraph_pack::pack(fixed, mid, rects).is_some()
        };
        if fits {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EdgeSpec, HierarchicalGraph, NodeSpec, Subgraph};
    use crate::tree::build;

    #[test]
    fn empty_root_is_one_by_one() {
        let graph = HierarchicalGraph::new();
        let tree = build(&graph).unwrap();
        let config = LayoutConfig::default();
        let grid = place(&tree, &config, tree.root()).unwrap();
        assert_eq!(grid.width, 1);
        assert_eq!(grid.height, 1);
        assert!(grid.children.is_empty());
    }

    #[test]
    fn single_node_honors_outer_padding() {
        let graph = HierarchicalGraph::new().with_node(NodeSpec::new("a"));
        let tree = build(&graph).unwrap();
        let config = LayoutConfig::default();
        let grid = place(&tree, &config, tree.root()).unwrap();
        assert_eq!(grid.children.len(), 1);
        assert_eq!(grid.width, 1 + config.padding_outer * 2);
        assert_eq!(grid.height, 1 + config.padding_outer * 2);
        assert_eq!(grid.children[0].offset_x, config.padding_outer);
        assert_eq!(grid.children[0].offset_y, config.padding_outer);
    }

    #[test]
    fn chain_produces_rows_grid_with_two_rows() {
        let graph = HierarchicalGraph::new()
            .with_node(NodeSpec::new("a"))
            .with_node(NodeSpec::new("b"))
            .with_edge(EdgeSpec::new("a", "b"));
        let tree = build(&graph).unwrap();
        let config = LayoutConfig::default();
        let grid = place(&tree, &config, tree.root()).unwrap();
        assert_eq!(grid.variant, GridVariant::Rows);
        assert_eq!(grid.children.len(), 2);
        let mut ys: Vec<i64> = grid.children.iter().map(|c| c.offset_y).collect();
        ys.sort();
        ys.dedup();
        assert_eq!(ys.len(), 2, "chain nodes occupy two distinct rows");
    }

    #[test]
    fn unconnected_siblings_pack_without_overlap() {
        let graph = HierarchicalGraph::new().with_subgraph(
            Subgraph::new("cluster_A")
                .with_node(NodeSpec::new("a"))
                .with_node(NodeSpec::new("b"))
                .with_node(NodeSpec::new("c"))
                .with_node(NodeSpec::new("d")),
        );
        let tree = build(&graph).unwrap();
        let config = LayoutConfig::default();
        let cluster_a = tree.region_children(tree.root())[0];
        let grid = place(&tree, &config, cluster_a).unwrap();
        assert_eq!(grid.variant, GridVariant::Pack);
        assert_eq!(grid.children.len(), 4);

        for i in 0..grid.children.len() {
            for j in (i + 1)..grid.children.len() {
                let a = &grid.children[i];
                let b = &grid.children[j];
                let separate = a.offset_x + a.grid.width <= b.offset_x
                    || b.offset_x + b.grid.width <= a.offset_x
                    || a.offset_y + a.grid.height <= b.offset_y
                    || b.offset_y + b.grid.height <= a.offset_y;
                assert!(separate, "packed children {i} and {j} overlap");
            }
        }
    }
}
