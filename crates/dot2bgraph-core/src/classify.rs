//! Edge classifier and depth assignment: a per-region DFS that labels each
//! local edge NORMAL/BACK/FORWARD/CROSS, followed by a predecessor-quorum
//! BFS that assigns every sibling a depth.

use std::collections::{HashMap, HashSet, VecDeque};

use dot2bgraph_error::{Error, Result};
use indexmap::IndexMap;

use crate::tree::{EdgeId, NodeId, RegionTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Normal,
    Forward,
    Cross,
    Back,
}

/// Per-region classification output: an [`EdgeType`] for every local edge,
/// and a depth for every sibling, in the order each was first reached by
/// the depth BFS (the grid placer relies on this order for left-to-right
/// placement within a row).
pub struct RegionClassification {
    pub edge_types: HashMap<EdgeId, EdgeType>,
    pub depth: IndexMap<NodeId, u32>,
}

/// Classifies the local edges among `tree`'s children of `region` and
/// assigns each child a depth.
pub fn classify_region(tree: &RegionTree, region: NodeId) -> Result<RegionClassification> {
    let siblings = tree.region_children(region);
    let sources = select_sources(tree, &siblings);

    let mut start: HashMap<NodeId, u32> = HashMap::new();
    let mut finish: HashMap<NodeId, u32> = HashMap::new();
    let mut clock: u32 = 0;
    let mut edge_types: HashMap<EdgeId, EdgeType> = HashMap::new();

    for &source in &sources {
        if start.contains_key(&source) {
            return Err(Error::invariant_violation(format!(
                "source '{}' was visited before its own DFS started",
                tree.name(source)
            ))
            .with_operation("classify::dfs"));
        }
        dfs(tree, source, &mut start, &mut finish, &mut clock, &mut edge_types);
    }

    let depth = assign_depths(tree, &sources, &edge_types);
    Ok(RegionClassification { edge_types, depth })
}

/// Finds undirected connected components over the sibling set, choosing
/// one source (or all empty-`prev` members) per component.
fn select_sources(tree: &RegionTree, siblings: &[NodeId]) -> Vec<NodeId> {
    let mut adjacency: HashMap<NodeId, HashSet<NodeId>> =
        siblings.iter().map(|&n| (n, HashSet::new())).collect();
    for &n in siblings {
        for e in tree.local_next(n) {
            let v = tree.edge_to(e);
            adjacency.get_mut(&n).unwrap().insert(v);
            adjacency.get_mut(&v).unwrap().insert(n);
        }
        for e in tree.local_prev(n) {
            let v = tree.edge_from(e);
            adjacency.get_mut(&n).unwrap().insert(v);
            adjacency.get_mut(&v).unwrap().insert(n);
        }
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sources = Vec::new();

    for &start in siblings {
        if visited.contains(&start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.insert(start);
        while let Some(u) = queue.pop_front() {
            component.push(u);
            for &v in &adjacency[&u] {
                if visited.insert(v) {
                    queue.push_back(v);
                }
            }
        }

        let empty_prev: Vec<NodeId> =
            component.iter().copied().filter(|&n| tree.prev(n).is_empty()).collect();
        if !empty_prev.is_empty() {
            sources.extend(empty_prev);
        } else {
            let best = component
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    tree.prev(a)
                        .len()
                        .cmp(&tree.prev(b).len())
                        .then_with(|| tree.next(b).len().cmp(&tree.next(a).len()))
                        .then_with(|| tree.name(a).cmp(tree.name(b)))
                })
                .expect("component is non-empty");
            sources.push(best);
        }
    }

    sources.sort_by(|&a, &b| tree.name(a).cmp(tree.name(b)));
    sources
}

/// Standard DFS over `local_next`, classifying each encountered edge by
/// the visitation state of its destination.
fn dfs(
    tree: &RegionTree,
    u: NodeId,
    start: &mut HashMap<NodeId, u32>,
    finish: &mut HashMap<NodeId, u32>,
    clock: &mut u32,
    edge_types: &mut HashMap<EdgeId, EdgeType>,
) {
    start.insert(u, *clock);
    *clock += 1;

    for e in tree.local_next(u) {
        let v = tree.edge_to(e);
        let edge_type = if !start.contains_key(&v) {
            EdgeType::Normal
        } else if !finish.contains_key(&v) {
            EdgeType::Back
        } else if start[&u] < start[&v] {
            EdgeType::Forward
        } else {
            EdgeType::Cross
        };
        edge_types.insert(e, edge_type);
        if edge_type == EdgeType::Normal {
            dfs(tree, v, start, finish, clock, edge_types);
        }
    }

    finish.insert(u, *clock);
    *clock += 1;
}

/// BFS with a predecessor-quorum rule, skipping propagation across BACK
/// edges.
fn assign_depths(
    tree: &RegionTree,
    sources: &[NodeId],
    edge_types: &HashMap<EdgeId, EdgeType>,
) -> IndexMap<NodeId, u32> {
    let mut depth: IndexMap<NodeId, u32> = IndexMap::new();
    let mut seen_predecessors: HashMap<NodeId, u32> = HashMap::new();
    let mut queue: VecDeque<(NodeId, u32)> = VecDeque::new();

    for &source in sources {
        depth.insert(source, 0);
        queue.push_back((source, 0));
    }

    while let Some((u, d)) = queue.pop_front() {
        for e in tree.local_next(u) {
            if edge_types.get(&e) == Some(&EdgeType::Back) {
                continue;
            }
            let v = tree.edge_to(e);
            let candidate = d + 1;
            let current = depth.get(&v).copied().unwrap_or(0);
            depth.insert(v, candidate.max(current));

            let required = tree
                .local_prev(v)
                .iter()
                .filter(|&&pe| edge_types.get(&pe) != Some(&EdgeType::Back))
                .count() as u32;
            let seen = seen_predecessors.entry(v).or_insert(0);
            *seen += 1;
            if *seen == required {
                queue.push_back((v, depth[&v]));
            }
        }
    }

    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EdgeSpec, HierarchicalGraph, NodeSpec, Subgraph};
    use crate::tree::build;

    fn region_of(tree: &RegionTree) -> NodeId {
        tree.root()
    }

    #[test]
    fn isolated_node_is_its_own_source_at_depth_zero() {
        let graph = HierarchicalGraph::new().with_node(NodeSpec::new("a"));
        let tree = build(&graph).unwrap();
        let classification = classify_region(&tree, region_of(&tree)).unwrap();
        let a = tree.region_children(tree.root())[0];
        assert_eq!(classification.depth[&a], 0);
    }

    #[test]
    fn simple_chain_normal_edges_increase_depth() {
        let graph = HierarchicalGraph::new()
            .with_node(NodeSpec::new("a"))
            .with_node(NodeSpec::new("b"))
            .with_edge(EdgeSpec::new("a", "b"));
        let tree = build(&graph).unwrap();
        let classification = classify_region(&tree, region_of(&tree)).unwrap();
        let children = tree.region_children(tree.root());
        let a = children.iter().copied().find(|&id| tree.name(id) == "a").unwrap();
        let b = children.iter().copied().find(|&id| tree.name(id) == "b").unwrap();

        assert_eq!(classification.depth[&a], 0);
        assert_eq!(classification.depth[&b], 1);
        let edge = tree.local_next(a)[0];
        assert_eq!(classification.edge_types[&edge], EdgeType::Normal);
    }

    #[test]
    fn cycle_back_edge_classified_and_skipped_for_depth() {
        // a -> b, b -> a: a=depth0, b=depth1; (a,b) NORMAL, (b,a) BACK.
        let graph = HierarchicalGraph::new()
            .with_node(NodeSpec::new("a"))
            .with_node(NodeSpec::new("b"))
            .with_edge(EdgeSpec::new("a", "b"))
            .with_edge(EdgeSpec::new("b", "a"));
        let tree = build(&graph).unwrap();
        let classification = classify_region(&tree, region_of(&tree)).unwrap();
        let children = tree.region_children(tree.root());
        let a = children.iter().copied().find(|&id| tree.name(id) == "a").unwrap();
        let b = children.iter().copied().find(|&id| tree.name(id) == "b").unwrap();

        assert_eq!(classification.depth[&a], 0);
        assert_eq!(classification.depth[&b], 1);

        let ab = tree.local_next(a)[0];
        let ba = tree.local_next(b)[0];
        assert_eq!(classification.edge_types[&ab], EdgeType::Normal);
        assert_eq!(classification.edge_types[&ba], EdgeType::Back);
    }

    #[test]
    fn self_loop_is_back() {
        let graph = HierarchicalGraph::new()
            .with_node(NodeSpec::new("a"))
            .with_edge(EdgeSpec::new("a", "a"));
        let tree = build(&graph).unwrap();
        let classification = classify_region(&tree, region_of(&tree)).unwrap();
        let a = tree.region_children(tree.root())[0];
        let edge = tree.local_next(a)[0];
        assert_eq!(classification.edge_types[&edge], EdgeType::Back);
        assert_eq!(classification.depth[&a], 0);
    }

    #[test]
    fn unconnected_siblings_all_become_sources_at_depth_zero() {
        let graph = HierarchicalGraph::new().with_subgraph(
            Subgraph::new("cluster_A")
                .with_node(NodeSpec::new("a"))
                .with_node(NodeSpec::new("b"))
                .with_node(NodeSpec::new("c"))
                .with_node(NodeSpec::new("d")),
        );
        let tree = build(&graph).unwrap();
        let cluster_a = tree.region_children(tree.root())[0];
        let classification = classify_region(&tree, cluster_a).unwrap();
        for &child in &tree.region_children(cluster_a) {
            assert_eq!(classification.depth[&child], 0);
        }
    }

    #[test]
    fn cross_region_incoming_edge_disqualifies_empty_local_prev_source() {
        // cluster_A { p; q; r; } with local edges p->q, r->q: both p and r
        // have empty *local* prev. p also receives an edge from outside the
        // region (out->p), so its full prev is non-empty and it must not be
        // selected as a source; only r qualifies.
        let graph = HierarchicalGraph::new()
            .with_node(NodeSpec::new("out"))
            .with_subgraph(
                Subgraph::new("cluster_A")
                    .with_node(NodeSpec::new("p"))
                    .with_node(NodeSpec::new("q"))
                    .with_node(NodeSpec::new("r")),
            )
            .with_edge(EdgeSpec::new("out", "p"))
            .with_edge(EdgeSpec::new("p", "q"))
            .with_edge(EdgeSpec::new("r", "q"));
        let tree = build(&graph).unwrap();
        let cluster_a = tree
            .region_children(tree.root())
            .into_iter()
            .find(|&id| tree.name(id) == "cluster_A")
            .unwrap();
        let siblings = tree.region_children(cluster_a);
        let r = siblings.iter().copied().find(|&id| tree.name(id) == "r").unwrap();

        assert_eq!(select_sources(&tree, &siblings), vec![r]);
    }
}
