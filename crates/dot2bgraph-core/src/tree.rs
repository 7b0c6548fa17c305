//! The Node/Region/Edge data model and the region tree builder.
//!
//! Nodes and regions live in a dense arena (`arena.rs`) and reference their
//! parent through an `Option<NodeId>` index rather than a back-pointer.

use std::collections::{HashMap, HashSet};

use dot2bgraph_error::{Error, Result};
use indexmap::IndexMap;

use crate::arena::{Arena, ArenaId};
use crate::declare_id;
use crate::input::HierarchicalGraph;

declare_id!(NodeId);
declare_id!(EdgeId);

#[derive(Debug)]
struct RegionData {
    /// Child name -> child node id, insertion ordered so that traversal
    /// order stays deterministic.
    children: IndexMap<String, NodeId>,
}

#[derive(Debug)]
struct NodeData {
    name: String,
    label: Option<String>,
    parent: Option<NodeId>,
    next: Vec<EdgeId>,
    prev: Vec<EdgeId>,
    region: Option<RegionData>,
}

#[derive(Debug, Clone)]
struct EdgeData {
    from: NodeId,
    to: NodeId,
    label: Option<String>,
}

/// The built region tree plus its directed edge set.
#[derive(Debug)]
pub struct RegionTree {
    nodes: Arena<NodeId, NodeData>,
    edges: Vec<EdgeData>,
    root: NodeId,
}

impl RegionTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes.get(id).name
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).label.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).parent
    }

    pub fn is_region(&self, id: NodeId) -> bool {
        self.nodes.get(id).region.is_some()
    }

    /// Children of a region, in insertion (alphabetical-subgraph, then
    /// alphabetical-direct-node) order. Empty for a non-region node.
    pub fn region_children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.nodes.get(id).region {
            Some(region) => region.children.values().copied().collect(),
            None => Vec::new(),
        }
    }

    pub fn edge(&self, id: EdgeId) -> (NodeId, NodeId, Option<&str>) {
        let e = &self.edges[id.index()];
        (e.from, e.to, e.label.as_deref())
    }

    fn are_siblings(&self, a: NodeId, b: NodeId) -> bool {
        self.parent(a) == self.parent(b)
    }

    /// All outgoing edges of `id`, local and cross-region alike.
    pub fn next(&self, id: NodeId) -> &[EdgeId] {
        &self.nodes.get(id).next
    }

    /// All incoming edges of `id`, local and cross-region alike.
    pub fn prev(&self, id: NodeId) -> &[EdgeId] {
        &self.nodes.get(id).prev
    }

    /// Outgoing edges whose destination is a sibling of `id`.
    pub fn local_next(&self, id: NodeId) -> Vec<EdgeId> {
        self.nodes
            .get(id)
            .next
            .iter()
            .copied()
            .filter(|&e| self.are_siblings(self.edges[e.index()].to, id))
            .collect()
    }

    /// Incoming edges whose source is a sibling of `id`.
    pub fn local_prev(&self, id: NodeId) -> Vec<EdgeId> {
        self.nodes
            .get(id)
            .prev
            .iter()
            .copied()
            .filter(|&e| self.are_siblings(self.edges[e.index()].from, id))
            .collect()
    }

    /// Outgoing edges whose destination lives in a different region.
    pub fn other_next(&self, id: NodeId) -> Vec<EdgeId> {
        self.nodes
            .get(id)
            .next
            .iter()
            .copied()
            .filter(|&e| !self.are_siblings(self.edges[e.index()].to, id))
            .collect()
    }

    /// Incoming edges whose source lives in a different region.
    pub fn other_prev(&self, id: NodeId) -> Vec<EdgeId> {
        self.nodes
            .get(id)
            .prev
            .iter()
            .copied()
            .filter(|&e| !self.are_siblings(self.edges[e.index()].from, id))
            .collect()
    }

    pub fn width(&self, id: NodeId) -> i64 {
        1.max(self.local_prev(id).len() as i64).max(self.local_next(id).len() as i64)
    }

    pub fn height(&self, id: NodeId) -> i64 {
        1.max(self.other_prev(id).len() as i64).max(self.other_next(id).len() as i64)
    }

    pub fn edge_to(&self, id: EdgeId) -> NodeId {
        self.edges[id.index()].to
    }

    pub fn edge_from(&self, id: EdgeId) -> NodeId {
        self.edges[id.index()].from
    }
}

/// Builds a [`RegionTree`] from a parsed [`HierarchicalGraph`].
pub fn build(graph: &HierarchicalGraph) -> Result<RegionTree> {
    let mut nodes: Arena<NodeId, NodeData> = Arena::new();
    let root = nodes.alloc(NodeData {
        name: String::new(),
        label: graph.label.clone(),
        parent: None,
        next: Vec::new(),
        prev: Vec::new(),
        region: Some(RegionData { children: IndexMap::new() }),
    });

    let mut by_name: HashMap<String, NodeId> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();

    let root_direct = direct_nodes_of(&graph.nodes, &graph.subgraphs);
    place_direct_nodes(&mut nodes, root, &root_direct, &mut by_name, &mut seen)?;
    place_subgraphs(&mut nodes, root, &graph.subgraphs, &mut by_name, &mut seen)?;

    let edges = build_edges(graph, &by_name)?;
    let edges = wire_edges(&mut nodes, edges);

    Ok(RegionTree { nodes, edges, root })
}

/// `all_nodes` minus every node owned by an immediately-nested subgraph.
/// Immediate subgraphs' `nodes` are already recursively inclusive of their
/// own nested subgraphs, so subtracting just this one level excludes every
/// deeper level transitively.
fn direct_nodes_of(
    all_nodes: &[crate::input::NodeSpec],
    subgraphs: &[crate::input::Subgraph],
) -> Vec<crate::input::NodeSpec> {
    let nested: HashSet<&str> =
        subgraphs.iter().flat_map(|s| s.nodes.iter().map(|n| n.name.as_str())).collect();
    all_nodes.iter().filter(|n| !nested.contains(n.name.as_str())).cloned().collect()
}

fn place_direct_nodes(
    nodes: &mut Arena<NodeId, NodeData>,
    parent: NodeId,
    all_nodes: &[crate::input::NodeSpec],
    by_name: &mut HashMap<String, NodeId>,
    seen: &mut HashSet<String>,
) -> Result<()> {
    let mut direct: Vec<&crate::input::NodeSpec> =
        all_nodes.iter().filter(|n| !seen.contains(&n.name)).collect();
    direct.sort_by(|a, b| a.name.cmp(&b.name));

    for spec in direct {
        if seen.contains(&spec.name) {
            continue;
        }
        let label = match spec.label.as_deref() {
            Some("\\N") => Some(spec.name.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        };
        let id = nodes.alloc(NodeData {
            name: spec.name.clone(),
            label,
            parent: Some(parent),
            next: Vec::new(),
            prev: Vec::new(),
            region: None,
        });

        let region = nodes.get_mut(parent).region.as_mut().expect("parent is a region");
        if region.children.insert(spec.name.clone(), id).is_some() {
            return Err(Error::malformed_input(format!(
                "duplicate node name '{}' within the same region",
                spec.name
            ))
            .with_operation("tree::build"));
        }

        seen.insert(spec.name.clone());
        by_name.insert(spec.name.clone(), id);
    }
    Ok(())
}

fn place_subgraphs(
    nodes: &mut Arena<NodeId, NodeData>,
    parent: NodeId,
    subgraphs: &[crate::input::Subgraph],
    by_name: &mut HashMap<String, NodeId>,
    seen: &mut HashSet<String>,
) -> Result<()> {
    // Alphabetical order is a deliberate workaround for a Graphviz ordering
    // bug (https://gitlab.com/graphviz/graphviz/-/issues/1767) and must be
    // honored for reproducibility.
    let mut ordered: Vec<&crate::input::Subgraph> = subgraphs.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    for subgraph in ordered {
        // direct_nodes = all nodes in this subgraph, minus nodes owned by
        // any nested subgraph; place_direct_nodes further excludes nodes
        // already placed elsewhere.
        let direct = direct_nodes_of(&subgraph.nodes, &subgraph.subgraphs);

        let region_id = nodes.alloc(NodeData {
            name: subgraph.name.clone(),
            label: subgraph.label.clone(),
            parent: Some(parent),
            next: Vec::new(),
            prev: Vec::new(),
            region: Some(RegionData { children: IndexMap::new() }),
        });

        {
            let parent_region = nodes.get_mut(parent).region.as_mut().expect("parent is a region");
            if parent_region.children.insert(subgraph.name.clone(), region_id).is_some() {
                return Err(Error::malformed_input(format!(
                    "duplicate subgraph name '{}' within the same region",
                    subgraph.name
                ))
                .with_operation("tree::build"));
            }
        }

        place_direct_nodes(nodes, region_id, &direct, by_name, seen)?;
        place_subgraphs(nodes, region_id, &subgraph.subgraphs, by_name, seen)?;
    }
    Ok(())
}

fn build_edges(graph: &HierarchicalGraph, by_name: &HashMap<String, NodeId>) -> Result<Vec<EdgeData>> {
    let mut edges = Vec::with_capacity(graph.edges.len());
    // Labels are stored on the (from, to) pair: when the pair repeats, the
    // last non-empty label wins for every occurrence of that pair.
    let mut pair_label: HashMap<(NodeId, NodeId), Option<String>> = HashMap::new();

    for spec in &graph.edges {
        let from = *by_name.get(&spec.from).ok_or_else(|| {
            Error::malformed_input(format!("unknown edge endpoint '{}'", spec.from))
                .with_operation("tree::build_edges")
        })?;
        let to = *by_name.get(&spec.to).ok_or_else(|| {
            Error::malformed_input(format!("unknown edge endpoint '{}'", spec.to))
                .with_operation("tree::build_edges")
        })?;

        if let Some(label) = spec.label.as_deref().filter(|l| !l.is_empty()) {
            pair_label.insert((from, to), Some(label.to_string()));
        } else {
            pair_label.entry((from, to)).or_insert(None);
        }

        edges.push(EdgeData { from, to, label: None });
    }

    for edge in &mut edges {
        edge.label = pair_label.get(&(edge.from, edge.to)).cloned().flatten();
    }

    Ok(edges)
}

fn wire_edges(nodes: &mut Arena<NodeId, NodeData>, edges: Vec<EdgeData>) -> Vec<EdgeData> {
    for (i, edge) in edges.iter().enumerate() {
        let id = EdgeId::from_index(i);
        nodes.get_mut(edge.from).next.push(id);
        nodes.get_mut(edge.to).prev.push(id);
    }
    edges
}
