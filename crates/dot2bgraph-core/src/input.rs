//! Collaborator input types.
//!
//! DOT parsing itself is out of scope for the layout core; this module
//! only describes the shape a parser must hand the core. `dot2bgraph-dot`
//! builds these from real DOT source.

/// A single node declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub name: String,
    /// `Some("\\N")` means "use the node's own name"; resolved by the
    /// region tree builder, not here.
    pub label: Option<String>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A single edge declaration. `from`/`to` are node names, resolved against
/// the tree by the region tree builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

impl EdgeSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into(), label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A nested subgraph. `nodes` is recursively inclusive of every descendant
/// subgraph's nodes (mirrors pygraphviz's `AGraph.nodes()`, which returns
/// every node reachable from a subgraph regardless of nesting depth). The
/// region tree builder is responsible for subtracting out nested subgraphs'
/// node sets to find each region's directly-owned nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subgraph {
    pub name: String,
    pub label: Option<String>,
    pub nodes: Vec<NodeSpec>,
    pub subgraphs: Vec<Subgraph>,
}

impl Subgraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_subgraph(mut self, subgraph: Subgraph) -> Self {
        self.subgraphs.push(subgraph);
        self
    }
}

/// The top-level input to the layout core.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HierarchicalGraph {
    pub label: Option<String>,
    /// All node names reachable at the top level, recursively inclusive of
    /// every subgraph's nodes (see [`Subgraph::nodes`]).
    pub nodes: Vec<NodeSpec>,
    pub subgraphs: Vec<Subgraph>,
    pub edges: Vec<EdgeSpec>,
}

impl HierarchicalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_subgraph(mut self, subgraph: Subgraph) -> Self {
        self.subgraphs.push(subgraph);
        self
    }

    pub fn with_edge(mut self, edge: EdgeSpec) -> Self {
        self.edges.push(edge);
        self
    }
}
