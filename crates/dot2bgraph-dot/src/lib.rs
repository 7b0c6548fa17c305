//! Parses DOT source text into a [`HierarchicalGraph`], the layout core's
//! collaborator input type. The layout core has no DOT awareness of its
//! own; this crate is the sole adapter.
//!
//! Walks `dot_parser::ast` statements, tracking node/edge/subgraph
//! statements per nesting level, flattening edges into one list, and
//! deriving each subgraph's recursively-inclusive node set once the whole
//! tree is known.

use dot_parser::ast;
use either::Either;
use indexmap::{IndexMap, IndexSet};

use dot2bgraph_core::{EdgeSpec, HierarchicalGraph, NodeSpec, Subgraph};
use dot2bgraph_error::{Error, Result};

type AstGraph<'a> = ast::Graph<(ast::ID<'a>, ast::ID<'a>)>;
type AstStmt<'a> = ast::Stmt<(ast::ID<'a>, ast::ID<'a>)>;
type AstAttrList<'a> = ast::AttrList<(ast::ID<'a>, ast::ID<'a>)>;
type AstSubgraph<'a> = ast::Subgraph<(ast::ID<'a>, ast::ID<'a>)>;
type AstEdgeStmt<'a> = ast::EdgeStmt<(ast::ID<'a>, ast::ID<'a>)>;
type AstNodeStmt<'a> = ast::NodeStmt<(ast::ID<'a>, ast::ID<'a>)>;

/// dot-parser strips outer quotes from attribute values but keeps them on
/// node/subgraph IDs; unescape `\"` either way, leave `\\`, `\n`, `\l`, `\r`
/// alone since they're DOT label formatting directives, not escapes.
fn unquote(s: &str) -> String {
    let inner = if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    };
    inner.replace("\\\"", "\"")
}

fn id_to_string(id: &ast::ID) -> String {
    let s: String = id.clone().into();
    s
}

fn find_attr(attr_list: &AstAttrList, key: &str) -> Option<String> {
    let mut found = None;
    for alist in &attr_list.elems {
        for (k, v) in &alist.elems {
            if id_to_string(k) == key {
                found = Some(unquote(&id_to_string(v)));
            }
        }
    }
    found
}

/// One nesting level of the DOT source (the top graph, or a named
/// subgraph): every node name declared directly here (explicit statements
/// plus implicit edge-endpoint declarations), and child subgraphs.
struct Level {
    name: Option<String>,
    label: Option<String>,
    direct: IndexSet<String>,
    children: Vec<Level>,
}

impl Level {
    fn new(name: Option<String>) -> Self {
        Self { name, label: None, direct: IndexSet::new(), children: Vec::new() }
    }
}

/// State threaded through the whole walk: every node's label, keyed
/// globally since Graphviz node attributes aren't scoped to the subgraph
/// they're declared in, and the flattened edge list (`HierarchicalGraph.edges`
/// is one flat list resolved by name, regardless of nesting depth).
struct Collector {
    node_labels: IndexMap<String, Option<String>>,
    edges: Vec<EdgeSpec>,
}

/// Parses DOT source text into a [`HierarchicalGraph`].
pub fn parse(input: &str) -> Result<HierarchicalGraph> {
    let ast_graph: AstGraph = ast::Graph::try_from(input).map_err(|e| {
        Error::dot_syntax(format!("DOT parse error: {e}")).with_operation("dot2bgraph_dot::parse")
    })?;

    let mut collector = Collector { node_labels: IndexMap::new(), edges: Vec::new() };
    let mut top = Level::new(None);
    walk_stmts(&ast_graph.stmts.stmts, &mut top, &mut collector);

    let label = ast_graph.name.map(|n| unquote(&n));
    let nodes = resolve_nodes(&top, &collector.node_labels);
    let subgraphs =
        top.children.iter().map(|child| build_subgraph(child, &collector.node_labels)).collect();

    Ok(HierarchicalGraph { label, nodes, subgraphs, edges: collector.edges })
}

fn walk_stmts(stmts: &[AstStmt], level: &mut Level, collector: &mut Collector) {
    for stmt in stmts {
        match stmt {
            AstStmt::NodeStmt(node_stmt) => {
                let name = add_node(node_stmt, collector);
                level.direct.insert(name);
            }
            AstStmt::EdgeStmt(edge_stmt) => add_edges(edge_stmt, level, collector),
            AstStmt::AttrStmt(ast::AttrStmt::Graph(attr_list)) => {
                if let Some(label) = find_attr(attr_list, "label") {
                    level.label = Some(label);
                }
            }
            // `node [...]` / `edge [...]` set rendering defaults, not
            // semantic data; the layout core has no use for them.
            AstStmt::AttrStmt(ast::AttrStmt::Node(_) | ast::AttrStmt::Edge(_)) => {}
            AstStmt::IDEq(k, v) => {
                if unquote(k) == "label" {
                    level.label = Some(unquote(v));
                }
            }
            AstStmt::Subgraph(sub) => {
                let mut child = Level::new(sub.id.as_ref().map(|s| unquote(s)));
                walk_stmts(&sub.stmts.stmts, &mut child, collector);
                level.children.push(child);
            }
        }
    }
}

fn add_node(node_stmt: &AstNodeStmt, collector: &mut Collector) -> String {
    let id = unquote(&node_stmt.node.id);
    let label = node_stmt.attr.as_ref().and_then(|attrs| find_attr(attrs, "label"));
    match label {
        Some(l) => {
            collector.node_labels.insert(id.clone(), Some(l));
        }
        None => {
            collector.node_labels.entry(id.clone()).or_insert(None);
        }
    }
    id
}

/// Flattens an EdgeStmt into individual edges (chained `a -> b -> c` and
/// anonymous-subgraph endpoints `{ a b } -> c` both expand to every pairwise
/// edge), recording any nodes only ever seen as endpoints.
fn add_edges(edge_stmt: &AstEdgeStmt, level: &mut Level, collector: &mut Collector) {
    let edge_label = edge_stmt.attr.as_ref().and_then(|attrs| find_attr(attrs, "label"));

    let mut endpoints: Vec<Either<&ast::NodeID, &AstSubgraph>> = Vec::new();
    endpoints.push(edge_stmt.from.as_ref());
    let mut rhs = &edge_stmt.next;
    loop {
        endpoints.push(rhs.to.as_ref());
        match &rhs.next {
            Some(next) => rhs = next,
            None => break,
        }
    }

    for pair in endpoints.windows(2) {
        let from_ids = endpoint_node_ids(&pair[0], level, collector);
        let to_ids = endpoint_node_ids(&pair[1], level, collector);
        for from_id in &from_ids {
            for to_id in &to_ids {
                collector.node_labels.entry(from_id.clone()).or_insert(None);
                collector.node_labels.entry(to_id.clone()).or_insert(None);
                level.direct.insert(from_id.clone());
                level.direct.insert(to_id.clone());

                let mut edge = EdgeSpec::new(from_id.clone(), to_id.clone());
                if let Some(l) = &edge_label {
                    edge = edge.with_label(l.clone());
                }
                collector.edges.push(edge);
            }
        }
    }
}

/// Node IDs named by an edge endpoint, which may be a single node or an
/// anonymous subgraph grouping several nodes. Anonymous endpoint subgraphs
/// are not themselves regions; their nodes attach to the enclosing level.
fn endpoint_node_ids(
    endpoint: &Either<&ast::NodeID, &AstSubgraph>,
    level: &mut Level,
    collector: &mut Collector,
) -> Vec<String> {
    match endpoint {
        Either::Left(node_id) => vec![unquote(&node_id.id)],
        Either::Right(sub) => {
            let mut ids = Vec::new();
            collect_endpoint_ids(&sub.stmts.stmts, &mut ids, level, collector);
            ids
        }
    }
}

fn collect_endpoint_ids(
    stmts: &[AstStmt],
    ids: &mut Vec<String>,
    level: &mut Level,
    collector: &mut Collector,
) {
    for stmt in stmts {
        match stmt {
            AstStmt::NodeStmt(node_stmt) => {
                let id = add_node(node_stmt, collector);
                level.direct.insert(id.clone());
                ids.push(id);
            }
            AstStmt::EdgeStmt(edge_stmt) => {
                add_edges(edge_stmt, level, collector);
                let mut inner_ids = endpoint_node_ids(&edge_stmt.from.as_ref(), level, collector);
                ids.append(&mut inner_ids);
            }
            AstStmt::Subgraph(sub) => {
                collect_endpoint_ids(&sub.stmts.stmts, ids, level, collector);
            }
            _ => {}
        }
    }
}

/// Every node name owned by this level or any descendant subgraph
/// (recursively inclusive, per [`dot2bgraph_core::input::Subgraph::nodes`]).
fn recursive_names(level: &Level) -> IndexSet<String> {
    let mut names = level.direct.clone();
    for child in &level.children {
        names.extend(recursive_names(child));
    }
    names
}

fn resolve_nodes(level: &Level, node_labels: &IndexMap<String, Option<String>>) -> Vec<NodeSpec> {
    let mut names = level.direct.clone();
    for child in &level.children {
        names.extend(recursive_names(child));
    }
    names.into_iter().map(|name| to_node_spec(&name, node_labels)).collect()
}

fn to_node_spec(name: &str, node_labels: &IndexMap<String, Option<String>>) -> NodeSpec {
    let mut spec = NodeSpec::new(name.to_string());
    if let Some(Some(label)) = node_labels.get(name) {
        spec = spec.with_label(label.clone());
    }
    spec
}

fn build_subgraph(level: &Level, node_labels: &IndexMap<String, Option<String>>) -> Subgraph {
    let mut sub = Subgraph::new(level.name.clone().unwrap_or_default());
    if let Some(label) = &level.label {
        sub = sub.with_label(label.clone());
    }
    for node in resolve_nodes(level, node_labels) {
        sub = sub.with_node(node);
    }
    for child in &level.children {
        sub = sub.with_subgraph(build_subgraph(child, node_labels));
    }
    sub
}
