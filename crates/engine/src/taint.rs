//! Depth-first discovery of source to sink paths over a [`DataFlow`].
//!
//! For each (tainted source, sink) pair the search follows outgoing edges
//! in edge-list order and keeps the first path that reaches the sink. It
//! is neither the shortest path nor all paths.

use ir::{DataFlow, NodeKind};
use std::collections::{HashMap, HashSet};

type Adjacency<'a> = HashMap<&'a str, Vec<&'a str>>;

fn adjacency(flow: &DataFlow) -> Adjacency<'_> {
    let mut adj: Adjacency<'_> = HashMap::new();
    for edge in &flow.edges {
        adj.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }
    adj
}

fn first_path(adj: &Adjacency<'_>, from: &str, to: &str) -> Option<Vec<String>> {
    // (node, index of the next outgoing edge to try)
    let mut stack: Vec<(&str, usize)> = vec![(from, 0)];
    let mut visited: HashSet<&str> = HashSet::from([from]);
    while let Some(top) = stack.last_mut() {
        let node = top.0;
        if node == to {
            return Some(stack.iter().map(|(n, _)| n.to_string()).collect());
        }
        match adj.get(node).and_then(|next| next.get(top.1)).copied() {
            Some(next) => {
                top.1 += 1;
                if visited.insert(next) {
                    stack.push((next, 0));
                }
            }
            None => {
                stack.pop();
            }
        }
    }
    None
}

/// First path from `from` to `to`, if any.
pub fn find_path(flow: &DataFlow, from: &str, to: &str) -> Option<Vec<String>> {
    first_path(&adjacency(flow), from, to)
}

/// One path per reachable (tainted source, sink) pair, sources and sinks
/// taken in node order.
pub fn find_tainted_paths(flow: &DataFlow) -> Vec<Vec<String>> {
    let adj = adjacency(flow);
    let mut paths = Vec::new();
    for source in flow.nodes.iter().filter(|n| n.tainted) {
        for sink in flow.nodes.iter().filter(|n| n.kind == NodeKind::Sink) {
            if let Some(path) = first_path(&adj, &source.id, &sink.id) {
                paths.push(path);
            }
        }
    }
    paths
}
