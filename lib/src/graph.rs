//! Node/edge view over a fact set.
//!
//! Every distinct IRI or blank node becomes one node; every literal
//! occurrence gets a node of its own, since equal literal values in
//! unrelated positions must not be merged. Edges keep the order of the facts
//! they came from.

use crate::types::format_term_for_label;
use log::warn;
use oxigraph::model::vocab::rdf;
use oxigraph::model::{NamedNode, NamedNodeRef, Term, TermRef, Triple};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// A node of the raw graph.
#[derive(Debug, Clone)]
pub struct RawNode {
    pub term: Term,
    /// Blank nodes render as `_:<id>`, literals as their value, IRIs as their
    /// local name.
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct RawGraph {
    graph: DiGraph<RawNode, NamedNode>,
    node_map: HashMap<Term, NodeIndex>,
}

impl RawGraph {
    /// Builds the graph from facts in the given order.
    pub fn load<'a, I: IntoIterator<Item = &'a Triple>>(triples: I) -> Self {
        let mut raw = RawGraph::default();
        for triple in triples {
            let s_node = raw.intern(Term::from(triple.subject.clone()));
            let o_node = raw.intern(triple.object.clone());
            raw.graph.add_edge(s_node, o_node, triple.predicate.clone());
        }
        raw
    }

    fn intern(&mut self, term: Term) -> NodeIndex {
        let label = format_term_for_label(&term);
        if let Term::Literal(_) = term {
            return self.graph.add_node(RawNode { term, label });
        }
        if let Some(idx) = self.node_map.get(&term) {
            return *idx;
        }
        let idx = self.graph.add_node(RawNode {
            term: term.clone(),
            label,
        });
        self.node_map.insert(term, idx);
        idx
    }

    pub fn node(&self, idx: NodeIndex) -> &RawNode {
        &self.graph[idx]
    }

    pub fn term(&self, idx: NodeIndex) -> &Term {
        &self.graph[idx].term
    }

    /// Looks up the node of an IRI or blank node. Literals are never interned.
    pub fn node_for(&self, term: TermRef<'_>) -> Option<NodeIndex> {
        self.node_map.get(&term.into_owned()).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing edges of `idx` as `(predicate, object)`, in fact order.
    pub fn out_edges(&self, idx: NodeIndex) -> Vec<(&NamedNode, NodeIndex)> {
        let mut edges: Vec<(EdgeIndex, &NamedNode, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.weight(), e.target()))
            .collect();
        // petgraph walks adjacency lists newest first
        edges.sort_by_key(|(id, _, _)| *id);
        edges.into_iter().map(|(_, p, o)| (p, o)).collect()
    }

    pub fn objects(&self, idx: NodeIndex, predicate: NamedNodeRef<'_>) -> Vec<NodeIndex> {
        self.out_edges(idx)
            .into_iter()
            .filter(|(p, _)| **p == predicate)
            .map(|(_, o)| o)
            .collect()
    }

    pub fn object(&self, idx: NodeIndex, predicate: NamedNodeRef<'_>) -> Option<NodeIndex> {
        self.objects(idx, predicate).into_iter().next()
    }

    /// Subjects of edges labelled `predicate`, optionally restricted to one
    /// object, in fact order and without duplicates.
    pub fn subjects_with(
        &self,
        predicate: NamedNodeRef<'_>,
        object: Option<TermRef<'_>>,
    ) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (s, o) = self.graph.edge_endpoints(e)?;
                if self.graph[e] != predicate {
                    return None;
                }
                if let Some(expected) = object {
                    if self.graph[o].term.as_ref() != expected {
                        return None;
                    }
                }
                Some(s)
            })
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Follows an `rdf:first`/`rdf:rest` chain from `head` up to `rdf:nil`.
    ///
    /// A malformed chain (missing link or cycle) is not an error: the items
    /// collected so far are returned.
    pub fn resolve_list(&self, head: NodeIndex) -> Vec<NodeIndex> {
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut current = head;
        loop {
            if let Term::NamedNode(nn) = self.term(current) {
                if nn.as_ref() == rdf::NIL {
                    break;
                }
            }
            if !visited.insert(current) {
                warn!("RDF list starting at {} is cyclic", self.term(head));
                break;
            }
            let Some(first) = self.object(current, rdf::FIRST) else {
                warn!("RDF list cell {} has no rdf:first", self.term(current));
                break;
            };
            items.push(first);
            let Some(rest) = self.object(current, rdf::REST) else {
                warn!("RDF list cell {} has no rdf:rest", self.term(current));
                break;
            };
            current = rest;
        }
        items
    }

    /// Terms of the members of the list starting at `head`.
    pub fn resolve_list_terms(&self, head: NodeIndex) -> Vec<Term> {
        self.resolve_list(head)
            .into_iter()
            .map(|idx| self.term(idx).clone())
            .collect()
    }
}
