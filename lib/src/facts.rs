//! Ordered fact sets.
//!
//! Declaration order matters to the shape compiler (sibling order in the rule
//! tree) and to the aggregator (first-encountered tie breaking), so facts are
//! kept as an ordered list next to an oxigraph `Graph` used for lookups and
//! handed to the constraint validator.

use crate::error::MatchResult;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{Graph, NamedNodeRef, Term, TermRef, Triple};
use std::io::Cursor;

/// Parses a Turtle document into triples, in document order.
///
/// Blank node labels are kept as written so a shapes document and a
/// validation report parsed separately agree on fragment identities.
pub fn parse_turtle(input: &str) -> MatchResult<Vec<Triple>> {
    let parser = RdfParser::from_format(RdfFormat::Turtle);
    let mut triples = Vec::new();
    for quad in parser.for_reader(Cursor::new(input.as_bytes())) {
        let quad = quad?;
        triples.push(Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(triples)
}

/// A citizen's working fact set. Extended in place by the enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct WorkingFacts {
    triples: Vec<Triple>,
    graph: Graph,
}

impl WorkingFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples<I: IntoIterator<Item = Triple>>(triples: I) -> Self {
        let mut facts = Self::new();
        facts.extend(triples);
        facts
    }

    pub fn from_turtle(input: &str) -> MatchResult<Self> {
        Ok(Self::from_triples(parse_turtle(input)?))
    }

    /// Adds a fact unless it is already present. Returns whether it was new.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.graph.insert(&triple) {
            self.triples.push(triple);
            true
        } else {
            false
        }
    }

    /// Adds every fact not already present and returns how many were new.
    pub fn extend<I: IntoIterator<Item = Triple>>(&mut self, triples: I) -> usize {
        triples
            .into_iter()
            .filter(|triple| self.insert(triple.clone()))
            .count()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.graph.contains(triple)
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Subjects declared with `rdf:type class`, in fact order.
    pub fn instances_of(&self, class: NamedNodeRef<'_>) -> Vec<Term> {
        self.triples
            .iter()
            .filter(|t| t.predicate == rdf::TYPE && t.object.as_ref() == TermRef::from(class))
            .map(|t| Term::from(t.subject.clone()))
            .collect()
    }
}
