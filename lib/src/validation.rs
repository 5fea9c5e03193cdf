//! Validation reports produced by an external SHACL engine.
//!
//! The engine itself is out of scope; anything that can hand back a standard
//! `sh:ValidationReport` graph can be plugged in through
//! [`ConstraintValidator`].

use crate::error::{MatchError, MatchResult};
use crate::facts::parse_turtle;
use crate::graph::RawGraph;
use crate::named_nodes::SHACL;
use crate::types::{FieldPath, Severity};
use log::debug;
use oxigraph::model::vocab::rdf;
use oxigraph::model::{Graph, NamedNode, Term, TermRef, Triple};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;

/// Runs a shapes graph against a data graph.
pub trait ConstraintValidator: Send + Sync {
    fn validate(&self, shapes: &Graph, data: &Graph) -> MatchResult<ValidationReport>;
}

impl<F> ConstraintValidator for F
where
    F: Fn(&Graph, &Graph) -> MatchResult<ValidationReport> + Send + Sync,
{
    fn validate(&self, shapes: &Graph, data: &Graph) -> MatchResult<ValidationReport> {
        self(shapes, data)
    }
}

/// One `sh:result`. `details` holds the nested `sh:detail` results.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub focus_node: Option<Term>,
    pub source_shape: Option<Term>,
    pub component: NamedNode,
    pub severity: Severity,
    pub value: Option<Term>,
    /// Only simple and inverse paths are kept; anything else reads as `None`.
    pub path: Option<FieldPath>,
    pub message: Option<String>,
    pub details: Vec<ValidationResult>,
}

impl ValidationResult {
    /// This result followed by all of its details, depth first.
    pub fn flatten(&self) -> Vec<&ValidationResult> {
        let mut out = vec![self];
        for detail in &self.details {
            out.extend(detail.flatten());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub conforms: bool,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn conforming() -> Self {
        ValidationReport {
            conforms: true,
            results: Vec::new(),
        }
    }

    /// Every result including nested details, depth first.
    pub fn flatten(&self) -> Vec<&ValidationResult> {
        self.results.iter().flat_map(|r| r.flatten()).collect()
    }

    pub fn from_turtle(input: &str) -> MatchResult<Self> {
        Self::from_triples(&parse_turtle(input)?)
    }

    /// Result order follows `triples`.
    pub fn from_triples(triples: &[Triple]) -> MatchResult<Self> {
        ReportReader::new(RawGraph::load(triples)).read()
    }

    /// Result order follows the graph's iteration order, which is not
    /// insertion order. Prefer [`ValidationReport::from_triples`] when the
    /// source order is known.
    pub fn from_graph(graph: &Graph) -> MatchResult<Self> {
        let triples: Vec<Triple> = graph.iter().map(|t| t.into_owned()).collect();
        Self::from_triples(&triples)
    }
}

struct ReportReader {
    raw: RawGraph,
    sh: SHACL,
}

impl ReportReader {
    fn new(raw: RawGraph) -> Self {
        ReportReader {
            raw,
            sh: SHACL::new(),
        }
    }

    fn read(&self) -> MatchResult<ValidationReport> {
        let report = self
            .raw
            .subjects_with(rdf::TYPE, Some(TermRef::from(self.sh.validation_report)))
            .into_iter()
            .next()
            .or_else(|| self.raw.subjects_with(self.sh.conforms, None).into_iter().next())
            .ok_or_else(|| MatchError::InvalidReport("no sh:ValidationReport node".to_string()))?;

        let conforms = match self.raw.object(report, self.sh.conforms).map(|o| self.raw.term(o)) {
            Some(Term::Literal(lit)) if lit.value() == "true" || lit.value() == "1" => true,
            Some(Term::Literal(lit)) if lit.value() == "false" || lit.value() == "0" => false,
            other => {
                return Err(MatchError::InvalidReport(format!(
                    "sh:conforms must be a boolean, found {:?}",
                    other
                )))
            }
        };

        let mut ancestors = HashSet::new();
        let results = self
            .raw
            .objects(report, self.sh.result)
            .into_iter()
            .map(|r| self.read_result(r, &mut ancestors))
            .collect::<MatchResult<Vec<_>>>()?;
        Ok(ValidationReport { conforms, results })
    }

    fn read_result(&self, node: NodeIndex, ancestors: &mut HashSet<NodeIndex>) -> MatchResult<ValidationResult> {
        if !ancestors.insert(node) {
            return Err(MatchError::InvalidReport(format!(
                "result {} is nested in itself",
                self.raw.term(node)
            )));
        }
        let sh = &self.sh;
        let term = |predicate| self.raw.object(node, predicate).map(|o| self.raw.term(o).clone());

        let component = match term(sh.source_constraint_component) {
            Some(Term::NamedNode(nn)) => nn,
            _ => {
                return Err(MatchError::InvalidReport(format!(
                    "result {} has no sh:sourceConstraintComponent",
                    self.raw.term(node)
                )))
            }
        };
        let severity = term(sh.result_severity)
            .map(|s| Severity::from_term(&s))
            .unwrap_or_default();
        let message = self
            .raw
            .objects(node, sh.result_message)
            .into_iter()
            .find_map(|o| match self.raw.term(o) {
                Term::Literal(lit) => Some(lit.value().to_string()),
                _ => None,
            });
        let path = self
            .raw
            .object(node, sh.result_path)
            .and_then(|p| self.read_path(p));
        let details = self
            .raw
            .objects(node, sh.detail)
            .into_iter()
            .map(|d| self.read_result(d, ancestors))
            .collect::<MatchResult<Vec<_>>>()?;
        ancestors.remove(&node);

        Ok(ValidationResult {
            focus_node: term(sh.focus_node),
            source_shape: term(sh.source_shape),
            component,
            severity,
            value: term(sh.value),
            path,
            message,
            details,
        })
    }

    fn read_path(&self, path: NodeIndex) -> Option<FieldPath> {
        match self.raw.term(path) {
            Term::NamedNode(nn) => Some(FieldPath::Predicate(nn.clone())),
            Term::BlankNode(_) => {
                let inverse = self.raw.object(path, self.sh.inverse_path)?;
                match self.raw.term(inverse) {
                    Term::NamedNode(nn) => Some(FieldPath::Inverse(nn.clone())),
                    _ => None,
                }
            }
            other => {
                debug!("ignoring unsupported result path {}", other);
                None
            }
        }
    }
}
