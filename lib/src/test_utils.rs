//! Helpers for exercising the matcher without a SHACL engine.

use crate::error::MatchResult;
use crate::facts::parse_turtle;
use crate::validation::{ConstraintValidator, ValidationReport};
use oxigraph::model::{Graph, NamedNode, NamedNodeRef, NamedOrBlankNodeRef};

/// Hands out canned reports. A script applies when its shape IRI occurs as
/// a subject of the shapes graph being validated; without a matching
/// script the data conforms.
#[derive(Debug, Clone, Default)]
pub struct ScriptedValidator {
    scripts: Vec<(NamedNode, ValidationReport)>,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(mut self, shape: NamedNode, report: ValidationReport) -> Self {
        self.scripts.push((shape, report));
        self
    }

    /// Like [`ScriptedValidator::with_report`], reading the report from
    /// Turtle.
    pub fn with_turtle_report(self, shape: NamedNode, report: &str) -> MatchResult<Self> {
        Ok(self.with_report(shape, ValidationReport::from_turtle(report)?))
    }
}

fn declares(shapes: &Graph, shape: NamedNodeRef<'_>) -> bool {
    shapes
        .triples_for_subject(NamedOrBlankNodeRef::from(shape))
        .next()
        .is_some()
}

impl ConstraintValidator for ScriptedValidator {
    fn validate(&self, shapes: &Graph, _data: &Graph) -> MatchResult<ValidationReport> {
        Ok(self
            .scripts
            .iter()
            .find(|(shape, _)| declares(shapes, shape.as_ref()))
            .map(|(_, report)| report.clone())
            .unwrap_or_else(ValidationReport::conforming))
    }
}

/// Parses Turtle into an unordered graph.
pub fn graph_from_turtle(input: &str) -> MatchResult<Graph> {
    let mut graph = Graph::new();
    for triple in parse_turtle(input)? {
        graph.insert(&triple);
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_script_for_the_declared_shape() {
        let shape = NamedNode::new("https://example.org/S").expect("valid iri");
        let other = NamedNode::new("https://example.org/T").expect("valid iri");
        let failing = ValidationReport {
            conforms: false,
            results: Vec::new(),
        };
        let validator = ScriptedValidator::new().with_report(shape, failing.clone());

        let shapes = graph_from_turtle(
            "<https://example.org/S> <http://www.w3.org/ns/shacl#targetClass> <https://example.org/C> .",
        )
        .expect("valid turtle");
        assert_eq!(
            validator.validate(&shapes, &Graph::new()).expect("validates"),
            failing
        );

        let validator = ScriptedValidator::new().with_report(other, failing);
        assert!(validator.validate(&shapes, &Graph::new()).expect("validates").conforms);
    }
}
