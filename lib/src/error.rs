//! Error types for compilation, evaluation and matching runs.

use oxigraph::model::{NamedNode, Term};
use thiserror::Error;

/// Result alias for shape compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Result alias for overlaying validation results.
pub type EvaluateResult<T> = Result<T, EvaluateError>;

/// Result alias for matching runs.
pub type MatchResult<T> = Result<T, MatchError>;

/// A shape fragment the compiler cannot turn into a rule tree.
///
/// These are fatal: they describe a shapes document outside the supported
/// subset, not a runtime condition.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unsupported constraint <{predicate}> on shape fragment {fragment}")]
    UnsupportedConstraint { fragment: Term, predicate: NamedNode },

    #[error("unsupported property path {path} on shape fragment {fragment}")]
    UnsupportedPath { fragment: Term, path: Term },

    #[error("invalid value {value} for <{predicate}> on shape fragment {fragment}")]
    InvalidParameter {
        fragment: Term,
        predicate: NamedNode,
        value: Term,
    },

    #[error("shape fragment {fragment} has no path and contributes no constraints")]
    EmptyFragment { fragment: Term },

    #[error("shape fragment {fragment} contains itself")]
    RecursiveShape { fragment: Term },
}

/// Failure while overlaying validation results onto a rule tree.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("no rule mapping for constraint component <{component}> (source shape: {source_shape:?})")]
    UnmappedComponent {
        component: NamedNode,
        source_shape: Option<Term>,
    },
}

/// Errors surfaced by a matching run.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Evaluate(#[from] EvaluateError),

    #[error("failed to parse RDF: {0}")]
    Parse(#[from] oxigraph::io::RdfParseError),

    #[error("invalid IRI: {0}")]
    Iri(#[from] oxigraph::model::IriParseError),

    #[error("store error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("enrichment rule <{rule}> failed: {message}")]
    Enrichment { rule: NamedNode, message: String },

    #[error("constraint validator failed: {0}")]
    Validator(String),

    #[error("malformed validation report: {0}")]
    InvalidReport(String),

    #[error("unknown requirement profile <{0}>")]
    UnknownProfile(NamedNode),

    #[error("working facts declare no entity of type <{primary_type}>")]
    MissingPrimaryEntity { primary_type: NamedNode },

    #[error("serialization failed: {0}")]
    Serialization(String),
}
