//! Eligibility matching over SHACL requirement profiles.
//!
//! Requirement profiles are compiled once into [`RuleTree`]s. A matching run
//! validates a citizen's working facts against every profile with an external
//! [`ConstraintValidator`], classifies each profile as eligible, ineligible
//! or missing data, and aggregates the missing facts into a
//! [`MatchingReport`] that names the next question to ask.

pub mod compiler;
pub mod enrich;
pub mod error;
pub mod evaluate;
pub mod explain;
pub mod facts;
pub mod graph;
pub mod matching;
pub mod named_nodes;
pub mod report;
pub mod rule_tree;
pub mod test_utils;
pub mod types;
pub mod validation;

pub use compiler::compile;
pub use enrich::{enrich, EnrichmentRule};
pub use error::{CompileError, EvaluateError, MatchError, MatchResult};
pub use evaluate::{entity_types, evaluate, EvaluatedNode, EvaluatedTree};
pub use explain::{Explainer, Locale};
pub use facts::{parse_turtle, WorkingFacts};
pub use graph::RawGraph;
pub use matching::{KnowledgeBase, Matcher, MatchingConfig, RequirementProfile};
pub use report::{Eligibility, MatchingReport, MissingDatum, MissingEntry, ProfileOutcome};
pub use rule_tree::{Constraint, NodeKind, RuleNode, RuleTree};
pub use types::{Component, FieldPath, Severity, Status};
pub use validation::{ConstraintValidator, ValidationReport, ValidationResult};
