//! Requirement profiles, the per-profile classifier and the cross-profile
//! aggregation of missing data.

use crate::compiler::compile;
use crate::enrich::{enrich, EnrichmentRule};
use crate::error::{MatchError, MatchResult};
use crate::evaluate::{entity_types, evaluate, EvaluatedTree};
use crate::explain::{Explainer, Locale};
use crate::facts::{parse_turtle, WorkingFacts};
use crate::graph::RawGraph;
use crate::named_nodes::MATCH;
use crate::report::{Eligibility, MatchingReport, MissingDatum, ProfileOutcome};
use crate::rule_tree::RuleTree;
use crate::types::{Component, Severity};
use crate::validation::{ConstraintValidator, ValidationReport, ValidationResult};
use log::{debug, info, warn};
use oxigraph::model::{Graph, NamedNode, Term, Triple};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings of a matching run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Class the citizen entity must be declared as.
    pub primary_type: String,
    /// Report the missing data of eligible profiles too.
    pub continue_despite_conformance: bool,
    /// Run the enrichment pass before matching.
    pub enrich: bool,
    pub locale: Locale,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            primary_type: MATCH::new().citizen.as_str().to_string(),
            continue_despite_conformance: false,
            enrich: true,
            locale: Locale::default(),
        }
    }
}

impl MatchingConfig {
    pub fn with_primary_type(mut self, primary_type: impl Into<String>) -> Self {
        self.primary_type = primary_type.into();
        self
    }

    pub fn with_continue_despite_conformance(mut self, enabled: bool) -> Self {
        self.continue_despite_conformance = enabled;
        self
    }

    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enrich = enabled;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn from_json(input: &str) -> MatchResult<Self> {
        serde_json::from_str(input).map_err(|e| MatchError::Serialization(e.to_string()))
    }
}

/// One eligibility policy: its shapes and their compiled tree.
#[derive(Debug, Clone)]
pub struct RequirementProfile {
    pub id: NamedNode,
    pub shapes: Vec<Triple>,
    pub graph: Graph,
    pub tree: Arc<RuleTree>,
}

/// Everything a matching run reads but never changes.
pub struct KnowledgeBase {
    profiles: Vec<RequirementProfile>,
    reference: Vec<Triple>,
    rules: Vec<EnrichmentRule>,
    validator: Box<dyn ConstraintValidator>,
}

impl KnowledgeBase {
    pub fn new(validator: impl ConstraintValidator + 'static) -> Self {
        KnowledgeBase {
            profiles: Vec::new(),
            reference: Vec::new(),
            rules: Vec::new(),
            validator: Box::new(validator),
        }
    }

    /// Compiles `shapes` and registers them under `id`, replacing any
    /// profile with the same id.
    pub fn add_profile(&mut self, id: NamedNode, shapes: Vec<Triple>) -> MatchResult<Arc<RuleTree>> {
        let raw = RawGraph::load(&shapes);
        let tree = Arc::new(compile(&raw, Term::from(id.clone()))?);
        let mut graph = Graph::new();
        for triple in &shapes {
            graph.insert(triple);
        }
        let profile = RequirementProfile {
            id: id.clone(),
            shapes,
            graph,
            tree: Arc::clone(&tree),
        };
        match self.profiles.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
        Ok(tree)
    }

    pub fn add_profile_turtle(&mut self, id: NamedNode, shapes: &str) -> MatchResult<Arc<RuleTree>> {
        self.add_profile(id, parse_turtle(shapes)?)
    }

    pub fn add_reference_facts<I: IntoIterator<Item = Triple>>(&mut self, triples: I) {
        self.reference.extend(triples);
    }

    pub fn add_reference_turtle(&mut self, input: &str) -> MatchResult<()> {
        self.add_reference_facts(parse_turtle(input)?);
        Ok(())
    }

    pub fn add_enrichment_rule(&mut self, rule: EnrichmentRule) {
        self.rules.push(rule);
    }

    pub fn profile(&self, id: &NamedNode) -> Option<&RequirementProfile> {
        self.profiles.iter().find(|p| &p.id == id)
    }

    pub fn profile_ids(&self) -> Vec<NamedNode> {
        self.profiles.iter().map(|p| p.id.clone()).collect()
    }

    pub fn reference_facts(&self) -> &[Triple] {
        &self.reference
    }

    pub fn enrichment_rules(&self) -> &[EnrichmentRule] {
        &self.rules
    }

    fn validate(&self, id: &NamedNode, working: &WorkingFacts) -> MatchResult<(&RequirementProfile, ValidationReport)> {
        let profile = self
            .profile(id)
            .ok_or_else(|| MatchError::UnknownProfile(id.clone()))?;
        let report = self.validator.validate(&profile.graph, working.graph())?;
        Ok((profile, report))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatchingConfig,
}

impl Matcher {
    pub fn new(config: MatchingConfig) -> Self {
        Matcher { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    fn check_primary_entity(&self, working: &WorkingFacts) -> MatchResult<()> {
        let primary_type = NamedNode::new(self.config.primary_type.as_str())?;
        if working.instances_of(primary_type.as_ref()).is_empty() {
            return Err(MatchError::MissingPrimaryEntity { primary_type });
        }
        Ok(())
    }

    /// Classifies one profile against the working facts.
    pub fn match_one(
        &self,
        kb: &KnowledgeBase,
        working: &WorkingFacts,
        profile: &NamedNode,
    ) -> MatchResult<ProfileOutcome> {
        self.check_primary_entity(working)?;
        let (_, report) = kb.validate(profile, working)?;
        let outcome = self.classify(profile, &report);
        debug!(
            "profile {}: {} (sentinel only: {}, {} missing)",
            profile,
            outcome.status,
            outcome.sentinel_only,
            outcome.missing.len()
        );
        Ok(outcome)
    }

    fn classify(&self, profile: &NamedNode, report: &ValidationReport) -> ProfileOutcome {
        let shortfalls = shortfalls(report);
        let (status, sentinel_only, missing) = if report.conforms {
            let missing = if self.config.continue_despite_conformance {
                shortfalls.clone()
            } else {
                Vec::new()
            };
            (Eligibility::Eligible, !shortfalls.is_empty(), missing)
        } else if report.results.iter().any(is_independent_violation) {
            (Eligibility::Ineligible, false, Vec::new())
        } else {
            (Eligibility::MissingData, false, shortfalls)
        };
        ProfileOutcome {
            profile: profile.clone(),
            status,
            sentinel_only,
            missing,
        }
    }

    /// Enriches the working facts once, then classifies every profile in
    /// `profiles` and aggregates what is missing.
    pub fn match_all(
        &self,
        kb: &KnowledgeBase,
        working: &mut WorkingFacts,
        profiles: &[NamedNode],
    ) -> MatchResult<MatchingReport> {
        self.check_primary_entity(working)?;
        if self.config.enrich {
            enrich(working, kb.reference_facts(), kb.enrichment_rules())?;
        }
        let outcomes = profiles
            .iter()
            .map(|profile| self.match_one(kb, working, profile))
            .collect::<MatchResult<Vec<_>>>()?;
        let report = MatchingReport::from_outcomes(outcomes);
        info!(
            "matched {} profile(s): {} eligible, {} ineligible, {} missing data, {} missing datum(s)",
            report.profiles.len(),
            count(&report, Eligibility::Eligible),
            count(&report, Eligibility::Ineligible),
            count(&report, Eligibility::MissingData),
            report.missing_count
        );
        Ok(report)
    }

    /// Validates one profile and overlays the results onto a tree per
    /// targeted entity.
    pub fn evaluate_profile(
        &self,
        kb: &KnowledgeBase,
        working: &WorkingFacts,
        profile: &NamedNode,
    ) -> MatchResult<Vec<EvaluatedTree>> {
        let (profile, report) = kb.validate(profile, working)?;
        let entities = entity_types(working, &profile.tree);
        Ok(evaluate(&profile.tree, &entities, &report.results)?)
    }

    pub fn explain(&self, tree: &EvaluatedTree) -> Vec<String> {
        Explainer::new(self.config.locale).explain(tree)
    }
}

fn count(report: &MatchingReport, status: Eligibility) -> usize {
    report.profiles.iter().filter(|p| p.status == status).count()
}

/// A top-level violation that is not merely an echo of a count shortfall or
/// of a nested failure.
fn is_independent_violation(result: &ValidationResult) -> bool {
    result.severity == Severity::Violation
        && Component::from_iri(result.component.as_ref()).map_or(true, |c| !c.is_structural_echo())
}

/// `(entity, field)` pairs of every count shortfall, nested ones included,
/// in report order.
fn shortfalls(report: &ValidationReport) -> Vec<MissingDatum> {
    let mut missing: Vec<MissingDatum> = Vec::new();
    for result in report.flatten() {
        let is_shortfall = Component::from_iri(result.component.as_ref())
            .is_some_and(Component::is_count_shortfall);
        if !is_shortfall {
            continue;
        }
        let (Some(entity), Some(field)) = (&result.focus_node, &result.path) else {
            warn!(
                "skipping {} result without focus node or path (source shape {:?})",
                result.component, result.source_shape
            );
            continue;
        };
        let datum = MissingDatum {
            entity: entity.clone(),
            field: field.clone(),
        };
        if !missing.contains(&datum) {
            missing.push(datum);
        }
    }
    missing
}
