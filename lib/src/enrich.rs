//! Forward-chaining enrichment of a citizen's working facts.
//!
//! Every rule is a SPARQL CONSTRUCT query. All rules run once against the
//! same snapshot of working plus reference facts; derived triples are folded
//! back into the working facts afterwards, so a rule never sees what another
//! rule derived in the same pass.

use crate::error::{MatchError, MatchResult};
use crate::facts::WorkingFacts;
use log::{debug, info};
use oxigraph::model::{GraphNameRef, NamedNode, Triple};
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRule {
    pub id: NamedNode,
    pub query: String,
}

impl EnrichmentRule {
    pub fn new(id: NamedNode, query: impl Into<String>) -> Self {
        EnrichmentRule {
            id,
            query: query.into(),
        }
    }

    fn failure(&self, message: impl ToString) -> MatchError {
        MatchError::Enrichment {
            rule: self.id.clone(),
            message: message.to_string(),
        }
    }

    fn derive(&self, store: &Store) -> MatchResult<Vec<Triple>> {
        let prepared = SparqlEvaluator::new()
            .parse_query(&self.query)
            .map_err(|e| self.failure(format!("failed to parse query: {}", e)))?;
        match prepared.on_store(store).execute() {
            Ok(QueryResults::Graph(triples)) => triples
                .map(|triple_res| triple_res.map_err(|e| self.failure(e)))
                .collect(),
            Ok(_) => Err(self.failure("returned non-graph result")),
            Err(e) => Err(self.failure(e)),
        }
    }
}

/// Runs every rule once and adds the derived triples to `working`.
/// Returns how many triples were new.
pub fn enrich(
    working: &mut WorkingFacts,
    reference: &[Triple],
    rules: &[EnrichmentRule],
) -> MatchResult<usize> {
    if rules.is_empty() {
        return Ok(0);
    }
    let store = Store::new()?;
    for triple in working.triples().iter().chain(reference) {
        store.insert(triple.as_ref().in_graph(GraphNameRef::DefaultGraph))?;
    }

    let mut derived = Vec::new();
    for rule in rules {
        let triples = rule.derive(&store)?;
        debug!("enrichment rule {} derived {} triple(s)", rule.id, triples.len());
        derived.extend(triples);
    }

    let added = working.extend(derived);
    info!(
        "enrichment pass over {} rule(s) added {} fact(s)",
        rules.len(),
        added
    );
    Ok(added)
}
