use oxigraph::model::{Graph, NamedNode, Term, Triple};
use reqmatch::test_utils::ScriptedValidator;
use reqmatch::{
    Eligibility, EnrichmentRule, FieldPath, KnowledgeBase, Locale, MatchError, Matcher,
    MatchingConfig, MissingDatum, Status, ValidationReport, WorkingFacts,
};

const PREFIXES: &str = r#"
    @prefix sh: <http://www.w3.org/ns/shacl#> .
    @prefix ex: <https://example.org/> .
    @prefix match: <https://w3id.org/reqmatch#> .
"#;

const ADULT_SHAPES: &str = r#"
    ex:AdultShape a sh:NodeShape ;
        sh:targetClass match:Citizen ;
        sh:property ex:ageShape .
    ex:ageShape sh:path ex:age ;
        sh:minCount 1 ;
        sh:maxCount 1 ;
        sh:minInclusive 18 .
"#;

const LOW_INCOME_SHAPES: &str = r#"
    ex:LowIncomeShape a sh:NodeShape ;
        sh:targetClass match:Citizen ;
        sh:property ex:incomeShape .
    ex:incomeShape sh:path ex:income ;
        sh:minCount 1 ;
        sh:maxInclusive 3000 .
"#;

const TOO_YOUNG: &str = r#"
    [] a sh:ValidationReport ;
        sh:conforms false ;
        sh:result [
            sh:focusNode ex:alice ;
            sh:resultPath ex:age ;
            sh:value 16 ;
            sh:sourceShape ex:ageShape ;
            sh:sourceConstraintComponent sh:MinInclusiveConstraintComponent ;
            sh:resultSeverity sh:Violation
        ] .
"#;

const NO_INCOME: &str = r#"
    [] a sh:ValidationReport ;
        sh:conforms false ;
        sh:result [
            sh:focusNode ex:alice ;
            sh:resultPath ex:income ;
            sh:sourceShape ex:incomeShape ;
            sh:sourceConstraintComponent sh:MinCountConstraintComponent ;
            sh:resultSeverity sh:Violation
        ] .
"#;

const ALICE: &str = r#"
    ex:alice a match:Citizen ;
        ex:age 16 .
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ttl(body: &str) -> String {
    format!("{}{}", PREFIXES, body)
}

fn ex(local: &str) -> NamedNode {
    NamedNode::new(format!("https://example.org/{}", local)).expect("valid iri")
}

fn facts(body: &str) -> WorkingFacts {
    WorkingFacts::from_turtle(&ttl(body)).expect("valid facts")
}

fn report(body: &str) -> ValidationReport {
    ValidationReport::from_turtle(&ttl(body)).expect("valid report")
}

fn two_profile_kb() -> KnowledgeBase {
    let validator = ScriptedValidator::new()
        .with_report(ex("AdultShape"), report(TOO_YOUNG))
        .with_report(ex("LowIncomeShape"), report(NO_INCOME));
    let mut kb = KnowledgeBase::new(validator);
    kb.add_profile_turtle(ex("adult"), &ttl(ADULT_SHAPES))
        .expect("adult profile compiles");
    kb.add_profile_turtle(ex("lowIncome"), &ttl(LOW_INCOME_SHAPES))
        .expect("low income profile compiles");
    kb
}

#[test]
fn scenario_a_underage_citizen_is_ineligible_with_explanation() {
    init_logging();
    let kb = two_profile_kb();
    let working = facts(ALICE);
    let matcher = Matcher::default();

    let outcome = matcher
        .match_one(&kb, &working, &ex("adult"))
        .expect("matches");
    assert_eq!(outcome.status, Eligibility::Ineligible);
    assert!(outcome.missing.is_empty());

    let trees = matcher
        .evaluate_profile(&kb, &working, &ex("adult"))
        .expect("evaluates");
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].entity, Term::from(ex("alice")));
    assert_eq!(trees[0].status(), Status::Violated);
    let sentences = matcher.explain(&trees[0]);
    assert_eq!(sentences.len(), 1);
    assert!(
        sentences[0].ends_with("must be at least 18, but it is 16."),
        "unexpected sentence: {}",
        sentences[0]
    );

    let german = Matcher::new(MatchingConfig::default().with_locale(Locale::De));
    assert_eq!(
        german.explain(&trees[0]),
        vec!["Der Wert von age muss mindestens 18 sein, ist aber 16."]
    );
}

#[test]
fn scenario_b_violation_and_shortfall_across_profiles() {
    init_logging();
    let kb = two_profile_kb();
    let mut working = facts(ALICE);
    let report = Matcher::default()
        .match_all(&kb, &mut working, &[ex("adult"), ex("lowIncome")])
        .expect("matches");

    assert_eq!(report.status(&ex("adult")), Some(Eligibility::Ineligible));
    assert_eq!(report.status(&ex("lowIncome")), Some(Eligibility::MissingData));
    let income = MissingDatum {
        entity: Term::from(ex("alice")),
        field: FieldPath::Predicate(ex("income")),
    };
    assert_eq!(report.most_missed, Some(income));
    assert_eq!(report.missing_count, 1);
    assert_eq!(report.missing[0].profiles, vec![ex("lowIncome")]);
}

const PARENT_SHAPES: &str = r#"
    ex:ParentShape a sh:NodeShape ;
        sh:targetClass match:Citizen ;
        sh:property ex:childrenShape .
    ex:childrenShape sh:path ex:hasChild ;
        sh:qualifiedValueShape ex:ChildShape ;
        sh:qualifiedMinCount 1 .
    ex:ChildShape a sh:NodeShape ;
        sh:property ex:birthDateShape .
    ex:birthDateShape sh:path ex:birthDate ;
        sh:minCount 1 .
"#;

const ONE_CHILD_INCOMPLETE: &str = r#"
    [] a sh:ValidationReport ;
        sh:conforms true ;
        sh:result [
            sh:focusNode ex:dana ;
            sh:resultPath ex:birthDate ;
            sh:sourceShape ex:birthDateShape ;
            sh:sourceConstraintComponent sh:MinCountConstraintComponent ;
            sh:resultSeverity sh:Warning
        ] .
"#;

const FAMILY: &str = r#"
    ex:alice a match:Citizen ;
        ex:hasChild ex:carl , ex:dana .
    ex:carl ex:birthDate "2015-04-01" .
"#;

fn parent_kb() -> KnowledgeBase {
    let validator =
        ScriptedValidator::new().with_report(ex("ParentShape"), report(ONE_CHILD_INCOMPLETE));
    let mut kb = KnowledgeBase::new(validator);
    kb.add_profile_turtle(ex("childBenefit"), &ttl(PARENT_SHAPES))
        .expect("compiles");
    kb
}

#[test]
fn scenario_c_qualified_quota_met_with_incomplete_sibling() {
    init_logging();
    let kb = parent_kb();
    let dana_birth_date = MissingDatum {
        entity: Term::from(ex("dana")),
        field: FieldPath::Predicate(ex("birthDate")),
    };

    let mut working = facts(FAMILY);
    let report = Matcher::default()
        .match_all(&kb, &mut working, &[ex("childBenefit")])
        .expect("matches");
    let outcome = report.outcome(&ex("childBenefit")).expect("evaluated");
    assert_eq!(outcome.status, Eligibility::Eligible);
    assert!(outcome.sentinel_only);
    assert_eq!(report.missing_count, 0);
    assert_eq!(report.most_missed, None);

    let collecting = Matcher::new(MatchingConfig::default().with_continue_despite_conformance(true));
    let report = collecting
        .match_all(&kb, &mut working, &[ex("childBenefit")])
        .expect("matches");
    assert_eq!(report.status(&ex("childBenefit")), Some(Eligibility::Eligible));
    assert_eq!(report.missing_count, 1);
    assert_eq!(report.most_missed, Some(dana_birth_date));
}

#[test]
fn scenario_d_paired_bounds_render_one_sentence() {
    init_logging();
    let shapes = r#"
        ex:PartTimeShape a sh:NodeShape ;
            sh:targetClass match:Citizen ;
            sh:property ex:hoursShape .
        ex:hoursShape sh:path ex:weeklyHours ;
            sh:minInclusive 15 ;
            sh:maxInclusive 36 .
    "#;
    let violations = r#"
        [] a sh:ValidationReport ;
            sh:conforms false ;
            sh:result [
                sh:focusNode ex:alice ; sh:resultPath ex:weeklyHours ; sh:value 40 ;
                sh:sourceShape ex:hoursShape ;
                sh:sourceConstraintComponent sh:MinInclusiveConstraintComponent ;
                sh:resultSeverity sh:Violation
            ] , [
                sh:focusNode ex:alice ; sh:resultPath ex:weeklyHours ; sh:value 40 ;
                sh:sourceShape ex:hoursShape ;
                sh:sourceConstraintComponent sh:MaxInclusiveConstraintComponent ;
                sh:resultSeverity sh:Violation
            ] .
    "#;
    let validator = ScriptedValidator::new().with_report(ex("PartTimeShape"), report(violations));
    let mut kb = KnowledgeBase::new(validator);
    kb.add_profile_turtle(ex("partTime"), &ttl(shapes))
        .expect("compiles");
    let working = facts("ex:alice a match:Citizen ; ex:weeklyHours 40 .");

    let matcher = Matcher::default();
    let trees = matcher
        .evaluate_profile(&kb, &working, &ex("partTime"))
        .expect("evaluates");
    assert_eq!(
        matcher.explain(&trees[0]),
        vec!["The value of weeklyHours must be between 15 and 36, but it is 40."]
    );
}

#[test]
fn matching_twice_gives_the_same_result() {
    init_logging();
    let mut kb = two_profile_kb();
    kb.add_enrichment_rule(EnrichmentRule::new(
        ex("adultFlag"),
        "PREFIX ex: <https://example.org/>
         CONSTRUCT { ?p ex:isMinor true } WHERE { ?p ex:age ?a FILTER(?a < 18) }",
    ));
    let mut working = facts(ALICE);
    let matcher = Matcher::default();
    let profiles = [ex("adult"), ex("lowIncome")];

    let first = matcher
        .match_all(&kb, &mut working, &profiles)
        .expect("matches");
    let facts_after_first = working.len();
    let second = matcher
        .match_all(&kb, &mut working, &profiles)
        .expect("matches");

    assert_eq!(working.len(), facts_after_first);
    assert_eq!(first.profiles, second.profiles);
    assert_eq!(first.missing, second.missing);
    assert_eq!(first.most_missed, second.most_missed);
}

#[test]
fn most_missed_ties_go_to_the_first_encountered_pair() {
    init_logging();
    let no_age = NO_INCOME
        .replace("ex:income", "ex:age")
        .replace("ex:incomeShape", "ex:ageShape");
    let validator = ScriptedValidator::new()
        .with_report(ex("LowIncomeShape"), report(NO_INCOME))
        .with_report(ex("AdultShape"), report(&no_age));
    let mut kb = KnowledgeBase::new(validator);
    kb.add_profile_turtle(ex("adult"), &ttl(ADULT_SHAPES))
        .expect("compiles");
    kb.add_profile_turtle(ex("lowIncome"), &ttl(LOW_INCOME_SHAPES))
        .expect("compiles");
    let matcher = Matcher::default();

    let mut working = facts("ex:alice a match:Citizen .");
    let report = matcher
        .match_all(&kb, &mut working, &[ex("lowIncome"), ex("adult")])
        .expect("matches");
    assert_eq!(report.missing_count, 2);
    assert_eq!(
        report.most_missed.map(|d| d.field),
        Some(FieldPath::Predicate(ex("income")))
    );

    let report = matcher
        .match_all(&kb, &mut working, &[ex("adult"), ex("lowIncome")])
        .expect("matches");
    assert_eq!(
        report.most_missed.map(|d| d.field),
        Some(FieldPath::Predicate(ex("age")))
    );
}

#[test]
fn unconstrained_profile_is_eligible() {
    init_logging();
    let mut kb = KnowledgeBase::new(ScriptedValidator::new());
    kb.add_profile_turtle(
        ex("everyone"),
        &ttl("ex:EveryoneShape a sh:NodeShape ; sh:targetClass match:Citizen ."),
    )
    .expect("compiles");
    let mut working = facts(ALICE);
    let matcher = Matcher::default();

    let report = matcher
        .match_all(&kb, &mut working, &[ex("everyone")])
        .expect("matches");
    assert_eq!(report.status(&ex("everyone")), Some(Eligibility::Eligible));
    assert!(!report.outcome(&ex("everyone")).expect("evaluated").sentinel_only);

    let trees = matcher
        .evaluate_profile(&kb, &working, &ex("everyone"))
        .expect("evaluates");
    assert_eq!(trees[0].status(), Status::Ok);
    assert!(matcher.explain(&trees[0]).is_empty());
}

#[test]
fn working_facts_must_declare_the_primary_entity() {
    init_logging();
    let kb = two_profile_kb();
    let mut working = facts("ex:alice ex:age 16 .");
    let err = Matcher::default()
        .match_all(&kb, &mut working, &[ex("adult")])
        .expect_err("no citizen declared");
    assert!(matches!(err, MatchError::MissingPrimaryEntity { .. }));

    // a different primary type makes the same facts acceptable
    let mut working = facts("ex:alice a ex:Person ; ex:age 16 .");
    let matcher = Matcher::new(
        MatchingConfig::default().with_primary_type("https://example.org/Person"),
    );
    assert!(matcher.match_all(&kb, &mut working, &[ex("adult")]).is_ok());

    let err = Matcher::default()
        .match_one(&kb, &facts(ALICE), &ex("unknown"))
        .expect_err("unknown profile");
    assert!(matches!(err, MatchError::UnknownProfile(id) if id == ex("unknown")));
}

#[test]
fn enrichment_runs_once_before_profiles_are_checked() {
    init_logging();
    let resident = Triple::new(ex("alice"), ex("residentOf"), ex("saxony"));
    let expected = resident.clone();
    // the validator sees the enriched data graph
    let validator = move |_: &Graph, data: &Graph| {
        if data.contains(&expected) {
            Ok(ValidationReport::conforming())
        } else {
            ValidationReport::from_turtle(&ttl(
                r#"[] a sh:ValidationReport ; sh:conforms false ;
                   sh:result [ sh:focusNode ex:alice ; sh:resultPath ex:residentOf ;
                               sh:sourceShape ex:residenceShape ;
                               sh:sourceConstraintComponent sh:MinCountConstraintComponent ] ."#,
            ))
        }
    };
    let mut kb = KnowledgeBase::new(validator);
    kb.add_profile_turtle(
        ex("saxonyResident"),
        &ttl(
            r#"ex:ResidentShape sh:targetClass match:Citizen ; sh:property ex:residenceShape .
               ex:residenceShape sh:path ex:residentOf ; sh:hasValue ex:saxony ."#,
        ),
    )
    .expect("compiles");
    kb.add_reference_turtle(&ttl("ex:leipzig ex:inState ex:saxony ."))
        .expect("valid reference facts");
    kb.add_enrichment_rule(EnrichmentRule::new(
        ex("stateOfResidence"),
        "PREFIX ex: <https://example.org/>
         CONSTRUCT { ?p ex:residentOf ?s } WHERE { ?p ex:livesIn ?c . ?c ex:inState ?s }",
    ));
    let profiles = [ex("saxonyResident")];

    let mut working = facts("ex:alice a match:Citizen ; ex:livesIn ex:leipzig .");
    let without = Matcher::new(MatchingConfig::default().with_enrichment(false))
        .match_all(&kb, &mut working, &profiles)
        .expect("matches");
    assert_eq!(without.status(&ex("saxonyResident")), Some(Eligibility::MissingData));
    assert!(!working.contains(&resident));

    let with = Matcher::default()
        .match_all(&kb, &mut working, &profiles)
        .expect("matches");
    assert_eq!(with.status(&ex("saxonyResident")), Some(Eligibility::Eligible));
    assert!(working.contains(&resident));
}
