mod common;

use std::sync::Arc;

use common::{checked_at, reference_lookup, section, valid_protocol, UnavailableLookup};
use medproto_core::models::flowchart::Flowchart;
use medproto_core::models::protocol::{ProtocolFullContent, ProtocolSection};
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};
use medproto_validation::rules::medical_content::EvidenceBase;
use medproto_validation::rules::{all_rules, get_rule, rules_in};
use medproto_validation::{
    KeywordNormalizer, PatternDecisionExtractor, Rule, RuleContext, RuleGroup, ValidationConfig, Validator,
};
use serde_json::json;

fn rule_ids(issues: &[ValidationIssue]) -> Vec<&str> {
    issues.iter().map(|i| i.rule_id.as_str()).collect()
}

fn validator() -> Validator {
    Validator::new(reference_lookup())
}

#[test]
fn registry_ids_are_unique_and_grouped() {
    let rules = all_rules();
    let mut ids: Vec<&str> = rules.iter().map(|r| r.id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), rules.len());

    assert_eq!(rules_in(RuleGroup::Structure).len(), 3);
    assert_eq!(rules_in(RuleGroup::Flowchart).len(), 6);
    assert_eq!(rules_in(RuleGroup::CrossConsistency).len(), 2);
    assert!(RuleGroup::Flowchart.needs_flowchart());
    assert!(!RuleGroup::Medication.needs_flowchart());

    let rule = get_rule("MED_DETAILS_FORMAT").unwrap();
    assert_eq!(rule.group(), RuleGroup::Medication);
    assert!(get_rule("NOT_A_RULE").is_none());
}

#[tokio::test]
async fn valid_protocol_has_no_structure_or_completeness_issues() {
    let v = validator();
    let content = valid_protocol();
    assert!(v.validate_protocol_structure(&content).await.unwrap().is_empty());
    assert!(v.validate_completeness(&content).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_key_is_reported() {
    let mut content = valid_protocol();
    let thirteen = content.remove("13").unwrap();
    content.insert_raw("bibliografia", thirteen);

    let issues = validator().validate_protocol_structure(&content).await.unwrap();
    let ids = rule_ids(&issues);
    assert!(ids.contains(&"STRUCTURE_001"));
    let malformed = issues.iter().find(|i| i.rule_id == "STRUCTURE_003").unwrap();
    assert_eq!(malformed.details, Some(json!({ "key": "bibliografia" })));
    assert_eq!(malformed.section_number, None);
}

#[tokio::test]
async fn key_and_internal_number_must_agree() {
    let mut content = valid_protocol();
    let five = content.remove("5").unwrap();
    content.insert_raw("5", ProtocolSection { section_number: Some(6), ..five });

    let issues = validator().validate_protocol_structure(&content).await.unwrap();
    let mismatch: Vec<_> = issues.iter().filter(|i| i.rule_id == "STRUCTURE_003").collect();
    assert_eq!(mismatch.len(), 1);
    assert_eq!(mismatch[0].section_number, Some(5));
}

#[tokio::test]
async fn repeated_number_breaks_the_sequence() {
    let mut content = valid_protocol();
    content.remove("13").unwrap();
    let one = content.get("1").unwrap().clone();
    content.insert_raw("01", one);

    let issues = validator().validate_protocol_structure(&content).await.unwrap();
    assert_eq!(rule_ids(&issues), ["STRUCTURE_002"]);
}

#[tokio::test]
async fn blank_title_and_wrong_shape_are_errors() {
    let mut content = valid_protocol();
    content.section_mut(2).unwrap().title = "   ".to_string();
    content.section_mut(8).unwrap().content = json!({ "exames": [] });
    content.section_mut(13).unwrap().content = json!(["Ministério da Saúde, 2026"]);

    let issues = validator().validate_protocol_structure(&content).await.unwrap();
    assert_eq!(rule_ids(&issues), ["STRUCTURE_004", "STRUCTURE_005B", "STRUCTURE_005A"]);
    assert!(issues.iter().all(|i| i.severity == Severity::Error));
    assert_eq!(issues[0].field.as_deref(), Some("title"));
}

#[tokio::test]
async fn empty_sections_and_missing_identification_fields() {
    let mut content = valid_protocol();
    content.section_mut(3).unwrap().content = json!("   ");
    content.section_mut(1).unwrap().content = json!({ "codigoProtocolo": "X", "versao": "" });

    let issues = validator().validate_completeness(&content).await.unwrap();
    let empty: Vec<_> = issues.iter().filter(|i| i.rule_id == "COMPLETENESS_001").collect();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0].section_number, Some(3));

    let missing: Vec<&str> = issues
        .iter()
        .filter(|i| i.rule_id == "COMPLETENESS_002")
        .filter_map(|i| i.field.as_deref())
        .collect();
    assert_eq!(missing.len(), 7);
    assert!(missing.contains(&"versao"));
    assert!(!missing.contains(&"codigoProtocolo"));
}

#[tokio::test]
async fn array_section_1_cannot_be_checked_field_by_field() {
    let mut content = valid_protocol();
    content.section_mut(1).unwrap().content = json!(["PROT-001"]);

    let issues = validator().validate_completeness(&content).await.unwrap();
    assert_eq!(rule_ids(&issues), ["COMPLETENESS_002_FORMAT"]);
}

#[tokio::test]
async fn missing_dose_is_an_error() {
    let mut content = valid_protocol();
    content.section_mut(7).unwrap().content = json!({
        "tratamentoPacientesInstaveis": {
            "medicamentos": [{ "name": "Dipirona", "dose": "", "route": "IV", "frequency": "6/6h" }]
        }
    });

    let issues = validator().validate_medications(&content).await.unwrap();
    assert_eq!(issues.len(), 1);
    let issue = &issues[0];
    assert_eq!(issue.rule_id, "MEDICATION_002");
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.section_number, Some(7));
    assert_eq!(issue.field.as_deref(), Some("medicamentos (Dipirona - dose)"));
}

#[tokio::test]
async fn unknown_medication_is_a_warning() {
    let mut content = valid_protocol();
    content.section_mut(7).unwrap().content = json!({
        "tratamentoPacientesEstaveis": {
            "medicamentosConsiderar": [{ "name": "Xyzolol", "dose": "5mg", "route": "VO", "frequency": "1x/dia" }]
        }
    });

    let issues = validator().validate_medications(&content).await.unwrap();
    assert_eq!(rule_ids(&issues), ["MEDICATION_001"]);
    assert_eq!(issues[0].severity, Severity::Warning);
    assert_eq!(issues[0].details, Some(json!({ "medicationName": "Xyzolol" })));
}

#[tokio::test]
async fn lookup_failure_degrades_to_no_issue() {
    let v = Validator::new(Arc::new(UnavailableLookup));
    let issues = v.validate_medications(&valid_protocol()).await.unwrap();
    assert!(issues.is_empty());
}

#[tokio::test]
async fn dosage_without_context_or_precautions() {
    let mut content = valid_protocol();
    content.section_mut(6).unwrap().content = json!("Dipirona 1 g BID.");

    let issues = validator().validate_medical_content(&content).await.unwrap();
    let ids = rule_ids(&issues);
    assert!(ids.contains(&"MEDICAL_001"));
    assert!(ids.contains(&"MEDICAL_002"));
    assert!(issues.iter().all(|i| i.suggestion.is_some()));
}

#[tokio::test]
async fn invasive_procedure_needs_sterile_technique() {
    let mut content = valid_protocol();
    content.section_mut(6).unwrap().content = json!("Realizar punção lombar.");

    let issues = validator().validate_medical_content(&content).await.unwrap();
    let sterile = issues.iter().find(|i| i.rule_id == "MEDICAL_003").unwrap();
    assert_eq!(sterile.severity, Severity::Error);
    let consent = issues.iter().find(|i| i.rule_id == "MEDICAL_004").unwrap();
    assert_eq!(consent.severity, Severity::Warning);

    content.section_mut(6).unwrap().content =
        json!("Realizar punção lombar com técnica estéril após consentimento do paciente.");
    let issues = validator().validate_medical_content(&content).await.unwrap();
    let ids = rule_ids(&issues);
    assert!(!ids.contains(&"MEDICAL_003"));
    assert!(!ids.contains(&"MEDICAL_004"));
}

#[tokio::test]
async fn monitoring_section_rules() {
    let mut content = valid_protocol();
    content.section_mut(9).unwrap().content = json!("Observar evolução.");
    let issues = validator().validate_medical_content(&content).await.unwrap();
    let ids = rule_ids(&issues);
    assert!(ids.contains(&"MEDICAL_006"));
    assert!(ids.contains(&"MEDICAL_007"));

    content.section_mut(9).unwrap().content = json!("");
    let issues = validator().validate_medical_content(&content).await.unwrap();
    assert!(rule_ids(&issues).contains(&"MEDICAL_005"));
}

async fn evidence_issues(content: &ProtocolFullContent) -> Vec<ValidationIssue> {
    let config = ValidationConfig::default();
    let normalizer = KeywordNormalizer::default();
    let extractor = PatternDecisionExtractor::default();
    let lookup = reference_lookup();
    let ctx = RuleContext {
        content,
        flowchart: None,
        config: &config,
        normalizer: &normalizer,
        extractor: &extractor,
        medications: lookup.as_ref(),
        checked_at: checked_at(),
    };
    EvidenceBase.check(&ctx).await.unwrap()
}

#[tokio::test]
async fn bibliography_needs_authorities_and_recent_years() {
    let mut content = valid_protocol();
    content.section_mut(13).unwrap().content = json!({ "referencias": ["Livro texto de clínica, 1998."] });

    let issues = evidence_issues(&content).await;
    assert_eq!(rule_ids(&issues), ["MEDICAL_009", "MEDICAL_010"]);
    assert!(issues.iter().all(|i| i.category == IssueCategory::ContentSpecific));

    content.section_mut(13).unwrap().content = json!({ "referencias": ["AHA Guidelines, 2022."] });
    assert!(evidence_issues(&content).await.is_empty());
}

#[tokio::test]
async fn references_older_than_the_window_are_not_recent() {
    let mut content = valid_protocol();
    content.section_mut(13).unwrap().content = json!({ "referencias": ["Cochrane review, 2021."] });
    assert_eq!(rule_ids(&evidence_issues(&content).await), ["MEDICAL_010"]);
}

fn broken_flowchart() -> Flowchart {
    serde_json::from_value(json!({
        "nodes": [
            { "id": "start", "type": "start", "position": { "x": 0, "y": 0 }, "data": { "title": "Início" } },
            { "id": "a1", "type": "action", "position": { "x": 0, "y": 100 }, "data": { "title": "", "actions": [] } },
            { "id": "a1", "type": "action", "position": { "x": 0, "y": 200 }, "data": { "title": "Duplicado" } },
            {
                "id": "m1", "type": "medication", "position": { "x": 0, "y": 300 },
                "data": { "title": "Solta", "medications": [{ "name": "Dipirona", "dose": "1g" }] }
            }
        ],
        "edges": [
            { "id": "e1", "source": "start", "target": "a1" },
            { "id": "e2", "source": "a1", "target": "a1" },
            { "id": "e3", "source": "a1", "target": "ghost" }
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn flowchart_internal_problems() {
    let issues = validator()
        .validate_flowchart(&valid_protocol(), &broken_flowchart())
        .await
        .unwrap();
    let ids = rule_ids(&issues);

    let orphan = issues.iter().find(|i| i.rule_id == "FLOWCHART_ORPHAN_NODE").unwrap();
    assert_eq!(orphan.details.as_ref().unwrap()["nodeId"], "m1");
    assert!(ids.contains(&"FLOWCHART_SELF_LOOP"));
    let dangling = issues.iter().find(|i| i.rule_id == "FLOWCHART_DANGLING_EDGE").unwrap();
    assert_eq!(dangling.details.as_ref().unwrap()["nodeId"], "ghost");
    assert!(ids.contains(&"FLOWCHART_DUPLICATE_NODE_ID"));
    assert!(ids.contains(&"FLOWCHART_NODE_TITLE_MISSING"));
    let incomplete = issues.iter().find(|i| i.rule_id == "FLOWCHART_MEDICATION_INCOMPLETE").unwrap();
    assert_eq!(incomplete.details.as_ref().unwrap()["missingFields"], json!(["via", "frequência"]));
    assert!(issues.iter().all(|i| i.category == IssueCategory::FlowchartConsistency));
}

#[tokio::test]
async fn null_medication_fields_count_as_missing() {
    let chart: Flowchart = serde_json::from_value(json!({
        "nodes": [{
            "id": "m1",
            "type": "medication",
            "position": {"x": 0, "y": 0},
            "data": {
                "title": "Analgesia",
                "medications": [{"name": "Dipirona", "dose": "1g", "route": null, "frequency": "6/6h"}]
            }
        }],
        "edges": []
    }))
    .unwrap();

    let issues = validator().validate_flowchart(&valid_protocol(), &chart).await.unwrap();
    assert_eq!(rule_ids(&issues), ["FLOWCHART_MEDICATION_INCOMPLETE"]);
    let details = issues[0].details.as_ref().unwrap();
    assert_eq!(details["medicationName"], "Dipirona");
    assert_eq!(details["missingFields"], json!(["via"]));
}

#[tokio::test]
async fn matching_flowchart_is_internally_consistent() {
    let issues = validator()
        .validate_flowchart(&valid_protocol(), &common::matching_flowchart())
        .await
        .unwrap();
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn sections_helper_builds_numbered_sections() {
    let s = section(4, json!("x"));
    assert_eq!(s.section_number, Some(4));
    assert!(!s.title.is_empty());
}
