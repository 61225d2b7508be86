use medproto_core::error::CoreError;
use medproto_core::models::clinical::{ClinicalFlowchart, ClinicalNodeKind, SelectMode, Visibility};
use medproto_core::models::flowchart::{EdgeType, Flowchart, NodeKind};
use serde_json::json;

#[test]
fn standard_nodes_decode_by_type() {
    let chart = Flowchart::from_json(
        &json!({
            "nodes": [
                {"id": "s", "type": "start", "position": {"x": 0, "y": 0}, "data": {"title": "Início"}},
                {"id": "d", "type": "decision", "position": {"x": 0, "y": 100},
                 "data": {"title": "Hipotensão?", "criteria": "PAS < 90mmHg"}},
                {"id": "m", "type": "medication", "position": {"x": 0, "y": 200},
                 "data": {"title": "Drogas", "medications": [
                     {"name": "Adrenalina", "dose": "1mg", "route": "IV", "frequency": "STAT"}
                 ]}},
                {"id": "e", "type": "end", "position": {"x": 0, "y": 300}}
            ],
            "edges": [
                {"id": "e1", "source": "s", "target": "d"},
                {"id": "e2", "source": "d", "target": "m", "label": "Sim", "sourceHandle": "yes", "type": "conditional"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    assert!(chart.nodes[0].is_start());
    assert!(chart.nodes[3].is_end());
    assert_eq!(chart.nodes[3].title(), "");

    let decisions: Vec<_> = chart.decision_nodes().collect();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].1.criteria, "PAS < 90mmHg");

    let meds: Vec<_> = chart.medication_nodes().collect();
    assert_eq!(meds[0].1.medications[0].name, "Adrenalina");
    assert_eq!(meds[0].1.medications[0].duration, None);

    assert_eq!(chart.edges[1].label.as_deref(), Some("Sim"));
    assert_eq!(chart.edges[1].source_handle.as_deref(), Some("yes"));
    assert_eq!(chart.edges[1].edge_type, Some(EdgeType::Conditional));
}

#[test]
fn unknown_standard_node_type_is_preserved() {
    let chart = Flowchart::from_json(
        r#"{"nodes":[{"id":"x","type":"note","position":{"x":1,"y":2},"data":{"title":"Nota","color":"red"}}],"edges":[]}"#,
    )
    .unwrap();

    match &chart.nodes[0].kind {
        NodeKind::Unknown { node_type, data } => {
            assert_eq!(node_type, "note");
            assert_eq!(data["color"], "red");
        }
        other => panic!("expected unknown node, got {other:?}"),
    }
    assert_eq!(chart.nodes[0].title(), "Nota");

    let value = serde_json::to_value(&chart.nodes[0]).unwrap();
    assert_eq!(value["type"], "note");
    assert_eq!(value["data"]["color"], "red");
}

#[test]
fn invalid_payload_for_known_type_is_an_error() {
    let err = Flowchart::from_json(
        r#"{"nodes":[{"id":"d","type":"decision","position":{"x":0,"y":0},"data":{"criteria":42}}],"edges":[]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::Serialization(_)));
    assert!(err.to_string().contains("'d'"));
}

#[test]
fn null_payload_fields_decode_as_empty() {
    let chart = Flowchart::from_json(
        r#"{"nodes":[
            {"id":"d","type":"decision","position":{"x":0,"y":0},"data":{"title":null,"criteria":null,"outputs":null}},
            {"id":"a","type":"action","position":{"x":0,"y":0},"data":{"title":"Acesso","actions":null}},
            {"id":"m","type":"medication","position":{"x":0,"y":0},
             "data":{"title":"Analgesia","medications":[{"name":"Dipirona","dose":null,"route":null,"frequency":null}]}}
        ],"edges":[]}"#,
    )
    .unwrap();

    let decision = chart.nodes[0].as_decision().unwrap();
    assert!(decision.title.is_empty() && decision.criteria.is_empty() && decision.outputs.is_empty());
    assert!(matches!(&chart.nodes[1].kind, NodeKind::Action(d) if d.actions.is_empty()));
    let med = &chart.nodes[2].as_medication().unwrap().medications[0];
    assert_eq!(med.name, "Dipirona");
    assert!(med.dose.is_empty() && med.route.is_empty() && med.frequency.is_empty());
}

#[test]
fn standard_node_serializes_with_type_discriminant() {
    let chart = Flowchart::from_json(
        r#"{"nodes":[{"id":"a","type":"action","position":{"x":5,"y":6},"data":{"title":"Hidratar","actions":["SF 0,9%"]}}],"edges":[]}"#,
    )
    .unwrap();

    let value = serde_json::to_value(&chart.nodes[0]).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "a",
            "type": "action",
            "position": {"x": 5.0, "y": 6.0},
            "data": {"title": "Hidratar", "actions": ["SF 0,9%"]}
        })
    );
}

#[test]
fn clinical_nodes_decode_with_defaults() {
    let chart = ClinicalFlowchart::from_json(
        &json!({
            "nodes": [
                {"id": "q", "type": "custom", "position": {"x": 0, "y": 0},
                 "data": {"label": "Triagem", "descricao": "Avaliar sinais", "questions": [
                     {"id": "Q1", "titulo": "Dor torácica?", "options": [{"id": "o1", "label": "Sim"}]}
                 ]}},
                {"id": "c", "type": "conduct", "position": {"x": 0, "y": 100},
                 "data": {"label": "Tratar", "condutaDataNode": {
                     "medicamento": [{"id": "M1", "nomeMed": "AAS", "condicionalMedicamento": "domiciliar"}]
                 }}},
                {"id": "z", "type": "group", "position": {"x": 0, "y": 0}, "data": {}}
            ],
            "edges": [{"id": "e", "source": "q", "target": "c", "data": {"rule": "Sim"}}]
        })
        .to_string(),
    )
    .unwrap();

    let ClinicalNodeKind::Custom(custom) = &chart.nodes[0].kind else {
        panic!("expected custom node");
    };
    assert_eq!(custom.condicional, Visibility::Visivel);
    assert_eq!(custom.questions[0].select, SelectMode::Single);
    assert!(!custom.questions[0].options[0].preselected);

    let ClinicalNodeKind::Conduct(conduct) = &chart.nodes[1].kind else {
        panic!("expected conduct node");
    };
    let data = conduct.conduta_data_node.as_ref().unwrap();
    assert_eq!(data.medicamento[0].nome_med, "AAS");
    assert!(data.exame.is_empty());

    assert_eq!(chart.nodes[2].kind.type_name(), "group");
    assert_eq!(chart.edges[0].rule(), Some("Sim"));
    assert_eq!(chart.node("c").unwrap().kind.label(), Some("Tratar"));
}
