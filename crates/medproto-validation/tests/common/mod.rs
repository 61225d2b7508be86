#![allow(dead_code)]

use std::sync::Arc;

use jiff::Timestamp;
use medproto_core::models::flowchart::Flowchart;
use medproto_core::models::protocol::{ProtocolFullContent, ProtocolSection};
use medproto_core::sections;
use medproto_validation::error::LookupError;
use medproto_validation::{BoxFuture, InMemoryMedicationLookup, MedicationEntry, MedicationLookup};
use serde_json::{json, Value};

pub fn checked_at() -> Timestamp {
    "2026-10-18T12:00:00Z".parse().unwrap()
}

pub fn section(number: u32, content: Value) -> ProtocolSection {
    ProtocolSection::new(number, sections::title_for(number), content)
}

/// A protocol that passes every error-severity rule.
pub fn valid_protocol() -> ProtocolFullContent {
    [
        section(
            1,
            json!({
                "codigoProtocolo": "PROT-CHOQ-001",
                "tituloCompleto": "Manejo do choque anafilático",
                "versao": "1.0",
                "origemOrganizacao": "Hospital Central",
                "dataElaboracao": "2026-01-10",
                "dataUltimaRevisao": "2026-06-01",
                "dataProximaRevisao": "2027-06-01",
                "ambitoAplicacao": "Pronto atendimento"
            }),
        ),
        section(2, json!({ "objetivoGeral": "Padronizar o atendimento inicial." })),
        section(3, json!("Anafilaxia com instabilidade hemodinâmica.")),
        section(4, json!("Pacientes adultos com hipotensão.")),
        section(5, json!("Se PAS < 90mmHg, iniciar fluidos.")),
        section(6, json!("Solicitar hemograma e lactato.")),
        section(
            7,
            json!({
                "tratamentoPacientesInstaveis": {
                    "medicamentos": [
                        { "name": "Adrenalina", "dose": "1mg", "route": "IV", "frequency": "STAT" }
                    ]
                }
            }),
        ),
        section(8, json!(["Hemograma"])),
        section(9, json!("Monitorar pressão arterial, FC e SpO2 a cada 15 min.")),
        section(10, json!("Equipe médica e enfermagem do pronto atendimento.")),
        section(11, json!({ "algoritmo": "Ver fluxograma anexo." })),
        section(12, json!({ "indicadores": ["Tempo até a primeira dose."] })),
        section(
            13,
            json!({ "referencias": ["Ministério da Saúde. Protocolo de anafilaxia. 2026."] }),
        ),
    ]
    .into_iter()
    .collect()
}

/// Start, one decision on PAS, one Adrenalina medication node, end.
pub fn matching_flowchart() -> Flowchart {
    serde_json::from_value(json!({
        "nodes": [
            { "id": "start", "type": "start", "position": { "x": 0, "y": 0 }, "data": { "title": "Início" } },
            {
                "id": "d1", "type": "decision", "position": { "x": 0, "y": 100 },
                "data": { "title": "Hipotensão?", "criteria": "PAS < 90mmHg" }
            },
            {
                "id": "m1", "type": "medication", "position": { "x": 0, "y": 200 },
                "data": {
                    "title": "Tratamento",
                    "medications": [
                        { "name": "Adrenalina", "dose": "1mg", "route": "IV", "frequency": "STAT" }
                    ]
                }
            },
            { "id": "end", "type": "end", "position": { "x": 0, "y": 300 }, "data": { "title": "Fim" } }
        ],
        "edges": [
            { "id": "e1", "source": "start", "target": "d1" },
            { "id": "e2", "source": "d1", "target": "m1", "label": "Sim" },
            { "id": "e3", "source": "m1", "target": "end" }
        ]
    }))
    .unwrap()
}

pub fn reference_lookup() -> Arc<InMemoryMedicationLookup> {
    Arc::new(InMemoryMedicationLookup::new([
        MedicationEntry::named("Adrenalina"),
        MedicationEntry::named("Dipirona"),
    ]))
}

/// Lookup whose backing store is always down.
pub struct UnavailableLookup;

impl MedicationLookup for UnavailableLookup {
    fn lookup<'a>(&'a self, _name: &'a str) -> BoxFuture<'a, Result<Option<MedicationEntry>, LookupError>> {
        Box::pin(async { Err(LookupError::Unavailable("connection refused".to_string())) })
    }
}
