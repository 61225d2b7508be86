//! Clinical safety heuristics over the section text.

use std::sync::LazyLock;

use jiff::tz::TimeZone;
use regex::Regex;

use medproto_core::json::is_truthy;
use medproto_core::models::protocol::ProtocolFullContent;
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};

use super::{Rule, RuleContext, RuleGroup, RuleResult};
use crate::BoxFuture;

/// Sections that usually carry dosages.
const DOSAGE_SECTIONS: [u32; 4] = [6, 7, 8, 9];
const PROCEDURE_SECTION: u32 = 6;
const MONITORING_SECTION: u32 = 9;
const BIBLIOGRAPHY_SECTION: u32 = 13;

static WEIGHT_BASED_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(mg|mcg|g|units?)/kg").expect("dose pattern is valid")
});

static FREQUENCY_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(mg|mcg|g|units?)\s*(/day|daily|BID|TID|QID|Q\d+h)")
        .expect("dose pattern is valid")
});

static RANGE_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)\s*(mg|mcg|g|units?)(?:/kg)?")
        .expect("dose pattern is valid")
});

static AGE_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(idade|anos?|criança|adulto|idoso|pediátrico|geriátrico)\b")
        .expect("age pattern is valid")
});

static WEIGHT_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(peso|kg|quilos?)\b").expect("weight pattern is valid"));

static STERILE_TECHNIQUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(estéril|esterilização|assepsia|antissepsia|luvas estéreis)\b")
        .expect("sterile pattern is valid")
});

static CONSENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(consentimento|autorização|explicar|orientar)\b").expect("consent pattern is valid")
});

static TIME_INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+\s*(min|hora|h|dia|semana)|\da\d|cada|intervalo)\b")
        .expect("interval pattern is valid")
});

const CRITICAL_TERMS: [&str; 11] = [
    "contraindicação",
    "contraindicado",
    "alergia",
    "anafilaxia",
    "emergência",
    "urgência",
    "dose letal",
    "overdose",
    "intoxicação",
    "reação adversa",
    "efeito colateral",
];

const INVASIVE_PROCEDURES: [&str; 9] = [
    "intubação",
    "punção",
    "inserção",
    "cateter",
    "agulha",
    "cirúrgico",
    "incisão",
    "biópsia",
    "drenagem",
];

const VITAL_SIGNS: [&str; 7] = [
    "pressão arterial",
    "pa",
    "fc",
    "frequência cardíaca",
    "spo2",
    "saturação",
    "temperatura",
];

const RECOGNIZED_AUTHORITIES: [&str; 12] = [
    "sociedade brasileira",
    "ministério da saúde",
    "anvisa",
    "cfm",
    "american heart association",
    "aha",
    "european society",
    "cochrane",
    "pubmed",
    "nejm",
    "jama",
    "bmj",
];

/// Searchable text of a section whose content is truthy.
fn section_text(content: &ProtocolFullContent, number: u32) -> Option<String> {
    let section = content.section(number)?;
    if !is_truthy(&section.content) {
        return None;
    }
    Some(section.content_text().into_owned())
}

fn mentions_any(text: &str, terms: &[&str]) -> bool {
    let lower = text.to_lowercase();
    terms.iter().any(|term| lower.contains(term))
}

/// Sections with dosages mention patient context and precautions.
pub struct DosageSafety;

impl Rule for DosageSafety {
    fn id(&self) -> &'static str {
        "MEDICAL_DOSAGE_SAFETY"
    }

    fn description(&self) -> &'static str {
        "Validates medication dosages include proper safety considerations."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Medication
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::MedicalContent
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let mut issues = Vec::new();
            for number in DOSAGE_SECTIONS {
                let Some(text) = section_text(ctx.content, number) else {
                    continue;
                };
                let has_dosage = WEIGHT_BASED_DOSE.is_match(&text)
                    || FREQUENCY_DOSE.is_match(&text)
                    || RANGE_DOSE.is_match(&text);
                if !has_dosage {
                    continue;
                }

                if !AGE_CONTEXT.is_match(&text) && !WEIGHT_CONTEXT.is_match(&text) {
                    issues.push(
                        ValidationIssue::warning(
                            "MEDICAL_001",
                            IssueCategory::Medication,
                            format!("Seção {number} contém dosagens mas não especifica considerações de idade ou peso."),
                        )
                        .with_section(number)
                        .with_suggestion("Adicione considerações específicas para diferentes faixas etárias e pesos."),
                    );
                }

                if !mentions_any(&text, &CRITICAL_TERMS) {
                    issues.push(
                        ValidationIssue::warning(
                            "MEDICAL_002",
                            IssueCategory::Medication,
                            format!("Seção {number} menciona medicações mas não inclui contraindicações ou precauções."),
                        )
                        .with_section(number)
                        .with_suggestion("Inclua informações sobre contraindicações, alergias e precauções importantes."),
                    );
                }
            }
            Ok(issues)
        })
    }
}

/// Invasive procedures mention sterile technique and patient consent.
pub struct ProcedureSafety;

impl Rule for ProcedureSafety {
    fn id(&self) -> &'static str {
        "MEDICAL_PROCEDURE_SAFETY"
    }

    fn description(&self) -> &'static str {
        "Ensures invasive procedures include safety protocols."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Medication
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::MedicalContent
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let mut issues = Vec::new();
            let Some(text) = section_text(ctx.content, PROCEDURE_SECTION) else {
                return Ok(issues);
            };
            if !mentions_any(&text, &INVASIVE_PROCEDURES) {
                return Ok(issues);
            }

            if !STERILE_TECHNIQUE.is_match(&text) {
                issues.push(
                    ValidationIssue::error(
                        "MEDICAL_003",
                        IssueCategory::Medication,
                        "Procedimento invasivo identificado sem menção de técnica estéril ou medidas de assepsia.",
                    )
                    .with_section(PROCEDURE_SECTION)
                    .with_suggestion(
                        "Inclua informações sobre técnica estéril, preparo do local e medidas de controle de infecção.",
                    ),
                );
            }

            if !CONSENT.is_match(&text) {
                issues.push(
                    ValidationIssue::warning(
                        "MEDICAL_004",
                        IssueCategory::ContentSpecific,
                        "Procedimento invasivo sem menção de consentimento informado ou orientação ao paciente.",
                    )
                    .with_section(PROCEDURE_SECTION)
                    .with_suggestion("Inclua orientações sobre consentimento informado e comunicação com o paciente."),
                );
            }
            Ok(issues)
        })
    }
}

/// Section 9 defines vital signs and reassessment intervals.
pub struct MonitoringRequirements;

impl Rule for MonitoringRequirements {
    fn id(&self) -> &'static str {
        "MEDICAL_MONITORING_REQUIREMENTS"
    }

    fn description(&self) -> &'static str {
        "Validates comprehensive monitoring guidelines."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Completeness
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::MedicalContent
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let Some(text) = section_text(ctx.content, MONITORING_SECTION) else {
                return Ok(vec![
                    ValidationIssue::error(
                        "MEDICAL_005",
                        IssueCategory::Completeness,
                        "Seção de Monitorização está vazia. Todo protocolo médico deve incluir diretrizes de monitoramento.",
                    )
                    .with_section(MONITORING_SECTION)
                    .with_suggestion(
                        "Adicione sinais vitais, exames laboratoriais e parâmetros de acompanhamento específicos.",
                    ),
                ]);
            };

            let mut issues = Vec::new();
            if !mentions_any(&text, &VITAL_SIGNS) {
                issues.push(
                    ValidationIssue::warning(
                        "MEDICAL_006",
                        IssueCategory::Completeness,
                        "Seção de Monitorização não menciona sinais vitais básicos.",
                    )
                    .with_section(MONITORING_SECTION)
                    .with_suggestion("Inclua monitoramento de sinais vitais (PA, FC, SpO2, Temperatura)."),
                );
            }
            if !TIME_INTERVAL.is_match(&text) {
                issues.push(
                    ValidationIssue::warning(
                        "MEDICAL_007",
                        IssueCategory::Completeness,
                        "Seção de Monitorização não especifica intervalos de tempo para avaliações.",
                    )
                    .with_section(MONITORING_SECTION)
                    .with_suggestion("Defina intervalos específicos para reavaliação (ex: a cada 15 min, de 6/6h)."),
                );
            }
            Ok(issues)
        })
    }
}

/// The bibliography cites recognized authorities and recent work.
pub struct EvidenceBase;

impl Rule for EvidenceBase {
    fn id(&self) -> &'static str {
        "MEDICAL_EVIDENCE_BASE"
    }

    fn description(&self) -> &'static str {
        "Ensures protocol is based on current medical evidence."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::ContentSpecific
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::MedicalContent
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let Some(text) = section_text(ctx.content, BIBLIOGRAPHY_SECTION) else {
                return Ok(vec![
                    ValidationIssue::error(
                        "MEDICAL_008",
                        IssueCategory::ContentSpecific,
                        "Bibliografia ausente. Protocolos médicos devem ser baseados em evidências científicas.",
                    )
                    .with_section(BIBLIOGRAPHY_SECTION)
                    .with_suggestion(
                        "Inclua referências de diretrizes nacionais/internacionais, estudos clínicos e literatura científica.",
                    ),
                ]);
            };

            let mut issues = Vec::new();
            if !mentions_any(&text, &RECOGNIZED_AUTHORITIES) {
                issues.push(
                    ValidationIssue::warning(
                        "MEDICAL_009",
                        IssueCategory::ContentSpecific,
                        "Bibliografia não inclui referências de organizações médicas reconhecidas.",
                    )
                    .with_section(BIBLIOGRAPHY_SECTION)
                    .with_suggestion(
                        "Inclua referências de sociedades médicas, órgãos reguladores ou periódicos de alto impacto.",
                    ),
                );
            }

            let window = ctx.config.recent_reference_years;
            let current_year = i32::from(ctx.checked_at.to_zoned(TimeZone::UTC).year());
            let has_recent = (0..window)
                .filter_map(|back| i32::try_from(back).ok())
                .any(|back| text.contains(&(current_year - back).to_string()));
            if !has_recent {
                issues.push(
                    ValidationIssue::warning(
                        "MEDICAL_010",
                        IssueCategory::ContentSpecific,
                        format!("Bibliografia não inclui referências recentes (últimos {window} anos)."),
                    )
                    .with_section(BIBLIOGRAPHY_SECTION)
                    .with_suggestion(
                        "Inclua referências atualizadas para garantir que o protocolo reflita as melhores práticas atuais.",
                    ),
                );
            }
            Ok(issues)
        })
    }
}
