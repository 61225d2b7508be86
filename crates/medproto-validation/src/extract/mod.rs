pub mod flowchart;
pub mod text;

pub use flowchart::{flowchart_decisions, flowchart_medications, FlowchartDecision, FlowchartMedicationRef};
pub use text::{
    extract_decisions_from_text, extract_medications_from_text, DecisionExtractor, PatternDecisionExtractor,
    TextualDecision, TextualMedication,
};
