//! medproto-flowchart
//!
//! Operations over the two flowchart schemas: lossy conversion in both
//! directions, a structural guard for untyped clinical JSON, node removal
//! with edge pruning, and the export wrapper.

pub mod any;
pub mod convert;
pub mod error;
pub mod export;
pub mod graph;
pub mod guard;

pub use any::AnyFlowchart;
pub use convert::{clinical_to_standard, standard_to_clinical};
pub use export::{create_flowchart_export, FlowchartExport, FlowchartFormat, ProtocolInfo};
pub use graph::GraphEdit;
pub use guard::is_valid_clinical_flowchart;
