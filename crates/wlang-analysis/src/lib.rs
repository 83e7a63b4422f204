pub mod cfg;
pub mod threshold;
pub mod worklist;

pub use cfg::{Cfg, CfgNode, CfgNodeData, Command};
pub use worklist::{analyze, AnalysisOptions, StateVector};
