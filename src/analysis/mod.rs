//! Graph-derived analyses: change impact, dead-code candidates, and
//! symbol navigation.

pub mod dead_code;
pub mod impact;
pub mod navigator;

pub use dead_code::{DeadCodeDetector, DeadCodeFinding};
pub use impact::{ImpactAnalyzer, ImpactReport};
pub use navigator::{Reference, SymbolLocation, SymbolNavigator};
