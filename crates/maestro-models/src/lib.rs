//! Maestro data model - strategies, logic trees and workflow state
//!
//! This crate holds the plain-data types shared by the agent runtime and the
//! workflow engine:
//! - `Strategy` and its classification enums
//! - `LogicTree` allocation sum type
//! - `EdgeScorecard`, `SelectionReasoning`, `Charter`
//! - `ContextPack` (read-only workflow input)
//! - `WorkflowStage` and `WorkflowCheckpoint`

pub mod charter;
pub mod checkpoint;
pub mod context;
pub mod logic_tree;
pub mod scorecard;
pub mod strategy;

pub use charter::Charter;
pub use checkpoint::{WorkflowCheckpoint, WorkflowStage};
pub use context::ContextPack;
pub use logic_tree::{FilterSpec, LogicTree, SelectSide, SortBy, WeightingMethod, WeightingSpec};
pub use scorecard::{EdgeScorecard, RejectedAlternative, SelectionReasoning};
pub use strategy::{Archetype, ConcentrationIntent, EdgeType, RebalanceFrequency, Strategy};
