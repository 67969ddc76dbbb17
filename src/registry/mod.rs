//! Module registry
//!
//! Process-wide map from module id to the last state each module announced.
//! The registry is created once by the server and shared with every handler
//! through `Arc`; tests build a fresh one per case.

pub mod models;
pub mod store;

pub use models::{
    InfoUpdate, Module, ModuleId, ModuleStats, ModuleSummary, PinDescriptor, StatsUpdate,
};
pub use store::ModuleRegistry;
