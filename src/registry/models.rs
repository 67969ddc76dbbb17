use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier a module assigns to itself.
pub type ModuleId = i64;

/// Descriptor of one input/output pin of a module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDescriptor {
    #[serde(rename = "type")]
    pub pin_type: String,
    pub direction: i32,
    pub frame_size: i64,
}

/// Last-known runtime statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    pub fps: f64,
    pub frame_count: i64,
    pub cpu_user: i64,
    pub cpu_kernel: i64,
    pub memory: i64,
}

/// A tracked media-processing module
///
/// `Default` is the zero-initialized state a module is in between its first
/// appearance and the first update applied to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    pub control_port: u16,
    pub ip: String,
    pub start_time: i64,
    /// Epoch milliseconds of the latest info or stats update
    pub last_seen: i64,
    pub pins: BTreeMap<u32, PinDescriptor>,
    pub stats: ModuleStats,
}

impl Module {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Address of the command endpoint, once the module has announced one
    pub fn control_endpoint(&self) -> Option<(&str, u16)> {
        if self.ip.is_empty() || self.control_port == 0 {
            None
        } else {
            Some((self.ip.as_str(), self.control_port))
        }
    }

    pub fn summary(&self) -> ModuleSummary {
        ModuleSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Entry of the module list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub name: String,
}

/// Identity/configuration announcement of a module
#[derive(Debug, Clone, PartialEq)]
pub struct InfoUpdate {
    pub id: ModuleId,
    pub name: String,
    /// `None` keeps whatever thumbnail the module already had
    pub thumbnail_url: Option<String>,
    pub control_port: u16,
    pub start_time: i64,
    pub pin_index: u32,
    pub pin: PinDescriptor,
    pub ip: String,
}

/// Runtime statistics announcement of a module
#[derive(Debug, Clone, PartialEq)]
pub struct StatsUpdate {
    pub id: ModuleId,
    pub stats: ModuleStats,
}
