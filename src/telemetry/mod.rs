//! Module telemetry: bus frame codec, thumbnail references and the relay
//! that forwards announcements to the registry.

pub mod bus;
pub mod codec;
pub mod relay;
pub mod thumbnail;

pub use codec::{Field, FieldCode, Frame, MessageKind};
pub use relay::{Relay, RelaySummary};
