//! # panel-types
//!
//! Shared type definitions for the front-panel workspace: the
//! rack/module/page/parameter snapshots the panel reads, the hardware and
//! model events it reacts to, and the `RackModel` collaborator trait.

mod entity;
mod event;
pub mod memory;
mod model;

pub use entity::{Module, ModuleTemplate, Page, ParamKind, ParamValue, Parameter, Preset, Rack};
pub use event::{HardwareEvent, ModelEvent};
pub use memory::MemoryModel;
pub use model::{ModelError, ModelResult, RackModel};

/// Identifier of a rack, module, page or parameter.
pub type EntityId = String;

/// Resource kind under which installed module types are listed.
pub const MODULE_RESOURCE: &str = "module";

/// Where a model change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChangeSource {
    /// A control on this panel (pots, menus).
    Local,
    /// A preset being applied.
    Preset,
    /// An incoming MIDI CC mapped to a parameter.
    Midi,
    /// Any other remote client of the model.
    Remote,
}

impl std::fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeSource::Local => "local",
            ChangeSource::Preset => "preset",
            ChangeSource::Midi => "midi",
            ChangeSource::Remote => "remote",
        };
        f.write_str(name)
    }
}
