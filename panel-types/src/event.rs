use crate::{ChangeSource, EntityId, Parameter};

/// Raw input from the panel hardware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HardwareEvent {
    /// Pot `index` (0..=3) moved to `raw` (0.0..=1023.0).
    Pot { index: usize, raw: f32 },
    /// Rotary encoder turned; positive is clockwise.
    Encoder { delta: i32 },
    EncoderButton { down: bool },
    Key { key: u32, down: bool },
}

/// Change notifications produced by the model collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    RackChanged {
        source: ChangeSource,
        rack_id: EntityId,
    },
    ModuleChanged {
        source: ChangeSource,
        rack_id: EntityId,
        module_id: EntityId,
        module_type: String,
    },
    PageChanged {
        source: ChangeSource,
        rack_id: EntityId,
        module_id: EntityId,
        page_id: EntityId,
    },
    /// Parameter metadata changed (not its value).
    ParamChanged {
        source: ChangeSource,
        rack_id: EntityId,
        module_id: EntityId,
        param_id: EntityId,
    },
    ParamValueChanged {
        source: ChangeSource,
        rack_id: EntityId,
        module_id: EntityId,
        param: Parameter,
    },
    ModuleLoaded {
        source: ChangeSource,
        rack_id: EntityId,
        module_id: EntityId,
        module_type: String,
    },
    ActiveModuleChanged {
        source: ChangeSource,
        rack_id: EntityId,
        module_id: EntityId,
    },
    ResourceChanged {
        source: ChangeSource,
        rack_id: EntityId,
        kind: String,
        name: String,
    },
}

impl ModelEvent {
    pub fn source(&self) -> ChangeSource {
        match self {
            ModelEvent::RackChanged { source, .. }
            | ModelEvent::ModuleChanged { source, .. }
            | ModelEvent::PageChanged { source, .. }
            | ModelEvent::ParamChanged { source, .. }
            | ModelEvent::ParamValueChanged { source, .. }
            | ModelEvent::ModuleLoaded { source, .. }
            | ModelEvent::ActiveModuleChanged { source, .. }
            | ModelEvent::ResourceChanged { source, .. } => *source,
        }
    }

    pub fn rack_id(&self) -> &str {
        match self {
            ModelEvent::RackChanged { rack_id, .. }
            | ModelEvent::ModuleChanged { rack_id, .. }
            | ModelEvent::PageChanged { rack_id, .. }
            | ModelEvent::ParamChanged { rack_id, .. }
            | ModelEvent::ParamValueChanged { rack_id, .. }
            | ModelEvent::ModuleLoaded { rack_id, .. }
            | ModelEvent::ActiveModuleChanged { rack_id, .. }
            | ModelEvent::ResourceChanged { rack_id, .. } => rack_id,
        }
    }
}
