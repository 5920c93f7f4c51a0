use crate::{ChangeSource, EntityId, ModelEvent, Module, Page, ParamValue, Parameter, Rack};

pub type ModelResult<T = ()> = Result<T, ModelError>;

/// A lookup that missed while mutating the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownRack(EntityId),
    UnknownModule(EntityId),
    UnknownParam(EntityId),
    UnknownPreset(String),
    UnknownModuleType(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRack(id) => write!(f, "unknown rack {}", id),
            Self::UnknownModule(id) => write!(f, "unknown module {}", id),
            Self::UnknownParam(id) => write!(f, "unknown parameter {}", id),
            Self::UnknownPreset(name) => write!(f, "unknown preset {:?}", name),
            Self::UnknownModuleType(name) => write!(f, "unknown module type {:?}", name),
        }
    }
}

impl std::error::Error for ModelError {}

/// The rack/module/parameter model the panel edits.
///
/// Reads are snapshots valid for the current event. Writes are best-effort:
/// a miss returns an error and leaves the model untouched. Every change the
/// model makes is reported back through [`RackModel::take_events`].
pub trait RackModel {
    fn rack(&self, rack_id: &str) -> Option<&Rack>;

    fn module(&self, rack_id: &str, module_id: &str) -> Option<&Module> {
        self.rack(rack_id).and_then(|r| r.module(module_id))
    }

    fn modules(&self, rack_id: &str) -> Vec<&Module> {
        self.rack(rack_id)
            .map(|r| r.modules.iter().collect())
            .unwrap_or_default()
    }

    fn pages(&self, rack_id: &str, module_id: &str) -> Vec<&Page> {
        self.module(rack_id, module_id)
            .map(|m| m.pages.iter().collect())
            .unwrap_or_default()
    }

    fn page(&self, rack_id: &str, module_id: &str, page_id: &str) -> Option<&Page> {
        self.module(rack_id, module_id).and_then(|m| m.page(page_id))
    }

    /// Parameters of a page in pot order. Ids the module does not know are skipped.
    fn page_params(&self, rack_id: &str, module_id: &str, page_id: &str) -> Vec<&Parameter> {
        let Some(module) = self.module(rack_id, module_id) else {
            return Vec::new();
        };
        let Some(page) = module.page(page_id) else {
            return Vec::new();
        };
        page.params.iter().filter_map(|id| module.param(id)).collect()
    }

    fn param(&self, rack_id: &str, module_id: &str, param_id: &str) -> Option<&Parameter> {
        self.module(rack_id, module_id).and_then(|m| m.param(param_id))
    }

    fn presets(&self, rack_id: &str) -> Vec<String> {
        self.rack(rack_id)
            .map(|r| r.presets.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn current_preset(&self, rack_id: &str) -> Option<String> {
        self.rack(rack_id).and_then(|r| r.current_preset.clone())
    }

    /// Names of installed resources of `kind` (e.g. module types).
    fn resources(&self, rack_id: &str, kind: &str) -> Vec<String>;

    fn change_param(
        &mut self,
        source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        param_id: &str,
        value: ParamValue,
    ) -> ModelResult;

    fn load_module(
        &mut self,
        source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        module_type: &str,
    ) -> ModelResult;

    fn set_active_module(&mut self, source: ChangeSource, rack_id: &str, module_id: &str) -> ModelResult;

    fn add_midi_mapping(&mut self, rack_id: &str, cc: u8, module_id: &str, param_id: &str) -> ModelResult;

    fn remove_midi_mapping(&mut self, rack_id: &str, cc: u8, module_id: &str, param_id: &str) -> ModelResult;

    /// Apply a CC value (0..=127) to every parameter mapped to `cc`.
    fn apply_midi_cc(&mut self, rack_id: &str, cc: u8, value: u8) -> ModelResult;

    fn apply_preset(&mut self, rack_id: &str, name: &str) -> ModelResult;

    /// Store the current values under `name`, creating the preset if needed.
    fn update_preset(&mut self, rack_id: &str, name: &str) -> ModelResult;

    fn save_settings(&mut self, rack_id: &str) -> ModelResult;

    /// Drain notifications produced since the last call.
    fn take_events(&mut self) -> Vec<ModelEvent>;
}
