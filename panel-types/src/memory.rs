//! In-memory model collaborator.
//!
//! Holds racks and module templates in plain collections and records a
//! [`ModelEvent`] for every change so the panel sees the same notifications
//! a remote model would send.

use std::collections::BTreeMap;

use crate::{
    ChangeSource, ModelError, ModelEvent, ModelResult, Module, ModuleTemplate, ParamValue, Rack,
    RackModel, MODULE_RESOURCE,
};

#[derive(Debug, Default)]
pub struct MemoryModel {
    racks: Vec<Rack>,
    templates: BTreeMap<String, ModuleTemplate>,
    pending: Vec<ModelEvent>,
    saves: usize,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rack(&mut self, rack: Rack) {
        let rack_id = rack.id.clone();
        for module in &rack.modules {
            self.pending.push(ModelEvent::ModuleChanged {
                source: ChangeSource::Remote,
                rack_id: rack_id.clone(),
                module_id: module.id.clone(),
                module_type: module.module_type.clone(),
            });
        }
        self.racks.retain(|r| r.id != rack_id);
        self.racks.push(rack);
        self.pending.push(ModelEvent::RackChanged {
            source: ChangeSource::Remote,
            rack_id,
        });
    }

    /// Register a module type so it can be listed and loaded.
    pub fn add_template(&mut self, template: ModuleTemplate) {
        let name = template.module_type.clone();
        self.templates.insert(name.clone(), template);
        for rack in &self.racks {
            self.pending.push(ModelEvent::ResourceChanged {
                source: ChangeSource::Remote,
                rack_id: rack.id.clone(),
                kind: MODULE_RESOURCE.to_string(),
                name: name.clone(),
            });
        }
    }

    pub fn template(&self, module_type: &str) -> Option<&ModuleTemplate> {
        self.templates.get(module_type)
    }

    pub fn rack_ids(&self) -> impl Iterator<Item = &str> {
        self.racks.iter().map(|r| r.id.as_str())
    }

    /// Number of times `save_settings` succeeded.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    fn rack_mut(&mut self, rack_id: &str) -> ModelResult<&mut Rack> {
        self.racks
            .iter_mut()
            .find(|r| r.id == rack_id)
            .ok_or_else(|| ModelError::UnknownRack(rack_id.to_string()))
    }

    fn set_value(
        &mut self,
        source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        param_id: &str,
        value: ParamValue,
    ) -> ModelResult {
        let rack = self.rack_mut(rack_id)?;
        let module = rack
            .module_mut(module_id)
            .ok_or_else(|| ModelError::UnknownModule(module_id.to_string()))?;
        let param = module
            .param_mut(param_id)
            .ok_or_else(|| ModelError::UnknownParam(param_id.to_string()))?;
        param.current = param.coerce(value);
        let param = param.clone();
        self.pending.push(ModelEvent::ParamValueChanged {
            source,
            rack_id: rack_id.to_string(),
            module_id: module_id.to_string(),
            param,
        });
        Ok(())
    }
}

impl RackModel for MemoryModel {
    fn rack(&self, rack_id: &str) -> Option<&Rack> {
        self.racks.iter().find(|r| r.id == rack_id)
    }

    fn resources(&self, rack_id: &str, kind: &str) -> Vec<String> {
        if kind != MODULE_RESOURCE || self.rack(rack_id).is_none() {
            return Vec::new();
        }
        self.templates.keys().cloned().collect()
    }

    fn change_param(
        &mut self,
        source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        param_id: &str,
        value: ParamValue,
    ) -> ModelResult {
        self.set_value(source, rack_id, module_id, param_id, value)
    }

    fn load_module(
        &mut self,
        source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        module_type: &str,
    ) -> ModelResult {
        let template = self
            .templates
            .get(module_type)
            .cloned()
            .ok_or_else(|| ModelError::UnknownModuleType(module_type.to_string()))?;
        let rack = self.rack_mut(rack_id)?;
        let module = rack
            .module_mut(module_id)
            .ok_or_else(|| ModelError::UnknownModule(module_id.to_string()))?;
        *module = Module::from_template(module_id, &module.display_name, &template);
        let page_ids: Vec<_> = module.pages.iter().map(|p| p.id.clone()).collect();

        self.pending.push(ModelEvent::ModuleLoaded {
            source,
            rack_id: rack_id.to_string(),
            module_id: module_id.to_string(),
            module_type: module_type.to_string(),
        });
        self.pending.push(ModelEvent::ModuleChanged {
            source,
            rack_id: rack_id.to_string(),
            module_id: module_id.to_string(),
            module_type: module_type.to_string(),
        });
        for page_id in page_ids {
            self.pending.push(ModelEvent::PageChanged {
                source,
                rack_id: rack_id.to_string(),
                module_id: module_id.to_string(),
                page_id,
            });
        }
        Ok(())
    }

    fn set_active_module(&mut self, source: ChangeSource, rack_id: &str, module_id: &str) -> ModelResult {
        let rack = self.rack_mut(rack_id)?;
        if rack.module(module_id).is_none() {
            return Err(ModelError::UnknownModule(module_id.to_string()));
        }
        rack.active_module = Some(module_id.to_string());
        self.pending.push(ModelEvent::ActiveModuleChanged {
            source,
            rack_id: rack_id.to_string(),
            module_id: module_id.to_string(),
        });
        Ok(())
    }

    fn add_midi_mapping(&mut self, rack_id: &str, cc: u8, module_id: &str, param_id: &str) -> ModelResult {
        let rack = self.rack_mut(rack_id)?;
        if rack.module(module_id).and_then(|m| m.param(param_id)).is_none() {
            return Err(ModelError::UnknownParam(param_id.to_string()));
        }
        let targets = rack.midi_mappings.entry(cc).or_default();
        let target = (module_id.to_string(), param_id.to_string());
        if !targets.contains(&target) {
            targets.push(target);
        }
        Ok(())
    }

    fn remove_midi_mapping(&mut self, rack_id: &str, cc: u8, module_id: &str, param_id: &str) -> ModelResult {
        let rack = self.rack_mut(rack_id)?;
        if let Some(targets) = rack.midi_mappings.get_mut(&cc) {
            targets.retain(|(m, p)| m != module_id || p != param_id);
            if targets.is_empty() {
                rack.midi_mappings.remove(&cc);
            }
        }
        Ok(())
    }

    fn apply_midi_cc(&mut self, rack_id: &str, cc: u8, value: u8) -> ModelResult {
        let rack = self
            .rack(rack_id)
            .ok_or_else(|| ModelError::UnknownRack(rack_id.to_string()))?;
        let normalized = f32::from(value.min(127)) / 127.0;
        let changes: Vec<_> = rack
            .midi_mappings
            .get(&cc)
            .into_iter()
            .flatten()
            .filter_map(|(module_id, param_id)| {
                let param = rack.module(module_id)?.param(param_id)?;
                Some((module_id.clone(), param_id.clone(), param.calc(normalized)))
            })
            .collect();
        for (module_id, param_id, value) in changes {
            self.set_value(ChangeSource::Midi, rack_id, &module_id, &param_id, value)?;
        }
        Ok(())
    }

    fn apply_preset(&mut self, rack_id: &str, name: &str) -> ModelResult {
        let rack = self.rack_mut(rack_id)?;
        let preset = rack
            .presets
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownPreset(name.to_string()))?;
        rack.current_preset = Some(name.to_string());
        for (module_id, values) in preset {
            for (param_id, value) in values {
                // Presets may name parameters a reloaded module no longer has.
                let _ = self.set_value(ChangeSource::Preset, rack_id, &module_id, &param_id, value);
            }
        }
        self.pending.push(ModelEvent::RackChanged {
            source: ChangeSource::Preset,
            rack_id: rack_id.to_string(),
        });
        Ok(())
    }

    fn update_preset(&mut self, rack_id: &str, name: &str) -> ModelResult {
        let rack = self.rack_mut(rack_id)?;
        let snapshot = rack.snapshot();
        rack.presets.insert(name.to_string(), snapshot);
        rack.current_preset = Some(name.to_string());
        self.pending.push(ModelEvent::RackChanged {
            source: ChangeSource::Local,
            rack_id: rack_id.to_string(),
        });
        Ok(())
    }

    fn save_settings(&mut self, rack_id: &str) -> ModelResult {
        self.rack_mut(rack_id)?;
        self.saves += 1;
        Ok(())
    }

    fn take_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Page, Parameter};

    fn template(name: &str) -> ModuleTemplate {
        ModuleTemplate {
            module_type: name.to_string(),
            pages: vec![Page::new("main", "Main", &["level", "tone"])],
            params: vec![
                Parameter::float("level", "Level", 0.0, 1.0, 0.5),
                Parameter::int("tone", "Tone", 0, 127, 64),
            ],
        }
    }

    fn model() -> MemoryModel {
        let mut model = MemoryModel::new();
        model.add_template(template("Drive"));
        model.add_template(template("Echo"));
        let mut rack = Rack::new("rack");
        rack.modules.push(Module::from_template("m1", "First", &template("Drive")));
        model.add_rack(rack);
        model.take_events();
        model
    }

    #[test]
    fn change_param_clamps_and_reports() {
        let mut model = model();
        model
            .change_param(ChangeSource::Local, "rack", "m1", "tone", ParamValue::Int(500))
            .unwrap();
        assert_eq!(model.param("rack", "m1", "tone").unwrap().current, ParamValue::Int(127));

        let events = model.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ModelEvent::ParamValueChanged { source: ChangeSource::Local, param, .. } if param.id == "tone"
        ));
        assert!(model.take_events().is_empty());
    }

    #[test]
    fn lookup_miss_leaves_model_untouched() {
        let mut model = model();
        let err = model
            .change_param(ChangeSource::Local, "rack", "m1", "nope", ParamValue::Int(1))
            .unwrap_err();
        assert_eq!(err, ModelError::UnknownParam("nope".to_string()));
        assert!(model.take_events().is_empty());
        assert!(model.set_active_module(ChangeSource::Local, "other", "m1").is_err());
    }

    #[test]
    fn load_module_swaps_type_and_reports_pages() {
        let mut model = model();
        model.load_module(ChangeSource::Local, "rack", "m1", "Echo").unwrap();
        let module = model.module("rack", "m1").unwrap();
        assert_eq!(module.module_type, "Echo");
        assert_eq!(module.display_name, "First");

        let events = model.take_events();
        assert!(matches!(events[0], ModelEvent::ModuleLoaded { .. }));
        assert!(events.iter().any(|e| matches!(e, ModelEvent::PageChanged { page_id, .. } if page_id == "main")));
        assert!(model.load_module(ChangeSource::Local, "rack", "m1", "Missing").is_err());
    }

    #[test]
    fn presets_round_trip_through_the_rack() {
        let mut model = model();
        model.update_preset("rack", "A").unwrap();
        model
            .change_param(ChangeSource::Local, "rack", "m1", "level", ParamValue::Float(0.9))
            .unwrap();
        model.take_events();

        model.apply_preset("rack", "A").unwrap();
        assert_eq!(model.param("rack", "m1", "level").unwrap().current, ParamValue::Float(0.5));
        assert_eq!(model.current_preset("rack").as_deref(), Some("A"));
        let events = model.take_events();
        assert!(events
            .iter()
            .filter(|e| matches!(e, ModelEvent::ParamValueChanged { .. }))
            .all(|e| e.source() == ChangeSource::Preset));
        assert_eq!(model.presets("rack"), vec!["A".to_string()]);
    }

    #[test]
    fn midi_cc_drives_mapped_params() {
        let mut model = model();
        model.add_midi_mapping("rack", 7, "m1", "tone").unwrap();
        model.apply_midi_cc("rack", 7, 127).unwrap();
        assert_eq!(model.param("rack", "m1", "tone").unwrap().current, ParamValue::Int(127));
        assert_eq!(model.take_events()[0].source(), ChangeSource::Midi);

        model.remove_midi_mapping("rack", 7, "m1", "tone").unwrap();
        model.apply_midi_cc("rack", 7, 0).unwrap();
        assert!(model.take_events().is_empty());
    }

    #[test]
    fn resources_list_module_types() {
        let model = model();
        assert_eq!(model.resources("rack", MODULE_RESOURCE), vec!["Drive", "Echo"]);
        assert!(model.resources("rack", "sample").is_empty());
    }
}
