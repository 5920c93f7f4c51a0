use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::EntityId;

/// A parameter value as stored by the model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
}

impl ParamValue {
    pub fn to_f32(self) -> f32 {
        match self {
            ParamValue::Float(v) => v,
            ParamValue::Int(v) => v as f32,
        }
    }
}

// Comparison goes through f32 so that Int and Float values of the same
// magnitude compare equal; the pot reconciler depends on this ordering.
impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Int(a), ParamValue::Int(b)) => a == b,
            _ => self.to_f32() == other.to_f32(),
        }
    }
}

impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ParamValue::Int(a), ParamValue::Int(b)) => a.partial_cmp(b),
            _ => self.to_f32().partial_cmp(&other.to_f32()),
        }
    }
}

/// Value range of a parameter. Scaling is linear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParamKind {
    Float { min: f32, max: f32 },
    Int { min: i32, max: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: EntityId,
    pub display_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(flatten)]
    pub kind: ParamKind,
    pub current: ParamValue,
}

impl Parameter {
    pub fn float(id: &str, display_name: &str, min: f32, max: f32, current: f32) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            unit: String::new(),
            kind: ParamKind::Float { min, max },
            current: ParamValue::Float(current.clamp(min, max)),
        }
    }

    pub fn int(id: &str, display_name: &str, min: i32, max: i32, current: i32) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            unit: String::new(),
            kind: ParamKind::Int { min, max },
            current: ParamValue::Int(current.clamp(min, max)),
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Map a normalized control position (0.0..=1.0) onto this parameter's range.
    pub fn calc(&self, normalized: f32) -> ParamValue {
        let n = normalized.clamp(0.0, 1.0);
        match self.kind {
            ParamKind::Float { min, max } => ParamValue::Float(min + n * (max - min)),
            ParamKind::Int { min, max } => {
                let span = (max - min) as f32;
                ParamValue::Int(min + (n * span).round() as i32)
            }
        }
    }

    /// Clamp an incoming value to the range and kind of this parameter.
    pub fn coerce(&self, value: ParamValue) -> ParamValue {
        match self.kind {
            ParamKind::Float { min, max } => ParamValue::Float(value.to_f32().clamp(min, max)),
            ParamKind::Int { min, max } => {
                ParamValue::Int((value.to_f32().round() as i32).clamp(min, max))
            }
        }
    }

    pub fn display_value(&self) -> String {
        match self.current {
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Float(v) => {
                let magnitude = v.abs();
                if magnitude >= 100.0 {
                    format!("{:.0}", v)
                } else if magnitude >= 10.0 {
                    format!("{:.1}", v)
                } else {
                    format!("{:.2}", v)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: EntityId,
    pub display_name: String,
    /// Parameter ids in display/pot order.
    pub params: Vec<EntityId>,
}

impl Page {
    pub fn new(id: &str, display_name: &str, params: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// The pages and parameters a module of a given type is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleTemplate {
    pub module_type: String,
    pub pages: Vec<Page>,
    pub params: Vec<Parameter>,
}

/// A module instance in a rack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: EntityId,
    pub display_name: String,
    pub module_type: String,
    pub pages: Vec<Page>,
    pub params: Vec<Parameter>,
}

impl Module {
    pub fn from_template(id: &str, display_name: &str, template: &ModuleTemplate) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            module_type: template.module_type.clone(),
            pages: template.pages.clone(),
            params: template.params.clone(),
        }
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    pub fn param(&self, param_id: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.id == param_id)
    }

    pub fn param_mut(&mut self, param_id: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.id == param_id)
    }

    /// `"id:displayName"`, the way modules are labelled on the panel.
    pub fn label(&self) -> String {
        format!("{}:{}", self.id, self.display_name)
    }
}

/// Stored parameter values, keyed by module id then parameter id.
pub type Preset = BTreeMap<EntityId, BTreeMap<EntityId, ParamValue>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    pub id: EntityId,
    pub modules: Vec<Module>,
    #[serde(default)]
    pub active_module: Option<EntityId>,
    #[serde(default)]
    pub current_preset: Option<String>,
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
    /// MIDI CC number → (module id, parameter id) targets.
    #[serde(default)]
    pub midi_mappings: BTreeMap<u8, Vec<(EntityId, EntityId)>>,
}

impl Rack {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            modules: Vec::new(),
            active_module: None,
            current_preset: None,
            presets: BTreeMap::new(),
            midi_mappings: BTreeMap::new(),
        }
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub fn module_mut(&mut self, module_id: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.id == module_id)
    }

    /// Capture every parameter value of every module.
    pub fn snapshot(&self) -> Preset {
        self.modules
            .iter()
            .map(|m| {
                let values = m.params.iter().map(|p| (p.id.clone(), p.current)).collect();
                (m.id.clone(), values)
            })
            .collect()
    }
}
