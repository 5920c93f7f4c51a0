//! TOML rack descriptions.
//!
//! ```toml
//! [rack]
//! id = "local"
//!
//! [[module_type]]
//! name = "Filter"
//! [[module_type.param]]
//! id = "cutoff"
//! name = "Cutoff"
//! min = 20
//! max = 20000
//! default = 1000
//! unit = "Hz"
//! [[module_type.page]]
//! id = "main"
//! name = "Main"
//! params = ["cutoff"]
//!
//! [[module]]
//! id = "m1"
//! name = "Filter"
//! type = "Filter"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use panel_types::{MemoryModel, Module, ModuleTemplate, Page, ParamValue, Parameter, Rack};

#[derive(Debug)]
pub enum RackFileError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    UnknownModuleType { module: String, module_type: String },
    UnknownParam { module_type: String, param: String },
    DuplicateModule(String),
}

impl From<std::io::Error> for RackFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for RackFileError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

impl std::fmt::Display for RackFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(e) => write!(f, "parse error: {}", e),
            Self::UnknownModuleType { module, module_type } => {
                write!(f, "module {} uses unknown type {:?}", module, module_type)
            }
            Self::UnknownParam { module_type, param } => {
                write!(f, "page of {:?} lists unknown parameter {}", module_type, param)
            }
            Self::DuplicateModule(id) => write!(f, "module id {} used twice", id),
        }
    }
}

impl std::error::Error for RackFileError {}

#[derive(Deserialize)]
struct RackFile {
    rack: RackSection,
    #[serde(default, rename = "module_type")]
    module_types: Vec<ModuleTypeSection>,
    #[serde(default, rename = "module")]
    modules: Vec<ModuleSection>,
    #[serde(default, rename = "preset")]
    presets: Vec<PresetSection>,
    #[serde(default)]
    midi: Vec<MidiSection>,
}

#[derive(Deserialize)]
struct RackSection {
    id: String,
    active_module: Option<String>,
    current_preset: Option<String>,
}

#[derive(Deserialize)]
struct ModuleTypeSection {
    name: String,
    #[serde(default, rename = "param")]
    params: Vec<ParamSection>,
    #[serde(default, rename = "page")]
    pages: Vec<PageSection>,
}

#[derive(Deserialize)]
struct ParamSection {
    id: String,
    name: Option<String>,
    #[serde(default)]
    unit: String,
    /// Whole-number parameter.
    #[serde(default)]
    int: bool,
    min: f32,
    max: f32,
    default: Option<f32>,
}

#[derive(Deserialize)]
struct PageSection {
    id: String,
    name: Option<String>,
    params: Vec<String>,
}

#[derive(Deserialize)]
struct ModuleSection {
    id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    module_type: String,
}

#[derive(Deserialize)]
struct PresetSection {
    name: String,
    /// module id -> parameter id -> value
    #[serde(default)]
    values: BTreeMap<String, BTreeMap<String, f32>>,
}

#[derive(Deserialize)]
struct MidiSection {
    cc: u8,
    module: String,
    param: String,
}

/// Read a rack file into a fresh in-memory model.
pub fn load(path: &Path) -> Result<MemoryModel, RackFileError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<MemoryModel, RackFileError> {
    let file: RackFile = toml::from_str(text)?;

    let mut templates = BTreeMap::new();
    for section in file.module_types {
        let template = build_template(section)?;
        templates.insert(template.module_type.clone(), template);
    }

    let mut rack = Rack::new(&file.rack.id);
    let mut seen = HashSet::new();
    for section in file.modules {
        if !seen.insert(section.id.clone()) {
            return Err(RackFileError::DuplicateModule(section.id));
        }
        let template = templates.get(&section.module_type).ok_or_else(|| {
            RackFileError::UnknownModuleType {
                module: section.id.clone(),
                module_type: section.module_type.clone(),
            }
        })?;
        let name = section.name.as_deref().unwrap_or(&section.id);
        rack.modules.push(Module::from_template(&section.id, name, template));
    }
    rack.active_module = file.rack.active_module;

    for preset in file.presets {
        let values = preset
            .values
            .into_iter()
            .filter_map(|(module_id, params)| {
                let module = rack.module(&module_id)?;
                let values: BTreeMap<_, _> = params
                    .into_iter()
                    .filter_map(|(param_id, v)| {
                        let param = module.param(&param_id)?;
                        Some((param_id, param.coerce(ParamValue::Float(v))))
                    })
                    .collect();
                Some((module_id, values))
            })
            .collect();
        rack.presets.insert(preset.name, values);
    }
    rack.current_preset = file
        .rack
        .current_preset
        .filter(|name| rack.presets.contains_key(name));

    for mapping in file.midi {
        if rack.module(&mapping.module).and_then(|m| m.param(&mapping.param)).is_none() {
            log::warn!(
                target: "panel::rack",
                "skipping cc {} mapping to unknown {}/{}",
                mapping.cc,
                mapping.module,
                mapping.param
            );
            continue;
        }
        rack.midi_mappings
            .entry(mapping.cc)
            .or_default()
            .push((mapping.module, mapping.param));
    }

    log::info!(
        target: "panel::rack",
        "loaded rack {} ({} module types, {} modules, {} presets)",
        rack.id,
        templates.len(),
        rack.modules.len(),
        rack.presets.len()
    );

    let mut model = MemoryModel::new();
    for template in templates.into_values() {
        model.add_template(template);
    }
    model.add_rack(rack);
    Ok(model)
}

fn build_template(section: ModuleTypeSection) -> Result<ModuleTemplate, RackFileError> {
    let params: Vec<Parameter> = section
        .params
        .into_iter()
        .map(|p| {
            let name = p.name.as_deref().unwrap_or(&p.id);
            let default = p.default.unwrap_or(p.min);
            let param = if p.int {
                Parameter::int(&p.id, name, p.min as i32, p.max as i32, default.round() as i32)
            } else {
                Parameter::float(&p.id, name, p.min, p.max, default)
            };
            param.with_unit(&p.unit)
        })
        .collect();

    let mut pages = Vec::with_capacity(section.pages.len());
    for page in section.pages {
        if let Some(missing) = page.params.iter().find(|id| !params.iter().any(|p| &p.id == *id)) {
            return Err(RackFileError::UnknownParam {
                module_type: section.name.clone(),
                param: missing.clone(),
            });
        }
        pages.push(Page {
            display_name: page.name.unwrap_or_else(|| page.id.clone()),
            id: page.id,
            params: page.params,
        });
    }

    Ok(ModuleTemplate {
        module_type: section.name,
        pages,
        params,
    })
}
