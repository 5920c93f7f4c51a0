#![allow(dead_code)]
//! Shared fixtures for panel-core integration tests.

use panel_core::mode::ParameterMode;
use panel_core::pots::MAX_POT_VALUE;
use panel_core::{ModeController, ModeId, Timing};
use panel_display::{Display, RecordingSink};
use panel_types::{
    MemoryModel, Module, ModuleTemplate, Page, ParamValue, Parameter, Preset, Rack, RackModel,
};

pub const RACK: &str = "r1";

pub fn template(module_type: &str, pages: &[(&str, Vec<(&str, f32)>)]) -> ModuleTemplate {
    let mut params = Vec::new();
    let mut page_list = Vec::new();
    for (i, (page_id, page_params)) in pages.iter().enumerate() {
        let ids: Vec<&str> = page_params.iter().map(|(id, _)| *id).collect();
        page_list.push(Page::new(page_id, &format!("Page {}", i + 1), &ids));
        for (id, value) in page_params.iter() {
            params.push(Parameter::float(id, &id.to_uppercase(), 0.0, 1.0, *value));
        }
    }
    ModuleTemplate {
        module_type: module_type.to_string(),
        pages: page_list,
        params,
    }
}

/// `Osc` has three pages, `Filter` one.
pub fn osc_template() -> ModuleTemplate {
    template(
        "Osc",
        &[
            ("p1", vec![("a", 0.5), ("b", 0.5), ("c", 0.5), ("d", 0.5)]),
            ("p2", vec![("e", 0.9), ("f", 0.5)]),
            ("p3", vec![("g", 0.5)]),
        ],
    )
}

pub fn filter_template() -> ModuleTemplate {
    template("Filter", &[("main", vec![("cutoff", 0.5), ("res", 0.1)])])
}

/// Rack `r1`: m1 Osc "Lead", m2 Filter "Lowpass", m3 Osc "Bass"; one preset "Init".
pub fn fixture_model() -> MemoryModel {
    let osc = osc_template();
    let filter = filter_template();

    let mut rack = Rack::new(RACK);
    rack.modules.push(Module::from_template("m1", "Lead", &osc));
    rack.modules.push(Module::from_template("m2", "Lowpass", &filter));
    rack.modules.push(Module::from_template("m3", "Bass", &osc));

    let mut init = Preset::new();
    init.insert(
        "m1".to_string(),
        [("a".to_string(), ParamValue::Float(0.1))].into_iter().collect(),
    );
    rack.presets.insert("Init".to_string(), init);

    let mut model = MemoryModel::new();
    model.add_template(osc);
    model.add_template(filter);
    model.add_rack(rack);
    model
}

/// An initialised controller over `model` with its startup drawing discarded.
pub fn controller_with(model: MemoryModel) -> (ModeController<MemoryModel>, RecordingSink) {
    let (display, sink) = Display::recording();
    let mut controller = ModeController::new(model, display, RACK, Timing::default());
    controller.init();
    sink.take();
    (controller, sink)
}

pub fn controller() -> (ModeController<MemoryModel>, RecordingSink) {
    controller_with(fixture_model())
}

pub fn param_mode(c: &ModeController<MemoryModel>) -> &ParameterMode {
    c.mode::<ParameterMode>(ModeId::Parameter)
        .expect("parameter mode")
}

pub fn value(c: &ModeController<MemoryModel>, module: &str, param: &str) -> f32 {
    c.model()
        .param(RACK, module, param)
        .map(|p| p.current.to_f32())
        .expect("parameter exists")
}

/// Raw pot reading for a normalised position.
pub fn raw(position: f32) -> f32 {
    position * MAX_POT_VALUE
}

pub fn turn(c: &mut ModeController<MemoryModel>, pot: usize, position: f32) {
    c.dispatch(panel_types::HardwareEvent::Pot { index: pot, raw: raw(position) });
}

pub fn encoder(c: &mut ModeController<MemoryModel>, delta: i32) {
    c.dispatch(panel_types::HardwareEvent::Encoder { delta });
}

pub fn click(c: &mut ModeController<MemoryModel>) {
    c.dispatch(panel_types::HardwareEvent::EncoderButton { down: true });
    c.dispatch(panel_types::HardwareEvent::EncoderButton { down: false });
}

pub fn ticks(c: &mut ModeController<MemoryModel>, n: u32) {
    for _ in 0..n {
        c.tick();
    }
}

/// Deliver whatever the model queued after a direct `model_mut()` change.
pub fn sync(c: &mut ModeController<MemoryModel>) {
    let events = c.model_mut().take_events();
    for event in events {
        c.notify(event);
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
