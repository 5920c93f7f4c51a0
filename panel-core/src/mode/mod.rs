//! Device modes.
//!
//! Exactly one mode is active at a time. The [`ModeController`] routes
//! hardware input and model notifications to it through the [`DeviceMode`]
//! trait. Modes never call back into the controller; they request a switch
//! with [`ModeContext::change_mode`] and the controller performs it once the
//! handler returns.
//!
//! [`ModeController`]: crate::ModeController

mod main_menu;
mod menu;
mod module_menu;
mod module_select;
mod parameter;
mod preset_menu;

use std::any::Any;

use panel_display::Display;
use panel_types::{ChangeSource, EntityId, Module, Parameter, RackModel};

use crate::timer::Countdown;

pub use main_menu::MainMenu;
pub use menu::{ListMenu, MenuMode, SelectOutcome};
pub use module_menu::ModuleMenu;
pub use module_select::ModuleSelectMenu;
pub use parameter::ParameterMode;
pub use preset_menu::PresetMenu;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeId {
    Parameter,
    MainMenu,
    PresetMenu,
    ModuleMenu,
    ModuleSelectMenu,
}

impl ModeId {
    pub const ALL: [ModeId; 5] = [
        ModeId::Parameter,
        ModeId::MainMenu,
        ModeId::PresetMenu,
        ModeId::ModuleMenu,
        ModeId::ModuleSelectMenu,
    ];

    pub fn index(self) -> usize {
        match self {
            ModeId::Parameter => 0,
            ModeId::MainMenu => 1,
            ModeId::PresetMenu => 2,
            ModeId::ModuleMenu => 3,
            ModeId::ModuleSelectMenu => 4,
        }
    }
}

/// Messages for the host patch, sent as `/<name> <value>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostMessage {
    GoHome,
    MidiOutGate(bool),
    EnableSubMenu(bool),
}

impl HostMessage {
    pub fn name(&self) -> &'static str {
        match self {
            HostMessage::GoHome => "goHome",
            HostMessage::MidiOutGate(_) => "midiOutGate",
            HostMessage::EnableSubMenu(_) => "enableSubMenu",
        }
    }

    pub fn value(&self) -> f32 {
        match self {
            HostMessage::GoHome => 1.0,
            HostMessage::MidiOutGate(on) | HostMessage::EnableSubMenu(on) => {
                if *on {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Panel-wide state shared by all modes.
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    pub rack_id: EntityId,
    pub module_id: Option<EntityId>,
    pub midi_learn: bool,
    /// Parameter a learned CC will be bound to.
    pub last_param_id: Option<EntityId>,
}

impl DeviceState {
    pub fn new(rack_id: &str) -> Self {
        Self {
            rack_id: rack_id.to_string(),
            ..Self::default()
        }
    }

    pub fn set_midi_learn(&mut self, on: bool) {
        self.midi_learn = on;
        self.last_param_id = None;
    }

    pub fn is_current(&self, rack_id: &str, module_id: &str) -> bool {
        self.rack_id == rack_id && self.module_id.as_deref() == Some(module_id)
    }
}

/// Popup and timeout durations, in controller ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub page_popup_ticks: u32,
    pub module_popup_ticks: u32,
    pub menu_timeout_ticks: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            page_popup_ticks: 50,
            module_popup_ticks: 50,
            menu_timeout_ticks: 350,
        }
    }
}

/// Everything a mode may touch while handling one event.
pub struct ModeContext<'a> {
    pub model: &'a mut dyn RackModel,
    pub display: &'a mut Display,
    pub device: &'a mut DeviceState,
    pub timing: &'a Timing,
    host: &'a mut Vec<HostMessage>,
    next_mode: Option<ModeId>,
}

impl<'a> ModeContext<'a> {
    pub fn new(
        model: &'a mut dyn RackModel,
        display: &'a mut Display,
        device: &'a mut DeviceState,
        timing: &'a Timing,
        host: &'a mut Vec<HostMessage>,
    ) -> Self {
        Self {
            model,
            display,
            device,
            timing,
            host,
            next_mode: None,
        }
    }

    /// Ask for a mode switch once the current handler returns.
    pub fn change_mode(&mut self, id: ModeId) {
        self.next_mode = Some(id);
    }

    pub fn take_next_mode(&mut self) -> Option<ModeId> {
        self.next_mode.take()
    }

    pub fn send_host(&mut self, msg: HostMessage) {
        self.host.push(msg);
    }

    pub fn rack_id(&self) -> &str {
        &self.device.rack_id
    }

    pub fn current_module(&self) -> Option<&Module> {
        let module_id = self.device.module_id.as_deref()?;
        self.model.module(&self.device.rack_id, module_id)
    }

    pub fn modules(&self) -> Vec<&Module> {
        self.model.modules(&self.device.rack_id)
    }

    /// Make `module_id` the panel's module and tell the model.
    /// Returns `false` when it already was.
    pub fn select_module(&mut self, module_id: &str) -> bool {
        if self.device.module_id.as_deref() == Some(module_id) {
            return false;
        }
        self.device.module_id = Some(module_id.to_string());
        let rack_id = self.device.rack_id.clone();
        if let Err(e) = self
            .model
            .set_active_module(ChangeSource::Local, &rack_id, module_id)
        {
            log::debug!(target: "panel::mode", "set_active_module {}: {}", module_id, e);
        }
        true
    }
}

/// One screen of panel behaviour.
///
/// Every handler has a no-op default so a mode only implements the events
/// it reacts to.
pub trait DeviceMode {
    fn id(&self) -> ModeId;

    /// The countdown the controller ticks while this mode is active.
    fn timer(&mut self) -> &mut Countdown;

    fn init(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn poll(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn timer_expired(&mut self, _ctx: &mut ModeContext<'_>) {}

    /// Called on becoming the active mode. Draws the whole screen.
    fn activate(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn change_pot(&mut self, _ctx: &mut ModeContext<'_>, _index: usize, _raw: f32) {}

    fn change_encoder(&mut self, _ctx: &mut ModeContext<'_>, _delta: i32) {}

    fn encoder_button(&mut self, _ctx: &mut ModeContext<'_>, _down: bool) {}

    fn key_press(&mut self, _ctx: &mut ModeContext<'_>, _key: u32, _down: bool) {}

    fn rack_changed(&mut self, _ctx: &mut ModeContext<'_>, _source: ChangeSource, _rack_id: &str) {}

    fn module_changed(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _module_id: &str,
        _module_type: &str,
    ) {
    }

    fn page_changed(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _module_id: &str,
        _page_id: &str,
    ) {
    }

    fn param_changed(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _module_id: &str,
        _param_id: &str,
    ) {
    }

    fn param_value_changed(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _module_id: &str,
        _param: &Parameter,
    ) {
    }

    fn module_loaded(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _module_id: &str,
        _module_type: &str,
    ) {
    }

    fn active_module_changed(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _module_id: &str,
    ) {
    }

    fn resource_changed(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _kind: &str,
        _name: &str,
    ) {
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
