//! Routes input and model notifications to the active device mode.

use panel_display::Display;
use panel_types::{ChangeSource, HardwareEvent, ModelEvent, RackModel};

use crate::mode::{
    DeviceMode, DeviceState, HostMessage, MainMenu, MenuMode, ModeContext, ModeId, ModuleMenu,
    ModuleSelectMenu, ParameterMode, PresetMenu, Timing,
};

/// Mode switches one entry point may chain before the rest are dropped.
const MAX_TRANSITIONS: usize = 8;
/// Rounds of model notifications drained per entry point.
const MAX_EVENT_ROUNDS: usize = 16;

pub struct ModeController<M: RackModel> {
    model: M,
    display: Display,
    device: DeviceState,
    timing: Timing,
    host: Vec<HostMessage>,
    modes: Vec<Box<dyn DeviceMode>>,
    active: ModeId,
}

impl<M: RackModel> ModeController<M> {
    pub fn new(model: M, display: Display, rack_id: &str, timing: Timing) -> Self {
        let modes: Vec<Box<dyn DeviceMode>> = vec![
            Box::new(ParameterMode::new()),
            Box::new(MenuMode::new(ModeId::MainMenu, MainMenu)),
            Box::new(MenuMode::new(ModeId::PresetMenu, PresetMenu::default())),
            Box::new(MenuMode::new(ModeId::ModuleMenu, ModuleMenu::default())),
            Box::new(MenuMode::new(ModeId::ModuleSelectMenu, ModuleSelectMenu::default())),
        ];
        debug_assert!(ModeId::ALL.iter().all(|id| modes[id.index()].id() == *id));
        Self {
            model,
            display,
            device: DeviceState::new(rack_id),
            timing,
            host: Vec::new(),
            modes,
            active: ModeId::Parameter,
        }
    }

    /// Pick the starting module, set up the host and show the parameter page.
    pub fn init(&mut self) {
        let rack_id = self.device.rack_id.clone();
        match self.model.rack(&rack_id) {
            Some(rack) => {
                self.device.module_id = rack
                    .active_module
                    .clone()
                    .filter(|id| rack.module(id).is_some())
                    .or_else(|| rack.modules.first().map(|m| m.id.clone()));
            }
            None => log::warn!(target: "panel::controller", "rack {} not found", rack_id),
        }
        log::info!(
            target: "panel::controller",
            "panel on rack {} module {}",
            rack_id,
            self.device.module_id.as_deref().unwrap_or("-")
        );
        self.device.set_midi_learn(false);

        self.host.push(HostMessage::MidiOutGate(false));
        self.host.push(HostMessage::EnableSubMenu(true));

        for id in ModeId::ALL {
            self.with_mode(id, |mode, ctx| mode.init(ctx));
        }
        self.transition(ModeId::Parameter);
    }

    pub fn active_mode(&self) -> ModeId {
        self.active
    }

    /// Typed access to a mode, e.g. `mode::<ParameterMode>(ModeId::Parameter)`.
    pub fn mode<T: 'static>(&self, id: ModeId) -> Option<&T> {
        self.modes[id.index()].as_any().downcast_ref::<T>()
    }

    pub fn mode_mut<T: 'static>(&mut self, id: ModeId) -> Option<&mut T> {
        self.modes[id.index()].as_any_mut().downcast_mut::<T>()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn device(&self) -> &DeviceState {
        &self.device
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn take_host_messages(&mut self) -> Vec<HostMessage> {
        std::mem::take(&mut self.host)
    }

    /// Deliver one hardware event to the active mode.
    pub fn dispatch(&mut self, event: HardwareEvent) {
        let id = self.active;
        let next = self.with_mode(id, |mode, ctx| match event {
            HardwareEvent::Pot { index, raw } => mode.change_pot(ctx, index, raw),
            HardwareEvent::Encoder { delta } => mode.change_encoder(ctx, delta),
            HardwareEvent::EncoderButton { down } => mode.encoder_button(ctx, down),
            HardwareEvent::Key { key, down } => mode.key_press(ctx, key, down),
        });
        self.follow(next);
        self.pump_model_events();
    }

    /// Deliver one model notification.
    pub fn notify(&mut self, event: ModelEvent) {
        self.deliver(event);
        self.pump_model_events();
    }

    /// Make `id` the active mode and let it draw itself.
    pub fn transition(&mut self, id: ModeId) {
        self.follow(Some(id));
        self.pump_model_events();
    }

    /// One poll period: the active mode's poll, then its countdown.
    pub fn tick(&mut self) {
        let id = self.active;
        let next = self.with_mode(id, |mode, ctx| {
            mode.poll(ctx);
            if mode.timer().tick() {
                mode.timer_expired(ctx);
            }
        });
        self.follow(next);
        self.pump_model_events();
    }

    /// A MIDI control change from the panel's MIDI input.
    pub fn midi_cc(&mut self, cc: u8, value: u8) {
        let rack_id = self.device.rack_id.clone();
        if self.device.midi_learn {
            if let (Some(module_id), Some(param_id)) =
                (self.device.module_id.clone(), self.device.last_param_id.take())
            {
                let result = if value > 0 {
                    log::info!(target: "panel::controller", "learn cc {} -> {}/{}", cc, module_id, param_id);
                    self.model.add_midi_mapping(&rack_id, cc, &module_id, &param_id)
                } else {
                    log::info!(target: "panel::controller", "unlearn cc {} -> {}/{}", cc, module_id, param_id);
                    self.model.remove_midi_mapping(&rack_id, cc, &module_id, &param_id)
                };
                if let Err(e) = result {
                    log::debug!(target: "panel::controller", "midi mapping: {}", e);
                }
            }
        }
        if let Err(e) = self.model.apply_midi_cc(&rack_id, cc, value) {
            log::debug!(target: "panel::controller", "cc {}: {}", cc, e);
        }
        self.pump_model_events();
    }

    fn with_mode<F>(&mut self, id: ModeId, f: F) -> Option<ModeId>
    where
        F: FnOnce(&mut (dyn DeviceMode + 'static), &mut ModeContext<'_>),
    {
        let mut ctx = ModeContext::new(
            &mut self.model,
            &mut self.display,
            &mut self.device,
            &self.timing,
            &mut self.host,
        );
        f(self.modes[id.index()].as_mut(), &mut ctx);
        ctx.take_next_mode()
    }

    /// Perform requested transitions, following chains a bounded number of times.
    fn follow(&mut self, mut next: Option<ModeId>) {
        let mut hops = 0;
        while let Some(id) = next {
            if hops == MAX_TRANSITIONS {
                log::warn!(target: "panel::controller", "mode transition loop, staying in {:?}", self.active);
                return;
            }
            hops += 1;
            log::debug!(target: "panel::controller", "mode {:?} -> {:?}", self.active, id);
            self.active = id;
            next = self.with_mode(id, |mode, ctx| mode.activate(ctx));
        }
    }

    fn pump_model_events(&mut self) {
        for _ in 0..MAX_EVENT_ROUNDS {
            let events = self.model.take_events();
            if events.is_empty() {
                return;
            }
            for event in events {
                self.deliver(event);
            }
        }
        let left = self.model.take_events().len();
        if left > 0 {
            log::warn!(target: "panel::controller", "dropping {} model notifications after {} rounds", left, MAX_EVENT_ROUNDS);
        }
    }

    fn bookkeep(&mut self, event: &ModelEvent) {
        match event {
            ModelEvent::ModuleChanged { rack_id, module_id, .. } => {
                if self.device.module_id.is_none() && *rack_id == self.device.rack_id {
                    log::debug!(target: "panel::controller", "adopting module {}", module_id);
                    self.device.module_id = Some(module_id.clone());
                }
            }
            ModelEvent::ParamValueChanged { rack_id, module_id, param, .. } => {
                if self.device.midi_learn && self.device.is_current(rack_id, module_id) {
                    self.device.last_param_id = Some(param.id.clone());
                }
            }
            _ => {}
        }
    }

    fn deliver(&mut self, event: ModelEvent) {
        self.bookkeep(&event);
        let id = self.active;
        let next = self.with_mode(id, |mode, ctx| dispatch_event(mode, ctx, &event));
        self.follow(next);
    }
}

fn dispatch_event(mode: &mut dyn DeviceMode, ctx: &mut ModeContext<'_>, event: &ModelEvent) {
    let source: ChangeSource = event.source();
    match event {
        ModelEvent::RackChanged { rack_id, .. } => mode.rack_changed(ctx, source, rack_id),
        ModelEvent::ModuleChanged { rack_id, module_id, module_type, .. } => {
            mode.module_changed(ctx, source, rack_id, module_id, module_type)
        }
        ModelEvent::PageChanged { rack_id, module_id, page_id, .. } => {
            mode.page_changed(ctx, source, rack_id, module_id, page_id)
        }
        ModelEvent::ParamChanged { rack_id, module_id, param_id, .. } => {
            mode.param_changed(ctx, source, rack_id, module_id, param_id)
        }
        ModelEvent::ParamValueChanged { rack_id, module_id, param, .. } => {
            mode.param_value_changed(ctx, source, rack_id, module_id, param)
        }
        ModelEvent::ModuleLoaded { rack_id, module_id, module_type, .. } => {
            mode.module_loaded(ctx, source, rack_id, module_id, module_type)
        }
        ModelEvent::ActiveModuleChanged { rack_id, module_id, .. } => {
            mode.active_module_changed(ctx, source, rack_id, module_id)
        }
        ModelEvent::ResourceChanged { rack_id, kind, name, .. } => {
            mode.resource_changed(ctx, source, rack_id, kind, name)
        }
    }
}
