use std::any::Any;

use panel_types::{ChangeSource, EntityId, Parameter};

use super::{DeviceMode, ModeContext, ModeId};
use crate::format::{param_line, SCREEN_WIDTH};
use crate::pots::{normalize, LockState, PotChannel, POT_COUNT};
use crate::timer::Countdown;

/// Lines of parameters shown per page.
const PARAM_LINES: usize = 8;

struct Popup {
    text: String,
    double_line: bool,
}

/// Home mode: shows one page of the current module and maps the pots onto
/// its first four parameters.
pub struct ParameterMode {
    timer: Countdown,
    pots: [PotChannel; POT_COUNT],
    page_index: Option<usize>,
    page_id: Option<EntityId>,
    module_type: Option<String>,
    popup: Option<Popup>,
    encoder_down: bool,
    encoder_action: bool,
}

impl Default for ParameterMode {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterMode {
    pub fn new() -> Self {
        Self {
            timer: Countdown::new(),
            pots: Default::default(),
            page_index: None,
            page_id: None,
            module_type: None,
            popup: None,
            encoder_down: false,
            encoder_action: false,
        }
    }

    pub fn page_index(&self) -> Option<usize> {
        self.page_index
    }

    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    pub fn pot_state(&self, index: usize) -> Option<LockState> {
        self.pots.get(index).map(PotChannel::state)
    }

    pub fn popup_text(&self) -> Option<&str> {
        self.popup.as_ref().map(|p| p.text.as_str())
    }

    fn invalidate_page(&mut self) {
        self.page_index = None;
        self.page_id = None;
    }

    fn page_params(&self, ctx: &ModeContext<'_>) -> Vec<Parameter> {
        let (Some(module_id), Some(page_id)) = (ctx.device.module_id.as_deref(), self.page_id.as_deref()) else {
            return Vec::new();
        };
        ctx.model
            .page_params(&ctx.device.rack_id, module_id, page_id)
            .into_iter()
            .cloned()
            .collect()
    }

    fn page_exists(&self, ctx: &ModeContext<'_>) -> bool {
        let Some(page_id) = self.page_id.as_deref() else {
            return false;
        };
        ctx.current_module()
            .map(|m| m.page(page_id).is_some())
            .unwrap_or(false)
    }

    /// Clear, draw the page's parameters and any open popup, flip.
    fn redraw(&self, ctx: &mut ModeContext<'_>) {
        ctx.display.clear();
        for (i, param) in self.page_params(ctx).iter().take(PARAM_LINES).enumerate() {
            ctx.display.line(i + 1, &param_line(param, SCREEN_WIDTH));
        }
        if let Some(popup) = &self.popup {
            ctx.display.popup(&popup.text, popup.double_line);
        }
        ctx.display.flip();
    }

    fn show_popup(&mut self, ctx: &mut ModeContext<'_>, text: String, ticks: u32, double_line: bool) {
        ctx.display.popup(&text, double_line);
        self.popup = Some(Popup { text, double_line });
        self.timer.start(ticks);
    }

    fn set_current_page(&mut self, ctx: &mut ModeContext<'_>, index: usize, announce: bool) {
        let Some(module) = ctx.current_module() else {
            log::debug!(target: "panel::mode", "no current module, page {} not shown", index);
            ctx.display.clear();
            ctx.display.flip();
            return;
        };
        let Some(page) = module.pages.get(index) else {
            if self.page_index != Some(index) {
                ctx.display.clear();
                ctx.display.flip();
            }
            return;
        };
        let page_id = page.id.clone();
        let page_name = page.display_name.clone();
        self.module_type = Some(module.module_type.clone());

        self.page_index = Some(index);
        self.page_id = Some(page_id);
        if announce {
            self.popup = Some(Popup {
                text: page_name,
                double_line: false,
            });
            self.timer.start(ctx.timing.page_popup_ticks);
        }
        self.redraw(ctx);

        for i in 0..POT_COUNT {
            self.pots[i].relock();
            let raw = self.pots[i].last_raw();
            self.apply_pot(ctx, i, raw);
        }
    }

    fn apply_pot(&mut self, ctx: &mut ModeContext<'_>, index: usize, raw: Option<f32>) {
        let param = self.page_params(ctx).into_iter().nth(index);
        let forwarded = self.pots[index].sample(raw, |raw| {
            let p = param.as_ref()?;
            Some((p.calc(normalize(raw)), p.current))
        });

        let (Some(value), Some(param), Some(module_id)) = (forwarded, param, ctx.device.module_id.clone()) else {
            return;
        };
        let rack_id = ctx.device.rack_id.clone();
        if let Err(e) = ctx
            .model
            .change_param(ChangeSource::Local, &rack_id, &module_id, &param.id, value)
        {
            log::debug!(target: "panel::mode", "pot {} change dropped: {}", index, e);
        }
    }

    fn activate_shortcut(&mut self, ctx: &mut ModeContext<'_>, key: u32) {
        if key == 0 {
            self.encoder_down = false;
            self.encoder_action = false;
            ctx.change_mode(ModeId::ModuleSelectMenu);
            return;
        }

        let index = (key - 1) as usize;
        let Some((module_id, label)) = ctx
            .modules()
            .get(index)
            .map(|m| (m.id.clone(), m.label()))
        else {
            return;
        };
        if ctx.select_module(&module_id) {
            let ticks = ctx.timing.module_popup_ticks;
            self.show_popup(ctx, label, ticks, true);
            ctx.display.flip();
        }
    }
}

impl DeviceMode for ParameterMode {
    fn id(&self) -> ModeId {
        ModeId::Parameter
    }

    fn timer(&mut self) -> &mut Countdown {
        &mut self.timer
    }

    fn init(&mut self, _ctx: &mut ModeContext<'_>) {
        self.pots = Default::default();
        self.invalidate_page();
    }

    fn activate(&mut self, ctx: &mut ModeContext<'_>) {
        if self.page_index.is_none() || !self.page_exists(ctx) {
            self.invalidate_page();
            self.set_current_page(ctx, 0, false);
        } else {
            self.redraw(ctx);
        }
    }

    fn timer_expired(&mut self, ctx: &mut ModeContext<'_>) {
        self.popup = None;
        self.redraw(ctx);
    }

    fn change_pot(&mut self, ctx: &mut ModeContext<'_>, index: usize, raw: f32) {
        if index >= POT_COUNT {
            return;
        }
        self.apply_pot(ctx, index, Some(raw));
    }

    fn change_encoder(&mut self, ctx: &mut ModeContext<'_>, delta: i32) {
        let Some(current) = self.page_index else {
            self.set_current_page(ctx, 0, false);
            return;
        };
        let page_count = ctx.current_module().map(|m| m.pages.len()).unwrap_or(0);
        let next = if delta > 0 {
            (current + 1).min(page_count.saturating_sub(1))
        } else if delta < 0 {
            current.saturating_sub(1)
        } else {
            current
        };
        if next != current {
            self.set_current_page(ctx, next, true);
        }
    }

    fn encoder_button(&mut self, ctx: &mut ModeContext<'_>, down: bool) {
        if self.encoder_action && !down {
            ctx.change_mode(ModeId::MainMenu);
        }
        self.encoder_down = down;
        self.encoder_action = down;
    }

    fn key_press(&mut self, ctx: &mut ModeContext<'_>, key: u32, down: bool) {
        if !down && self.encoder_down {
            self.activate_shortcut(ctx, key);
            self.encoder_action = false;
        }
    }

    fn module_changed(
        &mut self,
        ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        module_type: &str,
    ) {
        if !ctx.device.is_current(rack_id, module_id) {
            return;
        }
        if self.module_type.as_deref() != Some(module_type) {
            self.invalidate_page();
        }
        self.module_type = Some(module_type.to_string());
    }

    fn module_loaded(
        &mut self,
        ctx: &mut ModeContext<'_>,
        source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        module_type: &str,
    ) {
        self.module_changed(ctx, source, rack_id, module_id, module_type);
    }

    fn page_changed(
        &mut self,
        ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        _rack_id: &str,
        _module_id: &str,
        _page_id: &str,
    ) {
        if self.page_index.is_none() {
            self.set_current_page(ctx, 0, false);
        }
    }

    fn active_module_changed(
        &mut self,
        ctx: &mut ModeContext<'_>,
        _source: ChangeSource,
        rack_id: &str,
        _module_id: &str,
    ) {
        if rack_id != ctx.device.rack_id {
            return;
        }
        self.invalidate_page();
        self.set_current_page(ctx, 0, false);
    }

    fn param_value_changed(
        &mut self,
        ctx: &mut ModeContext<'_>,
        source: ChangeSource,
        rack_id: &str,
        module_id: &str,
        param: &Parameter,
    ) {
        if self.timer.is_active() || !ctx.device.is_current(rack_id, module_id) {
            return;
        }
        let Some(index) = self
            .page_params(ctx)
            .iter()
            .take(POT_COUNT)
            .position(|p| p.id == param.id)
        else {
            return;
        };

        ctx.display.line(index + 1, &param_line(param, SCREEN_WIDTH));
        if source != ChangeSource::Local {
            self.pots[index].relock();
            let raw = self.pots[index].last_raw();
            self.apply_pot(ctx, index, raw);
        }
        ctx.display.flip();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
