use std::any::Any;

use super::{DeviceMode, ModeContext, ModeId};
use crate::menu::{MenuNavigator, MenuStep};
use crate::timer::Countdown;

/// What the menu should do after an item was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Handled,
    /// The selected item's text changed; redraw just that line.
    RedrawItem,
}

/// The item list behind a [`MenuMode`].
pub trait ListMenu: 'static {
    /// Rebuild the items on activation. Returns the index to focus, if any.
    fn refresh(&mut self, _ctx: &ModeContext<'_>) -> Option<usize> {
        None
    }

    fn item_count(&self, ctx: &ModeContext<'_>) -> usize;

    fn item_text(&self, ctx: &ModeContext<'_>, index: usize) -> String;

    fn on_select(&mut self, ctx: &mut ModeContext<'_>, index: usize) -> SelectOutcome;
}

/// A scrolling four-line menu that falls back to the parameter page after
/// a period without input.
pub struct MenuMode<L: ListMenu> {
    id: ModeId,
    list: L,
    nav: MenuNavigator,
    timer: Countdown,
}

impl<L: ListMenu> MenuMode<L> {
    pub fn new(id: ModeId, list: L) -> Self {
        Self {
            id,
            list,
            nav: MenuNavigator::new(),
            timer: Countdown::new(),
        }
    }

    pub fn list(&self) -> &L {
        &self.list
    }

    pub fn navigator(&self) -> &MenuNavigator {
        &self.nav
    }

    fn draw_item(&self, ctx: &mut ModeContext<'_>, index: usize) {
        let Some(line) = self.nav.line_of(index) else {
            return;
        };
        let text = self.list.item_text(ctx, index);
        ctx.display.line(line, &text);
        if index == self.nav.cursor() {
            ctx.display.invert_line(line);
        }
    }

    fn redraw(&self, ctx: &mut ModeContext<'_>) {
        ctx.display.clear();
        let count = self.list.item_count(ctx);
        for index in self.nav.visible(count) {
            self.draw_item(ctx, index);
        }
        ctx.display.flip();
    }
}

impl<L: ListMenu> DeviceMode for MenuMode<L> {
    fn id(&self) -> ModeId {
        self.id
    }

    fn timer(&mut self) -> &mut Countdown {
        &mut self.timer
    }

    fn activate(&mut self, ctx: &mut ModeContext<'_>) {
        let focus = self.list.refresh(ctx);
        let count = self.list.item_count(ctx);
        match focus {
            Some(index) => self.nav.focus(index, count),
            None => self.nav.clamp(count),
        }
        self.redraw(ctx);
        self.timer.start(ctx.timing.menu_timeout_ticks);
        self.nav.disarm();
    }

    fn timer_expired(&mut self, ctx: &mut ModeContext<'_>) {
        ctx.change_mode(ModeId::Parameter);
    }

    fn change_encoder(&mut self, ctx: &mut ModeContext<'_>, delta: i32) {
        let count = self.list.item_count(ctx);
        match self.nav.step(delta, count) {
            MenuStep::Unchanged => {}
            MenuStep::Scrolled => self.redraw(ctx),
            MenuStep::Moved { old_line, new_line } => {
                ctx.display.invert_line(old_line);
                ctx.display.invert_line(new_line);
                ctx.display.flip();
            }
        }
        self.timer.start(ctx.timing.menu_timeout_ticks);
    }

    fn encoder_button(&mut self, ctx: &mut ModeContext<'_>, down: bool) {
        if down {
            self.nav.arm();
            return;
        }
        if !self.nav.disarm() {
            return;
        }
        let index = self.nav.cursor();
        if index >= self.list.item_count(ctx) {
            return;
        }
        if self.list.on_select(ctx, index) == SelectOutcome::RedrawItem {
            self.draw_item(ctx, index);
            ctx.display.flip();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
