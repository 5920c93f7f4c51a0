use panel_types::EntityId;

use super::{ListMenu, ModeContext, ModeId, SelectOutcome};

/// Choose which module of the rack the panel edits.
#[derive(Debug, Default)]
pub struct ModuleSelectMenu {
    modules: Vec<(EntityId, String)>,
}

impl ListMenu for ModuleSelectMenu {
    fn refresh(&mut self, ctx: &ModeContext<'_>) -> Option<usize> {
        self.modules = ctx
            .modules()
            .iter()
            .map(|m| (m.id.clone(), m.label()))
            .collect();
        let current = ctx.device.module_id.as_deref()?;
        self.modules.iter().position(|(id, _)| id == current)
    }

    fn item_count(&self, _ctx: &ModeContext<'_>) -> usize {
        self.modules.len()
    }

    fn item_text(&self, _ctx: &ModeContext<'_>, index: usize) -> String {
        self.modules
            .get(index)
            .map(|(_, label)| label.clone())
            .unwrap_or_default()
    }

    fn on_select(&mut self, ctx: &mut ModeContext<'_>, index: usize) -> SelectOutcome {
        ctx.change_mode(ModeId::Parameter);
        if let Some((module_id, _)) = self.modules.get(index) {
            ctx.select_module(module_id);
        }
        SelectOutcome::Handled
    }
}
