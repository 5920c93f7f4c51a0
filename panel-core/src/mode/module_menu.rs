use panel_types::{ChangeSource, MODULE_RESOURCE};

use super::{ListMenu, ModeContext, ModeId, SelectOutcome};

/// Pick the module type loaded into the current module slot.
#[derive(Debug, Default)]
pub struct ModuleMenu {
    types: Vec<String>,
}

impl ModuleMenu {
    pub fn types(&self) -> &[String] {
        &self.types
    }
}

impl ListMenu for ModuleMenu {
    fn refresh(&mut self, ctx: &ModeContext<'_>) -> Option<usize> {
        self.types.clear();
        let Some(module) = ctx.current_module() else {
            log::debug!(target: "panel::mode", "module menu without a current module");
            return None;
        };
        self.types = ctx.model.resources(ctx.rack_id(), MODULE_RESOURCE);
        self.types.iter().position(|t| *t == module.module_type)
    }

    fn item_count(&self, _ctx: &ModeContext<'_>) -> usize {
        self.types.len()
    }

    fn item_text(&self, _ctx: &ModeContext<'_>, index: usize) -> String {
        self.types.get(index).cloned().unwrap_or_default()
    }

    fn on_select(&mut self, ctx: &mut ModeContext<'_>, index: usize) -> SelectOutcome {
        ctx.change_mode(ModeId::Parameter);
        let (Some(module_type), Some(module)) = (self.types.get(index), ctx.current_module()) else {
            return SelectOutcome::Handled;
        };
        if *module_type == module.module_type {
            return SelectOutcome::Handled;
        }
        let module_id = module.id.clone();
        let rack_id = ctx.rack_id().to_string();
        log::info!(target: "panel::mode", "loading {} into {}", module_type, module_id);
        if let Err(e) = ctx
            .model
            .load_module(ChangeSource::Local, &rack_id, &module_id, module_type)
        {
            log::warn!(target: "panel::mode", "load {} failed: {}", module_type, e);
        }
        SelectOutcome::Handled
    }
}
