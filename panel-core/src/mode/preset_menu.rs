use super::{ListMenu, ModeContext, ModeId, SelectOutcome};

const ITEM_UPDATE: usize = 0;
const ITEM_NEW: usize = 1;
const ITEM_SEPARATOR: usize = 2;
const FIXED_ITEMS: usize = 3;

/// Update, create or recall rack presets.
#[derive(Debug, Default)]
pub struct PresetMenu {
    presets: Vec<String>,
}

impl PresetMenu {
    pub fn presets(&self) -> &[String] {
        &self.presets
    }
}

impl ListMenu for PresetMenu {
    fn refresh(&mut self, ctx: &ModeContext<'_>) -> Option<usize> {
        self.presets = ctx.model.presets(ctx.rack_id());
        None
    }

    fn item_count(&self, _ctx: &ModeContext<'_>) -> usize {
        FIXED_ITEMS + self.presets.len()
    }

    fn item_text(&self, _ctx: &ModeContext<'_>, index: usize) -> String {
        match index {
            ITEM_UPDATE => "Update Preset".to_string(),
            ITEM_NEW => "New Preset".to_string(),
            ITEM_SEPARATOR => "-".repeat(20),
            _ => self
                .presets
                .get(index - FIXED_ITEMS)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn on_select(&mut self, ctx: &mut ModeContext<'_>, index: usize) -> SelectOutcome {
        let rack_id = ctx.rack_id().to_string();
        match index {
            ITEM_UPDATE => {
                match ctx.model.current_preset(&rack_id) {
                    Some(name) => {
                        if let Err(e) = ctx.model.update_preset(&rack_id, &name) {
                            log::warn!(target: "panel::mode", "update preset {}: {}", name, e);
                        }
                    }
                    None => log::debug!(target: "panel::mode", "no current preset to update"),
                }
                ctx.change_mode(ModeId::Parameter);
            }
            ITEM_NEW => {
                let name = format!("New {}", self.presets.len());
                if let Err(e) = ctx.model.update_preset(&rack_id, &name) {
                    log::warn!(target: "panel::mode", "create preset {}: {}", name, e);
                }
                ctx.change_mode(ModeId::MainMenu);
            }
            ITEM_SEPARATOR => {}
            _ => {
                if let Some(name) = self.presets.get(index - FIXED_ITEMS).cloned() {
                    ctx.change_mode(ModeId::Parameter);
                    if let Err(e) = ctx.model.apply_preset(&rack_id, &name) {
                        log::warn!(target: "panel::mode", "apply preset {}: {}", name, e);
                    }
                }
            }
        }
        SelectOutcome::Handled
    }
}
