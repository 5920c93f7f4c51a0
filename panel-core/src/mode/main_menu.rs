use super::{HostMessage, ListMenu, ModeContext, ModeId, SelectOutcome};

const ITEM_MODULE: usize = 0;
const ITEM_PRESET: usize = 1;
const ITEM_LEARN: usize = 2;
const ITEM_SAVE: usize = 3;
const ITEM_HOME: usize = 4;
const ITEM_COUNT: usize = 5;

#[derive(Debug, Default)]
pub struct MainMenu;

impl ListMenu for MainMenu {
    fn item_count(&self, _ctx: &ModeContext<'_>) -> usize {
        ITEM_COUNT
    }

    fn item_text(&self, ctx: &ModeContext<'_>, index: usize) -> String {
        match index {
            ITEM_MODULE => match ctx.current_module() {
                Some(module) => module.label(),
                None => ctx.device.module_id.clone().unwrap_or_default(),
            },
            ITEM_PRESET => ctx
                .model
                .current_preset(ctx.rack_id())
                .unwrap_or_else(|| "No Preset".to_string()),
            ITEM_LEARN => {
                if ctx.device.midi_learn {
                    "Midi Learn        [X]".to_string()
                } else {
                    "Midi Learn        [ ]".to_string()
                }
            }
            ITEM_SAVE => "Save".to_string(),
            ITEM_HOME => "Home".to_string(),
            _ => String::new(),
        }
    }

    fn on_select(&mut self, ctx: &mut ModeContext<'_>, index: usize) -> SelectOutcome {
        match index {
            ITEM_MODULE => ctx.change_mode(ModeId::ModuleMenu),
            ITEM_PRESET => ctx.change_mode(ModeId::PresetMenu),
            ITEM_LEARN => {
                let on = !ctx.device.midi_learn;
                ctx.device.set_midi_learn(on);
                log::info!(target: "panel::mode", "midi learn {}", if on { "on" } else { "off" });
                return SelectOutcome::RedrawItem;
            }
            ITEM_SAVE => {
                let rack_id = ctx.rack_id().to_string();
                if let Err(e) = ctx.model.save_settings(&rack_id) {
                    log::warn!(target: "panel::mode", "save failed: {}", e);
                }
                ctx.change_mode(ModeId::Parameter);
            }
            ITEM_HOME => {
                ctx.change_mode(ModeId::Parameter);
                ctx.send_host(HostMessage::GoHome);
            }
            _ => {}
        }
        SelectOutcome::Handled
    }
}
