use panel_types::Parameter;

/// Characters per display line.
pub const SCREEN_WIDTH: usize = 21;

/// `name   value un`, right-aligning the value and a two-character unit.
pub fn param_line(param: &Parameter, width: usize) -> String {
    let value = param.display_value();
    let unit: String = format!("{}  ", param.unit).chars().take(2).collect();
    let used = param.display_name.chars().count() + value.chars().count() + 1 + unit.chars().count();
    let pad = " ".repeat(width.saturating_sub(used));
    let line = format!("{}{}{} {}", param.display_name, pad, value, unit);
    line.chars().take(width).collect()
}
