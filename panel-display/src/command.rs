/// One drawing primitive understood by the remote screen.
///
/// Coordinates are pixels on the 128x64 panel. `on` selects the drawing
/// colour (lit or dark).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    FillArea { x: i32, y: i32, w: i32, h: i32, on: bool },
    Box { x: i32, y: i32, w: i32, h: i32, on: bool },
    InvertArea { x: i32, y: i32, w: i32, h: i32 },
    Print { x: i32, y: i32, size: i32, on: bool, text: String },
    Flip,
}

impl DisplayCommand {
    pub fn is_flip(&self) -> bool {
        matches!(self, DisplayCommand::Flip)
    }

    /// Text carried by a print command.
    pub fn text(&self) -> Option<&str> {
        match self {
            DisplayCommand::Print { text, .. } => Some(text),
            _ => None,
        }
    }
}
