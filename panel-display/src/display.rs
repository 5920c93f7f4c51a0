use std::sync::{Arc, Mutex};

use crate::command::DisplayCommand;
use crate::link::DisplayLink;
use crate::osc;

/// Screen width in pixels.
pub const SCREEN_WIDTH: i32 = 128;
/// Height of one text line in pixels, including the gap.
pub const LINE_HEIGHT: i32 = 11;
const FIRST_LINE_Y: i32 = 9;
const POPUP_LARGE_TEXT_LIMIT: usize = 12;

/// Receiver of drawing commands.
pub trait DisplaySink {
    fn submit(&mut self, cmd: &DisplayCommand);
}

/// Encodes commands as OSC and queues them on a [`DisplayLink`].
pub struct OscSink {
    link: DisplayLink,
    screen: i32,
}

impl OscSink {
    pub fn new(link: DisplayLink, screen: i32) -> Self {
        Self { link, screen }
    }

    pub fn link(&self) -> &DisplayLink {
        &self.link
    }
}

impl DisplaySink for OscSink {
    fn submit(&mut self, cmd: &DisplayCommand) {
        match osc::encode(self.screen, cmd) {
            Ok(bytes) => {
                self.link.enqueue(&bytes);
            }
            Err(e) => {
                log::warn!(target: "panel::display", "failed to encode {:?}: {}", cmd, e);
            }
        }
    }
}

/// Keeps every submitted command. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<DisplayCommand>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<DisplayCommand> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<DisplayCommand> {
        std::mem::take(&mut *self.log.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Texts of all print commands, in order.
    pub fn texts(&self) -> Vec<String> {
        self.commands()
            .iter()
            .filter_map(|c| c.text().map(str::to_string))
            .collect()
    }
}

impl DisplaySink for RecordingSink {
    fn submit(&mut self, cmd: &DisplayCommand) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(cmd.clone());
    }
}

/// Screen-level drawing on top of a [`DisplaySink`].
///
/// A disconnected display accepts every call and does nothing.
pub struct Display {
    sink: Option<Box<dyn DisplaySink>>,
}

impl Display {
    pub fn new(sink: Box<dyn DisplaySink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn osc(link: DisplayLink, screen: i32) -> Self {
        Self::new(Box::new(OscSink::new(link, screen)))
    }

    pub fn disconnected() -> Self {
        Self { sink: None }
    }

    /// A display that records into the returned sink.
    pub fn recording() -> (Self, RecordingSink) {
        let sink = RecordingSink::new();
        (Self::new(Box::new(sink.clone())), sink)
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    fn emit(&mut self, cmd: DisplayCommand) {
        if let Some(sink) = self.sink.as_mut() {
            sink.submit(&cmd);
        }
    }

    /// Top pixel row of text line `n` (1-based).
    pub fn line_y(n: usize) -> i32 {
        (n as i32 - 1) * LINE_HEIGHT + FIRST_LINE_Y
    }

    /// Blank the text area.
    pub fn clear(&mut self) {
        self.emit(DisplayCommand::FillArea { x: 0, y: 8, w: SCREEN_WIDTH, h: 45, on: false });
    }

    /// Replace text line `n` (1-based). Line 0 is ignored.
    pub fn line(&mut self, n: usize, text: &str) {
        if n == 0 {
            return;
        }
        let y = Self::line_y(n);
        self.emit(DisplayCommand::FillArea { x: 0, y, w: SCREEN_WIDTH, h: 10, on: false });
        self.emit(DisplayCommand::Print {
            x: 2,
            y,
            size: 8,
            on: true,
            text: text.to_string(),
        });
    }

    /// Toggle the highlight on line `n` (1-based).
    pub fn invert_line(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let y = Self::line_y(n);
        self.emit(DisplayCommand::InvertArea { x: 0, y: y - 1, w: SCREEN_WIDTH, h: 10 });
    }

    /// Framed message box over the text area.
    pub fn popup(&mut self, text: &str, double_line: bool) {
        if double_line {
            self.emit(DisplayCommand::FillArea { x: 2, y: 12, w: 118, h: 38, on: false });
            self.emit(DisplayCommand::Box { x: 2, y: 12, w: 118, h: 38, on: true });
        } else {
            self.emit(DisplayCommand::FillArea { x: 4, y: 14, w: 114, h: 34, on: false });
        }
        self.emit(DisplayCommand::Box { x: 4, y: 14, w: 114, h: 34, on: true });
        let size = if text.chars().count() > POPUP_LARGE_TEXT_LIMIT { 8 } else { 16 };
        self.emit(DisplayCommand::Print {
            x: 10,
            y: 24,
            size,
            on: true,
            text: text.to_string(),
        });
    }

    /// Present everything drawn since the last flip.
    pub fn flip(&mut self) {
        self.emit(DisplayCommand::Flip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_geometry() {
        let (mut display, rec) = Display::recording();
        display.line(3, "Res");
        assert_eq!(
            rec.commands(),
            vec![
                DisplayCommand::FillArea { x: 0, y: 31, w: 128, h: 10, on: false },
                DisplayCommand::Print { x: 2, y: 31, size: 8, on: true, text: "Res".into() },
            ]
        );
    }

    #[test]
    fn invert_sits_one_pixel_above_line() {
        let (mut display, rec) = Display::recording();
        display.invert_line(1);
        assert_eq!(
            rec.commands(),
            vec![DisplayCommand::InvertArea { x: 0, y: 8, w: 128, h: 10 }]
        );
    }

    #[test]
    fn popup_text_size_depends_on_length() {
        let (mut display, rec) = Display::recording();
        display.popup("Page 1", false);
        display.popup("a rather long title", true);
        let sizes: Vec<i32> = rec
            .commands()
            .iter()
            .filter_map(|c| match c {
                DisplayCommand::Print { size, .. } => Some(*size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![16, 8]);
    }

    #[test]
    fn double_popup_draws_outer_frame() {
        let (mut display, rec) = Display::recording();
        display.popup("x", true);
        let cmds = rec.commands();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[1], DisplayCommand::Box { x: 2, y: 12, w: 118, h: 38, on: true });
    }

    #[test]
    fn disconnected_display_ignores_calls() {
        let mut display = Display::disconnected();
        assert!(!display.is_connected());
        display.clear();
        display.line(1, "nothing");
        display.popup("nothing", true);
        display.flip();
    }

    #[test]
    fn line_zero_is_ignored() {
        let (mut display, rec) = Display::recording();
        display.line(0, "x");
        display.invert_line(0);
        assert!(rec.commands().is_empty());
    }
}
