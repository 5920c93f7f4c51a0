use std::ops::Range;

/// Number of menu rows visible at once.
pub const MENU_ROWS: usize = 4;

/// What a cursor step did to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStep {
    Unchanged,
    /// Cursor moved within the viewport; both lines are 1-based.
    Moved { old_line: usize, new_line: usize },
    /// Viewport shifted; the whole list needs a redraw.
    Scrolled,
}

/// Cursor and viewport of a scrolling list.
///
/// Keeps `top <= cursor < top + MENU_ROWS` and `cursor < count` whenever the
/// list is not empty.
#[derive(Debug, Clone, Default)]
pub struct MenuNavigator {
    cursor: usize,
    top: usize,
    armed: bool,
}

impl MenuNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn top(&self) -> usize {
        self.top
    }

    /// Put the cursor on `index` at the top of the viewport.
    pub fn focus(&mut self, index: usize, count: usize) {
        if count == 0 {
            self.cursor = 0;
            self.top = 0;
            return;
        }
        self.cursor = index.min(count - 1);
        self.top = self.cursor;
    }

    /// Pull a stale cursor back into a list of `count` items.
    pub fn clamp(&mut self, count: usize) {
        if count == 0 {
            self.cursor = 0;
            self.top = 0;
            return;
        }
        self.cursor = self.cursor.min(count - 1);
        if self.top > self.cursor {
            self.top = self.cursor;
        } else if self.cursor >= self.top + MENU_ROWS {
            self.top = self.cursor + 1 - MENU_ROWS;
        }
    }

    pub fn step(&mut self, delta: i32, count: usize) -> MenuStep {
        if count == 0 || delta == 0 {
            return MenuStep::Unchanged;
        }
        let next = if delta > 0 {
            (self.cursor + 1).min(count - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
        if next == self.cursor {
            return MenuStep::Unchanged;
        }

        let old_line = self.cursor - self.top + 1;
        self.cursor = next;
        if next < self.top {
            self.top = next;
            MenuStep::Scrolled
        } else if next >= self.top + MENU_ROWS {
            self.top = next + 1 - MENU_ROWS;
            MenuStep::Scrolled
        } else {
            MenuStep::Moved {
                old_line,
                new_line: next - self.top + 1,
            }
        }
    }

    /// Item indices currently on screen.
    pub fn visible(&self, count: usize) -> Range<usize> {
        self.top.min(count)..(self.top + MENU_ROWS).min(count)
    }

    /// Screen line (1-based) of `index`, if it is on screen.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        (index >= self.top && index < self.top + MENU_ROWS).then(|| index - self.top + 1)
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Clear the armed flag, returning whether it was set.
    pub fn disarm(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
