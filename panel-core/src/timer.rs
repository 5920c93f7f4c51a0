/// A tick countdown that fires once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: Option<u32>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start with `ticks` ticks left. Zero fires on the next tick.
    pub fn start(&mut self, ticks: u32) {
        self.remaining = Some(ticks);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Advance one tick. Returns `true` on the tick that runs out.
    pub fn tick(&mut self) -> bool {
        match self.remaining {
            None => false,
            Some(0) | Some(1) => {
                self.remaining = None;
                true
            }
            Some(n) => {
                self.remaining = Some(n - 1);
                false
            }
        }
    }
}
