//! Soft takeover for the four physical pots.
//!
//! After a page change or an external value change a pot's physical
//! position no longer matches the parameter it controls. The channel stays
//! locked until the pot crosses the parameter's current value, so turning it
//! never makes the value jump.

pub const POT_COUNT: usize = 4;

/// Full-scale raw pot reading.
pub const MAX_POT_VALUE: f32 = 1023.0;

/// Map a raw reading onto 0.0..=1.0.
pub fn normalize(raw: f32) -> f32 {
    (raw / MAX_POT_VALUE).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    Unlocked,
    /// Pot reads above the parameter; unlock once it comes down to it.
    WaitForLess,
    /// Pot reads below the parameter; unlock once it comes up to it.
    WaitForGreater,
    #[default]
    Locked,
}

#[derive(Debug, Clone, Default)]
pub struct PotChannel {
    state: LockState,
    last_raw: Option<f32>,
}

impl PotChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// Last physical reading, `None` until the pot has been moved.
    pub fn last_raw(&self) -> Option<f32> {
        self.last_raw
    }

    pub fn relock(&mut self) {
        self.state = LockState::Locked;
    }

    /// Feed one reading through the lock.
    ///
    /// `mapping` turns the raw reading into `(calc, current)`: the value the
    /// pot position stands for and the parameter's current value. It returns
    /// `None` when the parameter cannot be found, which leaves the lock alone.
    /// Returns `calc` when the channel is unlocked after this sample and the
    /// value should be written to the model.
    pub fn sample<T, F>(&mut self, raw: Option<f32>, mapping: F) -> Option<T>
    where
        T: PartialOrd,
        F: FnOnce(f32) -> Option<(T, T)>,
    {
        let raw = raw?;
        self.last_raw = Some(raw);
        let (calc, current) = mapping(raw)?;

        self.state = match self.state {
            LockState::Locked => match calc.partial_cmp(&current) {
                Some(std::cmp::Ordering::Equal) => LockState::Unlocked,
                Some(std::cmp::Ordering::Greater) => LockState::WaitForLess,
                Some(std::cmp::Ordering::Less) => LockState::WaitForGreater,
                None => LockState::Locked,
            },
            LockState::WaitForLess if calc <= current => LockState::Unlocked,
            LockState::WaitForGreater if calc >= current => LockState::Unlocked,
            state => state,
        };

        (self.state == LockState::Unlocked).then_some(calc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn against(current: f32) -> impl FnOnce(f32) -> Option<(f32, f32)> {
        move |raw| Some((raw, current))
    }

    #[test]
    fn approaching_from_above_unlocks_on_crossing() {
        let mut pot = PotChannel::new();
        assert_eq!(pot.sample(Some(0.7), against(0.5)), None);
        assert_eq!(pot.state(), LockState::WaitForLess);
        assert_eq!(pot.sample(Some(0.6), against(0.5)), None);
        assert_eq!(pot.state(), LockState::WaitForLess);
        assert_eq!(pot.sample(Some(0.4), against(0.5)), Some(0.4));
        assert_eq!(pot.state(), LockState::Unlocked);
    }

    #[test]
    fn approaching_from_below_unlocks_on_crossing() {
        let mut pot = PotChannel::new();
        assert_eq!(pot.sample(Some(0.1), against(0.5)), None);
        assert_eq!(pot.state(), LockState::WaitForGreater);
        assert_eq!(pot.sample(Some(0.5), against(0.5)), Some(0.5));
    }

    #[test]
    fn matching_value_unlocks_immediately() {
        let mut pot = PotChannel::new();
        assert_eq!(pot.sample(Some(0.5), against(0.5)), Some(0.5));
    }

    #[test]
    fn unlocked_forwards_every_sample() {
        let mut pot = PotChannel::new();
        pot.sample(Some(0.5), against(0.5));
        assert_eq!(pot.sample(Some(0.9), against(0.5)), Some(0.9));
        assert_eq!(pot.sample(Some(0.0), against(0.9)), Some(0.0));
    }

    #[test]
    fn sentinel_changes_nothing() {
        let mut pot = PotChannel::new();
        assert_eq!(pot.sample(None, against(0.5)), None);
        assert_eq!(pot.state(), LockState::Locked);
        assert_eq!(pot.last_raw(), None);
    }

    #[test]
    fn lookup_miss_records_raw_but_keeps_lock() {
        let mut pot = PotChannel::new();
        let out: Option<f32> = pot.sample(Some(300.0), |_| None);
        assert_eq!(out, None);
        assert_eq!(pot.state(), LockState::Locked);
        assert_eq!(pot.last_raw(), Some(300.0));
    }

    #[test]
    fn relock_requires_new_crossing() {
        let mut pot = PotChannel::new();
        pot.sample(Some(0.5), against(0.5));
        pot.relock();
        assert_eq!(pot.sample(Some(0.8), against(0.2)), None);
        assert_eq!(pot.state(), LockState::WaitForLess);
    }

    #[test]
    fn normalize_clamps() {
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(1023.0), 1.0);
        assert_eq!(normalize(2000.0), 1.0);
    }
}
