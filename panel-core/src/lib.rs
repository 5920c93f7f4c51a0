//! Front-panel control logic: device modes, soft takeover for the pots,
//! scrolling menus, and the controller that ties them to a rack model and
//! the display.

pub mod config;
pub mod controller;
pub mod format;
pub mod menu;
pub mod mode;
pub mod pots;
pub mod rack_file;
pub mod timer;

pub use controller::ModeController;
pub use mode::{DeviceMode, DeviceState, HostMessage, ModeContext, ModeId, Timing};
