use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::mode::Timing;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    display: DisplayConfig,
    #[serde(default)]
    input: InputConfig,
    #[serde(default)]
    host: HostConfig,
    #[serde(default)]
    midi: MidiConfig,
    #[serde(default)]
    timing: TimingConfig,
    #[serde(default)]
    rack: RackConfig,
}

#[derive(Deserialize, Default)]
struct DisplayConfig {
    host: Option<String>,
    port: Option<u16>,
    screen: Option<i32>,
    queue_capacity: Option<usize>,
}

#[derive(Deserialize, Default)]
struct InputConfig {
    listen_port: Option<u16>,
}

#[derive(Deserialize, Default)]
struct HostConfig {
    port: Option<u16>,
}

#[derive(Deserialize, Default)]
struct MidiConfig {
    input_port: Option<String>,
}

#[derive(Deserialize, Default)]
struct TimingConfig {
    poll_interval_ms: Option<u64>,
    page_popup_ticks: Option<u32>,
    module_popup_ticks: Option<u32>,
    menu_timeout_ticks: Option<u32>,
}

#[derive(Deserialize, Default)]
struct RackConfig {
    id: Option<String>,
}

pub struct Config {
    file: ConfigFile,
}

impl Config {
    /// Embedded defaults overlaid with the user's config file, if any.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Embedded defaults overlaid with `path` when it exists and parses.
    pub fn load_from(path: Option<&Path>) -> Self {
        let mut base: ConfigFile = match toml::from_str(DEFAULT_CONFIG) {
            Ok(base) => base,
            Err(e) => {
                log::error!(target: "config", "embedded config.toml is invalid: {}", e);
                ConfigFile::default()
            }
        };

        if let Some(path) = path {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => merge(&mut base, user),
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config { file: base }
    }

    /// Where screen updates are sent.
    pub fn display_addr(&self) -> SocketAddr {
        let ip = self
            .file
            .display
            .host
            .as_deref()
            .and_then(|h| h.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        SocketAddr::new(ip, self.file.display.port.unwrap_or(4001))
    }

    pub fn screen(&self) -> i32 {
        self.file.display.screen.unwrap_or(3)
    }

    /// Outbound display queue length (clamped to 16..=65536).
    pub fn queue_capacity(&self) -> usize {
        self.file
            .display
            .queue_capacity
            .unwrap_or(512)
            .clamp(16, 65_536)
    }

    pub fn listen_port(&self) -> u16 {
        self.file.input.listen_port.unwrap_or(4000)
    }

    /// Where host messages (`goHome`, `midiOutGate`, ...) are sent.
    pub fn host_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.file.host.port.unwrap_or(4002))
    }

    /// MIDI input port to open, `None` when MIDI is disabled.
    pub fn midi_input_port(&self) -> Option<&str> {
        self.file
            .midi
            .input_port
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Poll period (clamped to 1..=1000 ms).
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.file.timing.poll_interval_ms.unwrap_or(20).clamp(1, 1000))
    }

    pub fn timing(&self) -> Timing {
        let fallback = Timing::default();
        Timing {
            page_popup_ticks: self
                .file
                .timing
                .page_popup_ticks
                .unwrap_or(fallback.page_popup_ticks),
            module_popup_ticks: self
                .file
                .timing
                .module_popup_ticks
                .unwrap_or(fallback.module_popup_ticks),
            menu_timeout_ticks: self
                .file
                .timing
                .menu_timeout_ticks
                .unwrap_or(fallback.menu_timeout_ticks),
        }
    }

    pub fn rack_id(&self) -> &str {
        self.file.rack.id.as_deref().unwrap_or("local")
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("panel").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.display.host.is_some() {
        base.display.host = user.display.host;
    }
    if user.display.port.is_some() {
        base.display.port = user.display.port;
    }
    if user.display.screen.is_some() {
        base.display.screen = user.display.screen;
    }
    if user.display.queue_capacity.is_some() {
        base.display.queue_capacity = user.display.queue_capacity;
    }
    if user.input.listen_port.is_some() {
        base.input.listen_port = user.input.listen_port;
    }
    if user.host.port.is_some() {
        base.host.port = user.host.port;
    }
    if user.midi.input_port.is_some() {
        base.midi.input_port = user.midi.input_port;
    }
    if user.timing.poll_interval_ms.is_some() {
        base.timing.poll_interval_ms = user.timing.poll_interval_ms;
    }
    if user.timing.page_popup_ticks.is_some() {
        base.timing.page_popup_ticks = user.timing.page_popup_ticks;
    }
    if user.timing.module_popup_ticks.is_some() {
        base.timing.module_popup_ticks = user.timing.module_popup_ticks;
    }
    if user.timing.menu_timeout_ticks.is_some() {
        base.timing.menu_timeout_ticks = user.timing.menu_timeout_ticks;
    }
    if user.rack.id.is_some() {
        base.rack.id = user.rack.id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_embedded_config() {
        let config = Config::load_from(None);
        assert_eq!(config.display_addr(), "127.0.0.1:4001".parse().unwrap());
        assert_eq!(config.screen(), 3);
        assert_eq!(config.queue_capacity(), 512);
        assert_eq!(config.listen_port(), 4000);
        assert_eq!(config.host_addr().port(), 4002);
        assert_eq!(config.midi_input_port(), None);
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert_eq!(config.timing(), Timing::default());
        assert_eq!(config.rack_id(), "local");
    }

    #[test]
    fn test_user_file_overrides_single_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nmenu_timeout_ticks = 100\n\n[midi]\ninput_port = \"nanoKONTROL\"").unwrap();

        let config = Config::load_from(Some(file.path()));
        assert_eq!(config.timing().menu_timeout_ticks, 100);
        assert_eq!(config.timing().page_popup_ticks, 50);
        assert_eq!(config.midi_input_port(), Some("nanoKONTROL"));
        assert_eq!(config.display_addr().port(), 4001);
    }

    #[test]
    fn test_malformed_user_file_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display\nport = ").unwrap();

        let config = Config::load_from(Some(file.path()));
        assert_eq!(config.display_addr().port(), 4001);
    }

    #[test]
    fn test_missing_user_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(&dir.path().join("absent.toml")));
        assert_eq!(config.rack_id(), "local");
    }

    #[test]
    fn test_clamped_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nqueue_capacity = 1\n[timing]\npoll_interval_ms = 0").unwrap();

        let config = Config::load_from(Some(file.path()));
        assert_eq!(config.queue_capacity(), 16);
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
