mod host;
mod input;
mod midi;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use panel_core::config::Config;
use panel_core::{rack_file, ModeController};
use panel_display::{Display, DisplayLink};
use panel_types::MemoryModel;

use host::HostSender;
use input::InputListener;
use midi::MidiCcInput;

const DEMO_RACK: &str = include_str!("../demo_rack.toml");

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("panel")
        .join("panel.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path).or_else(|_| File::create("/tmp/panel.log")) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("panel: cannot create log file: {}", e);
            return;
        }
    };

    if let Err(e) = WriteLogger::init(log_level, simplelog::Config::default(), log_file) {
        eprintln!("panel: logger already initialised: {}", e);
        return;
    }

    log::info!("panel starting (log level: {:?})", log_level);
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    rack: Option<PathBuf>,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Args {
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(PathBuf::from)
    };
    Args {
        config: value_of("--config"),
        rack: value_of("--rack"),
        verbose: args.iter().any(|a| a == "--verbose" || a == "-v"),
    }
}

/// The rack file given on the command line, else the built-in demo rack.
fn load_model(rack: Option<&Path>) -> MemoryModel {
    if let Some(path) = rack {
        match rack_file::load(path) {
            Ok(model) => return model,
            Err(e) => log::error!("rack {}: {}, using the demo rack", path.display(), e),
        }
    }
    rack_file::parse(DEMO_RACK).unwrap_or_else(|e| {
        log::error!("demo rack: {}", e);
        MemoryModel::new()
    })
}

/// The configured rack when the model has it, else the model's first rack.
fn resolve_rack_id(model: &MemoryModel, configured: &str) -> String {
    if model.rack_ids().any(|id| id == configured) {
        return configured.to_string();
    }
    match model.rack_ids().next() {
        Some(first) => {
            log::warn!("rack {} not loaded, using {}", configured, first);
            first.to_string()
        }
        None => configured.to_string(),
    }
}

fn open_display(config: &Config) -> Display {
    match DisplayLink::connect(config.display_addr(), config.queue_capacity()) {
        Ok(link) => Display::osc(link, config.screen()),
        Err(e) => {
            log::warn!(
                target: "panel::display",
                "display {} unavailable ({}), running without a screen",
                config.display_addr(),
                e
            );
            Display::disconnected()
        }
    }
}

fn flush_host(controller: &mut ModeController<MemoryModel>, host: Option<&HostSender>) {
    for msg in controller.take_host_messages() {
        if let Some(host) = host {
            if let Err(e) = host.send(msg) {
                log::warn!(target: "panel::host", "{} not sent: {}", msg.name(), e);
            }
        }
    }
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args);
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load_from(Some(path.as_path())),
        None => Config::load(),
    };

    let model = load_model(args.rack.as_deref());
    let rack_id = resolve_rack_id(&model, config.rack_id());
    let display = open_display(&config);
    let mut controller = ModeController::new(model, display, &rack_id, config.timing());

    let host = match HostSender::new(config.host_addr()) {
        Ok(host) => Some(host),
        Err(e) => {
            log::warn!(target: "panel::host", "host output unavailable: {}", e);
            None
        }
    };
    let mut listener = InputListener::bind(config.listen_port())?;
    let midi = config.midi_input_port().and_then(|name| match MidiCcInput::connect(name) {
        Ok(midi) => Some(midi),
        Err(e) => {
            log::warn!(target: "panel::midi", "{}", e);
            None
        }
    });
    if let Some(midi) = &midi {
        log::debug!(target: "panel::midi", "learning from {}", midi.port_name());
    }

    controller.init();
    flush_host(&mut controller, host.as_ref());

    let poll = config.poll_interval();
    let mut next_tick = Instant::now() + poll;
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match listener.poll(timeout) {
            Ok(events) => {
                for event in events {
                    controller.dispatch(event);
                }
            }
            Err(e) => log::debug!(target: "panel::input", "recv: {}", e),
        }

        if let Some(midi) = &midi {
            for (cc, value) in midi.poll() {
                controller.midi_cc(cc, value);
            }
        }

        let now = Instant::now();
        if now >= next_tick {
            controller.tick();
            next_tick += poll;
            if next_tick < now {
                next_tick = now + poll;
            }
        }

        flush_host(&mut controller, host.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_types::RackModel;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let parsed = parse_args(&args(&["panel", "--rack", "r.toml", "--verbose"]));
        assert_eq!(parsed.rack, Some(PathBuf::from("r.toml")));
        assert_eq!(parsed.config, None);
        assert!(parsed.verbose);
        assert_eq!(parse_args(&args(&["panel"])), Args::default());
    }

    #[test]
    fn demo_rack_is_valid() {
        let model = load_model(None);
        assert_eq!(model.modules("local").len(), 3);
        assert_eq!(model.presets("local"), vec!["Dark".to_string(), "Init".to_string()]);
        assert_eq!(resolve_rack_id(&model, "local"), "local");
    }

    #[test]
    fn bad_rack_file_falls_back_to_demo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rack.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let model = load_model(Some(&path));
        assert!(model.rack("local").is_some());
    }

    #[test]
    fn unknown_configured_rack_uses_loaded_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rack.toml");
        std::fs::write(&path, "[rack]\nid = \"studio\"\n").unwrap();
        let model = load_model(Some(&path));
        assert_eq!(resolve_rack_id(&model, "local"), "studio");
    }
}
