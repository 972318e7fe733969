// Keyseq CLI
// Grabs evdev keyboards and replaces typed key sequences through uinput

#[cfg(feature = "pure-rust")]
use std::path::PathBuf;
#[cfg(feature = "pure-rust")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "pure-rust")]
use std::sync::Arc;

#[cfg(feature = "pure-rust")]
use anyhow::{bail, Context};
#[cfg(feature = "pure-rust")]
use clap::Parser;

#[cfg(feature = "pure-rust")]
use keyseq_core::diagnostics::{decision_log, Decision, DecisionLog, DEFAULT_QUEUE_DEPTH};
#[cfg(feature = "pure-rust")]
use keyseq_core::event::{EventLoop, InputEvent};
#[cfg(feature = "pure-rust")]
use keyseq_core::{
    is_key_event, Action, Config, DeviceFilter, Dispatcher, KeyCode, KeyCodeSet, Route,
    VirtualDevice,
};

/// Keystroke sequence remapper
#[cfg(feature = "pure-rust")]
#[derive(Parser, Debug)]
#[command(name = "keyseq")]
#[command(version)]
#[command(about = "Replace typed key sequences with a single character", long_about = None)]
struct Args {
    /// TOML configuration file (defaults to ~/.config/keyseq/config.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Only read these devices, by name or path (can be used multiple times)
    #[arg(short, long, value_name = "DEVICE")]
    devices: Vec<String>,

    /// Enable debug logging, including one record per key
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// List available keyboard devices
    #[arg(long)]
    list_devices: bool,

    /// Read devices without grabbing them and log decisions without emitting
    #[arg(long)]
    dry_run: bool,
}

#[cfg(feature = "pure-rust")]
struct Application {
    config: Config,
    args: Args,
    /// Cleared by the signal thread or the eject key
    running: Arc<AtomicBool>,
}

#[cfg(feature = "pure-rust")]
impl Application {
    fn new(args: Args) -> anyhow::Result<Self> {
        let config = match &args.config {
            Some(path) => Config::from_toml_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::load_default().context("loading default config")?,
        };

        Ok(Self {
            config,
            args,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    fn validate(&self) -> anyhow::Result<()> {
        let engine = self.config.build_engine()?;
        println!("Configuration is valid");
        println!(
            "  capacity={} keycodes={} filter={}",
            engine.capacity(),
            engine.translator().code_set(),
            self.config.event_filter
        );
        for trigger in engine.triggers().iter() {
            println!("  {}", trigger);
        }
        Ok(())
    }

    fn list_devices() -> anyhow::Result<()> {
        let devices = EventLoop::list_devices().context("finding keyboard devices")?;
        println!("Found {} keyboard device(s):", devices.len());
        for device in &devices {
            match &device.path {
                Some(path) => println!("  {}: {} ({})", device.index, device.name, path),
                None => println!("  {}: {}", device.index, device.name),
            }
        }
        Ok(())
    }

    /// CLI --devices > config [devices].only > autodetect
    fn device_filter(&self) -> DeviceFilter {
        if self.args.devices.is_empty() {
            self.config.device_filter.clone()
        } else {
            DeviceFilter::new(self.args.devices.clone())
        }
    }

    fn install_signal_handler(&self) -> anyhow::Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM]).context("installing signal handler")?;
        let running = Arc::clone(&self.running);
        std::thread::Builder::new()
            .name("keyseq-signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    log::info!("received signal {}, shutting down", signal);
                    running.store(false, Ordering::SeqCst);
                }
            })
            .context("spawning signal thread")?;
        Ok(())
    }

    fn run(&self) -> anyhow::Result<()> {
        // Evdev reports Linux keycodes; the mac table is for other hosts.
        if self.config.code_set != KeyCodeSet::Evdev {
            bail!(
                "keycodes = \"{}\" cannot be used with evdev devices",
                self.config.code_set
            );
        }

        let engine = self.config.build_engine()?;
        log::info!(
            "{} trigger(s), buffer capacity {}",
            engine.triggers().len(),
            engine.capacity()
        );
        let mut dispatcher = Dispatcher::new(engine, self.config.event_filter)
            .with_eject_key(self.config.emergency_eject_key)
            .with_reset_key(self.config.reset_key);

        self.install_signal_handler()?;

        let (decisions, drain) = decision_log(DEFAULT_QUEUE_DEPTH);
        let drain_handle = drain.spawn().context("spawning decision log thread")?;

        let grab = !self.args.dry_run;
        let filter = self.device_filter();
        if filter.is_autodetect() {
            log::debug!("autodetecting keyboards");
        } else {
            log::debug!("device filter: {:?}", filter.entries());
        }
        let mut event_loop = EventLoop::open(&filter, grab)?;
        log::info!(
            "reading {} device(s): {:?}{}",
            event_loop.device_count(),
            event_loop.device_names(),
            if grab { "" } else { " (dry run, not grabbed)" }
        );

        let mut output_device = if grab {
            let mut device = VirtualDevice::new()?;
            device.set_throttle_delays(
                self.config.key_pre_delay_ms,
                self.config.key_post_delay_ms,
            );
            Some(device)
        } else {
            None
        };

        let result = self.run_main_loop(
            &mut event_loop,
            &mut dispatcher,
            output_device.as_mut(),
            &decisions,
        );

        // Cleanup: ungrab devices and release keys
        event_loop.ungrab_all();
        if let Some(device) = output_device.as_mut() {
            if let Err(e) = device.release_all() {
                log::warn!("releasing held keys failed: {}", e);
            }
        }

        let stats = dispatcher.engine().stats();
        log::info!(
            "mapped={} unmapped={} replaced={} dropped log records={}",
            stats.mapped,
            stats.unmapped,
            stats.replaced,
            decisions.dropped()
        );

        drop(decisions);
        let _ = drain_handle.join();

        result
    }

    fn run_main_loop(
        &self,
        event_loop: &mut EventLoop,
        dispatcher: &mut Dispatcher,
        mut output_device: Option<&mut VirtualDevice>,
        decisions: &DecisionLog,
    ) -> anyhow::Result<()> {
        println!("keyseq is running. Press Ctrl+C to exit.");

        while self.running.load(Ordering::SeqCst) {
            let events = event_loop
                .poll_for_events(self.config.poll_timeout_ms)
                .context("reading input devices")?;
            for event in events {
                let route =
                    dispatcher.on_event(event.event_type().0, event.code(), event.value());

                if decisions.enabled() && is_key_event(event.event_type().0) {
                    if let Some(action) = Action::from_value(event.value()) {
                        decisions.record(Decision {
                            code: KeyCode(event.code()),
                            action,
                            route,
                            buffer: dispatcher.engine().buffer().iter().copied().collect(),
                        });
                    }
                }

                if route == Route::Eject {
                    log::warn!("emergency eject key pressed, stopping keyseq");
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }

                if let Some(device) = output_device.as_deref_mut() {
                    emit(device, dispatcher, &event, route);
                }
            }

            // Keys held on a vanished keyboard will never be released.
            let lost = event_loop.take_lost_devices();
            if !lost.is_empty() {
                log::warn!("lost {:?}, clearing sequence state", lost);
                dispatcher.reset();
                if let Some(device) = output_device.as_deref_mut() {
                    if let Err(e) = device.release_all() {
                        log::warn!("releasing held keys failed: {}", e);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Carry out one routing decision on the virtual device.
///
/// A replacement that cannot be typed falls back to forwarding the
/// original key-down, so the keystroke is never lost.
#[cfg(feature = "pure-rust")]
fn emit(device: &mut VirtualDevice, dispatcher: &mut Dispatcher, event: &InputEvent, route: Route) {
    let result = match route {
        Route::Forward => device.forward(event),
        Route::Swallow | Route::Eject => Ok(()),
        Route::Replace(symbol) => match device.emit_replacement(symbol) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("cannot type {:?}: {}, passing key through", symbol, e);
                dispatcher.replacement_failed(KeyCode(event.code()));
                device.forward(event)
            }
        },
    };
    if let Err(e) = result {
        log::error!("error sending output: {}", e);
    }
}

#[cfg(feature = "pure-rust")]
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

#[cfg(feature = "pure-rust")]
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Handle list-devices flag (doesn't require config)
    if args.list_devices {
        return Application::list_devices();
    }

    let app = Application::new(args)?;

    if app.args.check_config {
        return app.validate();
    }

    app.run()
}

// Stub for when pure-rust feature is not enabled
#[cfg(not(feature = "pure-rust"))]
fn main() {
    eprintln!("Error: keyseq binary requires the 'pure-rust' feature to be enabled.");
    eprintln!("Please build with: cargo build --release --features pure-rust --bin keyseq");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "pure-rust")]
    fn test_args_parsing() {
        let args = Args::parse_from(["keyseq", "--config", "/tmp/test.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert!(args.devices.is_empty());
        assert!(!args.verbose);
        assert!(!args.check_config);
        assert!(!args.list_devices);
        assert!(!args.dry_run);
    }

    #[test]
    #[cfg(feature = "pure-rust")]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "keyseq",
            "--verbose",
            "--dry-run",
            "--devices",
            "/dev/input/event0",
            "--devices",
            "AT Translated Set 2 keyboard",
        ]);

        assert_eq!(args.config, None);
        assert!(args.verbose);
        assert!(args.dry_run);
        assert_eq!(args.devices.len(), 2);
        assert_eq!(args.devices[1], "AT Translated Set 2 keyboard");
    }

    #[test]
    #[cfg(feature = "pure-rust")]
    fn test_args_check_config() {
        let args = Args::parse_from(["keyseq", "--config", "/tmp/test.toml", "--check-config"]);

        assert!(args.check_config);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    #[cfg(feature = "pure-rust")]
    fn test_cli_devices_override_config() {
        let config = Config::from_toml("[devices]\nonly = [\"from-config\"]\n").unwrap();
        let app = Application {
            config,
            args: Args::parse_from(["keyseq", "--devices", "from-cli"]),
            running: Arc::new(AtomicBool::new(true)),
        };
        assert_eq!(app.device_filter().entries(), &["from-cli".to_string()]);

        let app = Application {
            args: Args::parse_from(["keyseq"]),
            ..app
        };
        assert_eq!(app.device_filter().entries(), &["from-config".to_string()]);
    }
}
