//! seqconnect: connect, list, and snapshot ALSA sequencer ports.
//!
//! ```bash
//! seqconnect 'Keystation' 'FLUID Synth'      # connect
//! seqconnect -d 24:0 128:0                    # disconnect
//! seqconnect -l -i                            # list readable ports
//! seqconnect -s > studio.toml                 # save all connections
//! seqconnect -S studio.toml                   # restore them
//! ```

mod backend;

use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use seqconnect_core::command::Command;
use seqconnect_core::graph::PortFilter;
use seqconnect_core::response::Response;
use seqconnect_core::types::{Settings, SubscriptionAttrs};


/// ALSA sequencer connection manager
#[derive(Parser, Debug)]
#[command(name = "seqconnect", version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .args(["disconnect", "list", "ports", "remove_all", "serialize", "deserialize"])
))]
struct Cli {
    /// Disconnect instead of connect
    #[arg(short, long)]
    disconnect: bool,

    /// Exclusive connection
    #[arg(short, long)]
    exclusive: bool,

    /// Convert real-time timestamps on queue
    #[arg(short, long, value_name = "QUEUE", conflicts_with = "tick")]
    real: Option<i32>,

    /// Convert tick timestamps on queue
    #[arg(short, long, value_name = "QUEUE")]
    tick: Option<i32>,

    /// List current connections of each port
    #[arg(short, long)]
    list: bool,

    /// List only port names (for shell completion)
    #[arg(short, long)]
    ports: bool,

    /// Only list input (readable) ports
    #[arg(short, long)]
    input: bool,

    /// Only list output (writable) ports
    #[arg(short, long)]
    output: bool,

    /// Print the listing as JSON
    #[arg(long, requires = "list")]
    json: bool,

    /// Remove all exported connections
    #[arg(short = 'x', long = "removeall")]
    remove_all: bool,

    /// Print current connections as TOML
    #[arg(short, long)]
    serialize: bool,

    /// Restore connections from a TOML file
    #[arg(short = 'S', long, value_name = "FILE")]
    deserialize: Option<PathBuf>,

    /// Keep existing connections when restoring
    #[arg(short, long, requires = "deserialize")]
    keep_existing: bool,

    /// Pause between connections while restoring, in milliseconds
    #[arg(long, value_name = "MS")]
    settle_delay: Option<u64>,

    /// Settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Sender and receiver, each `client:port`
    #[arg(value_name = "ADDRESS")]
    addresses: Vec<String>,
}


impl Cli {
    fn filter(&self) -> PortFilter {
        PortFilter::new(self.input, self.output)
    }

    fn attrs(&self) -> SubscriptionAttrs {
        let attrs = match (self.real, self.tick) {
            (Some(queue), _) => SubscriptionAttrs::real(queue),
            (None, Some(queue)) => SubscriptionAttrs::tick(queue),
            (None, None) => SubscriptionAttrs::default(),
        };
        attrs.exclusive(self.exclusive)
    }

    /// Turn the flags into a single command.
    fn command(&self) -> Result<Command, String> {
        if self.list {
            return Ok(Command::List {
                filter: self.filter(),
                json: self.json,
            });
        }
        if self.ports {
            return Ok(Command::Ports {
                filter: self.filter(),
            });
        }
        if self.remove_all {
            return Ok(Command::RemoveAll);
        }
        if self.serialize {
            return Ok(Command::Serialize);
        }
        if let Some(path) = &self.deserialize {
            return Ok(Command::Deserialize {
                path: path.clone(),
                remove_first: !self.keep_existing,
            });
        }

        let [sender, dest] = self.addresses.as_slice() else {
            return Err("expected a sender and a receiver address. Run 'seqconnect --help' for usage.".into());
        };
        let (sender, dest, attrs) = (sender.clone(), dest.clone(), self.attrs());
        Ok(if self.disconnect {
            Command::Disconnect {
                sender,
                dest,
                attrs,
            }
        } else {
            Command::Connect {
                sender,
                dest,
                attrs,
            }
        })
    }
}


fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let mut settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("seqconnect: {}", e);
            process::exit(1);
        }
    };
    if let Some(ms) = cli.settle_delay {
        settings.settle_delay_ms = ms;
    }

    if let Err(e) = init_logging(cli.log_level.as_deref(), &settings.log_level) {
        eprintln!("seqconnect: {}", e);
        process::exit(1);
    }
    tracing::debug!(?settings, "settings loaded");

    let cmd = match cli.command() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("seqconnect: {}", e);
            process::exit(1);
        }
    };

    let response = match backend::run(cmd, settings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("seqconnect: {}", e);
            process::exit(1);
        }
    };

    match response {
        Response::Ok { output } => {
            if !output.is_empty() {
                print!("{}", output);
                if !output.ends_with('\n') {
                    println!();
                }
            }
        }
        Response::Error { message } => {
            eprintln!("seqconnect: {}", message);
            process::exit(1);
        }
    }
}


fn load_settings(explicit: Option<&std::path::Path>) -> seqconnect_core::Result<Settings> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => resolve_config_dir().join("config.toml"),
    };
    Settings::load(&path)
}


fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SEQCONNECT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("seqconnect")
}


/// Install the tracing subscriber. `--log-level` wins over `RUST_LOG`,
/// which wins over the settings file.
fn init_logging(flag: Option<&str>, configured: &str) -> Result<(), String> {
    let filter = match flag {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(configured)),
    }
    .map_err(|e| format!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    Ok(())
}
