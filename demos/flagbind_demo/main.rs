//! # flagbind demo application
//!
//! A sample CLI tool that shows how a clap app resolves its flags through
//! flagbind. It exists purely to demonstrate and manually verify the layering.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagbind_demo
//! cargo run --example flagbind_demo -- --port 9000
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature            | How to exercise it                                                        |
//! |--------------------|---------------------------------------------------------------------------|
//! | Compiled defaults  | `cargo run --example flagbind_demo`                                       |
//! | Optional file      | Create `flagbind-demo.yml` in cwd, then run                               |
//! | Required file      | `cargo run --example flagbind_demo -- --config other.toml`                |
//! | Env var            | `FLAGBIND_DEMO_COLOR=red cargo run --example flagbind_demo`               |
//! | Replaced env name  | `FLAGBIND_DEMO_LOG_LEVEL=warn cargo run --example flagbind_demo`          |
//! | Command line wins  | `FLAGBIND_DEMO_PORT=1 cargo run --example flagbind_demo -- --port 2`      |
//! | Single key         | `cargo run --example flagbind_demo -- --key port`                         |
//! | Typed settings     | the `Settings` block at the end of the output                             |
//! | Debug logging      | `cargo run --example flagbind_demo -- --debug`                            |

mod config;

use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use flagbind::{ConfigFileArgs, FlagSet, KeyReplacer, Resolver};

use config::Settings;

/// flagbind demo: prints each setting and the layer it came from.
#[derive(Parser, Debug)]
#[command(name = "flagbind-demo")]
struct Cli {
    /// Hostname to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port number.
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Log level reported by the app.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Terminal color for the output (red, green, yellow, blue, ...).
    #[arg(long, default_value = "")]
    color: String,

    /// Print only this setting.
    #[arg(long)]
    key: Option<String>,

    /// Log what flagbind is doing.
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    config: ConfigFileArgs,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("flagbind=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flagbind=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        _ => RESET,
    }
}

const RESET: &str = "\x1b[0m";

const SHOWN: [&str; 4] = ["host", "port", "log-level", "color"];

fn main() -> ExitCode {
    let cmd = Cli::command();
    let matches = cmd.clone().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing(cli.debug);

    let mut flags = match FlagSet::from_clap(&cmd, &matches) {
        Ok(flags) => flags,
        Err(e) => {
            eprintln!("Invalid flag definitions:\n{e}");
            return ExitCode::FAILURE;
        }
    };

    let builder = Resolver::builder()
        .env_prefix("FLAGBIND_DEMO")
        .env_key_replacer(KeyReplacer::new([("-", "_")]))
        .optional_config_file("flagbind-demo.yml");
    let mut resolver = cli.config.apply(builder).build();

    if let Err(e) = resolver.init(&mut flags) {
        eprintln!("Failed to resolve configuration:\n{e}");
        return ExitCode::FAILURE;
    }

    let store = resolver.store();
    let color = ansi_color_code(flags.get("color").unwrap_or_default());

    let keys: Vec<&str> = match cli.key.as_deref() {
        Some(key) => vec![key],
        None => SHOWN.to_vec(),
    };
    let width = keys.iter().map(|k| k.len()).max().unwrap_or(0);
    for key in keys {
        let Some(value) = flags.get(key) else {
            eprintln!("Unknown key: {key}");
            return ExitCode::FAILURE;
        };
        let source = store
            .source(key)
            .map(|layer| layer.to_string())
            .unwrap_or_else(|| "unset".into());
        println!("{color}{key:<width$}{RESET}  {value}  ({source})");
    }

    if cli.key.is_none() {
        match store.unmarshal::<Settings>() {
            Ok(settings) => println!("\n{settings:#?}"),
            Err(e) => eprintln!("\nCould not decode settings: {e}"),
        }
    }

    ExitCode::SUCCESS
}
