//! Console host for the PetMaster plugin.
//!
//! Loads the plugin from a data directory and reads commands from stdin:
//!
//! ```text
//! petm reload      → reload configuration
//! petm info        → plugin information
//! stop             → disable the plugin and exit
//! ```
//!
//! With `--watch`, edits to the TOML files in the data directory trigger a
//! reload as if `petm reload` had been typed.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use url::Url;

use pet_master::commands::NoPetCommands;
use pet_master::config::watcher::ConfigWatcher;
use pet_master::lifecycle::UpdateCheckOptions;
use pet_master::observability::logging;
use pet_master::{CommandSender, LifecycleOptions, PetMaster};

/// Quiet period before a burst of file events turns into one reload.
const WATCH_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "pet-master", version, about = "Run the PetMaster plugin from the console")]
struct Cli {
    /// Directory holding config.toml and the language file
    #[arg(short, long, default_value = "plugins/PetMaster")]
    data_dir: PathBuf,

    /// Reload automatically when a configuration file changes
    #[arg(short, long)]
    watch: bool,

    /// Project descriptor queried by the update check
    #[arg(long)]
    update_url: Option<Url>,

    /// Seconds between two update checks
    #[arg(long)]
    update_interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::DEFAULT_FILTER);
    let cli = Cli::parse();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pet-master starting");

    let mut update = UpdateCheckOptions::default();
    if let Some(url) = cli.update_url {
        update.url = url;
    }
    if let Some(secs) = cli.update_interval {
        update.interval = Duration::from_secs(secs.max(1));
    }
    let options = LifecycleOptions {
        data_dir: cli.data_dir,
        update,
    };
    let data_dir = options.data_dir.clone();

    let mut plugin = PetMaster::new(options, Some(Handle::current()), Box::new(NoPetCommands));
    plugin.on_enable()?;

    // The notify watcher must outlive the loop.
    let (_watcher, mut changes) = if cli.watch {
        let (watcher, rx) = ConfigWatcher::new(&data_dir);
        (Some(watcher.run()?), Some(rx))
    } else {
        (None, None)
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let mut words = line.split_whitespace();
                let Some(label) = words.next() else { continue };
                if label.eq_ignore_ascii_case("stop") {
                    break;
                }
                let args: Vec<&str> = words.collect();
                match plugin.on_command(&CommandSender::Console, label.trim_start_matches('/'), &args) {
                    Some(reply) => reply.iter().for_each(|line| println!("{line}")),
                    None => println!("Unknown command. Type \"petm help\" for help."),
                }
            }
            Some(path) = next_change(&mut changes) => {
                tokio::time::sleep(WATCH_DEBOUNCE).await;
                if let Some(rx) = changes.as_mut() {
                    while rx.try_recv().is_ok() {}
                }
                tracing::info!(path = %path.display(), "Configuration file changed, reloading");
                // Failures are logged by the manager; the previous configuration stays active.
                let _ = plugin.reload(true);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received");
                break;
            }
        }
    }

    plugin.on_disable();
    Ok(())
}

async fn next_change(changes: &mut Option<mpsc::UnboundedReceiver<PathBuf>>) -> Option<PathBuf> {
    match changes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
