use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scriptdeck_core::api::{CoreEvent, CoreInput, EventDispatcher, ScriptDeckCore, ScriptDeckCoreBuilder};
use scriptdeck_core::config::{Command, Config, Settings};
use scriptdeck_core::monitor::{next_batch, ChangeMonitor};
use scriptdeck_core::tmux::{TmuxClient, TmuxHost};

mod render;

use render::render_inventory;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    let roots = workspace_roots(&cli)?;
    let builder = ScriptDeckCoreBuilder::new(settings).with_roots(roots);

    match cli.command {
        Command::List { all } => {
            let core = builder.build();
            print_inventory(&core, all);
            Ok(())
        }
        Command::Run { task, package, .. } => {
            let client = TmuxClient::new();
            if !client.is_available() {
                anyhow::bail!("tmux is not available");
            }
            let core = builder
                .with_session_host(Arc::new(TmuxHost::new(client)))
                .build();
            core.refresh();

            let session = core.run_task_by_key(&task, package.as_deref(), None)?;
            info!("'{}' is running in tmux session '{}'", task, session);
            Ok(())
        }
        Command::Watch => watch(builder.build()).await,
    }
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("scriptdeck=debug,scriptdeck_core=debug")
    } else {
        EnvFilter::new("scriptdeck=info,scriptdeck_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Roots from the command line, or the current directory
fn workspace_roots(cli: &Config) -> Result<Vec<PathBuf>> {
    if !cli.roots.is_empty() {
        return Ok(cli.roots.clone());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(vec![cwd])
}

fn print_inventory(core: &ScriptDeckCore, all: bool) {
    let inventory = core.refresh();
    print!(
        "{}",
        render_inventory(&inventory, &core.settings().scan.manifest_name, all)
    );
}

/// Reprint the inventory whenever manifests change, until Ctrl-C
async fn watch(core: ScriptDeckCore) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _monitor = ChangeMonitor::start(&core.workspace_roots(), &core.settings().scan, tx)?;
    let dispatcher = EventDispatcher::new();
    let quiet = Duration::from_millis(core.settings().watch.debounce_ms);

    print_inventory(&core, false);
    let mut events = core.subscribe();
    info!("Watching for manifest changes (Ctrl-C to stop)");

    loop {
        let batch = tokio::select! {
            batch = next_batch(&mut rx, quiet) => batch,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(batch) = batch else { break };

        let inputs = batch.into_iter().map(CoreInput::from);
        if let Err(e) = dispatcher.dispatch_batch(&core, inputs) {
            warn!("Failed to apply workspace changes: {}", e);
        }
        report_events(&core, &mut events);
    }
    Ok(())
}

/// Print whatever the last batch changed
fn report_events(core: &ScriptDeckCore, events: &mut broadcast::Receiver<CoreEvent>) {
    let mut updated = false;
    loop {
        match events.try_recv() {
            Ok(CoreEvent::InventoryUpdated { .. }) => updated = true,
            Ok(CoreEvent::EntryPointVisibilityChanged { visible }) => {
                info!("Manifests {}", if visible { "found" } else { "gone" });
            }
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!("Missed {} core event(s)", n);
                updated = true;
            }
            Err(_) => break,
        }
    }

    if updated {
        let inventory = core.inventory();
        println!();
        print!(
            "{}",
            render_inventory(&inventory, &core.settings().scan.manifest_name, false)
        );
    }
}
