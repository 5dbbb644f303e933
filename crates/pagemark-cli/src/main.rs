use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use pagemark_agent::{ClipboardSink, PointerEvent};
use pagemark_coordinator::{
    start_signal_listener, AgentRegistry, Coordinator, InMemoryTabs, SpawnInjector, TabId, TabInfo,
};
use pagemark_toolbar::{Activation, Toolbar};

#[derive(Parser)]
#[command(
    name = "pagemark",
    about = "Page annotation toolkit — toolbar, coordinator, and page agent over in-process channels",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted annotation session against an in-process page
    Demo {
        /// URL of the simulated active tab
        #[arg(long, default_value = "https://example.com/article")]
        url: String,
    },

    /// List the toolbar's tools
    Tools,
}

/// Clipboard sink that prints copied markup to stdout.
struct StdoutClipboard;

#[async_trait::async_trait]
impl ClipboardSink for StdoutClipboard {
    async fn write(&self, content: String) -> anyhow::Result<()> {
        println!("--- copied content ---");
        println!("{content}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => pagemark_core::config::Config::load(std::path::Path::new(path))?,
        None => pagemark_core::config::Config::default(),
    };

    match cli.command {
        Commands::Demo { url } => run_demo(&config, url).await?,
        Commands::Tools => {
            for item in pagemark_core::types::TOOLBAR {
                let (w, h) = pagemark_core::types::icon_size(item.id);
                println!(
                    "{:>2}  {:<10} {:<8} {}x{}  {}",
                    item.id, item.name, item.display_name, w, h, item.icon
                );
            }
        }
    }

    Ok(())
}

async fn run_demo(config: &pagemark_core::config::Config, url: String) -> anyhow::Result<()> {
    tracing::info!(%url, "Starting demo annotation session");

    let tab = TabInfo {
        id: TabId(1),
        url,
        title: Some("Demo page".into()),
    };
    let tabs = Arc::new(InMemoryTabs::with_active(tab));
    let agents = Arc::new(AgentRegistry::new());

    let (signal_tx, signal_rx) = tokio::sync::mpsc::unbounded_channel();
    let _listener = start_signal_listener(signal_rx);

    let injector = Arc::new(SpawnInjector::new(
        agents.clone(),
        Arc::new(StdoutClipboard),
        signal_tx,
    ));
    let coordinator = Arc::new(Coordinator::new(
        tabs,
        injector,
        agents,
        Duration::from_millis(config.inject_delay_ms()),
    ));
    let toolbar = Toolbar::new(coordinator.clone());

    // Rectangle: the first activation finds no agent, injects one, retries.
    activate(&toolbar, "rectangle").await;

    let agent = coordinator
        .agents()
        .get(TabId(1))
        .await
        .ok_or_else(|| anyhow::anyhow!("agent not registered after injection"))?;

    agent.pointer(PointerEvent::down(10.0, 10.0));
    agent.pointer(PointerEvent::moved(30.0, 20.0));
    agent.pointer(PointerEvent::up(50.0, 30.0));

    activate(&toolbar, "arrow").await;
    agent.pointer(PointerEvent::down(100.0, 100.0));
    agent.pointer(PointerEvent::up(150.0, 150.0));

    activate(&toolbar, "pen").await;
    agent.pointer(PointerEvent::down(200.0, 200.0));
    for i in 1..=5 {
        agent.pointer(PointerEvent::moved(200.0 + f64::from(i) * 3.0, 200.0 + f64::from(i)));
    }
    agent.pointer(PointerEvent::up(215.0, 205.0));

    // Copy prints the overlay snapshot, exit clears it.
    activate(&toolbar, "copy").await;
    activate(&toolbar, "exit").await;

    // Give the clipboard task a moment to print before exiting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

async fn activate(toolbar: &Toolbar, name: &str) {
    match toolbar.activate(name).await {
        Activation::Completed(response) if response.success => {
            println!("{name}: {}", response.message.unwrap_or_default());
        }
        Activation::Completed(response) => {
            println!("{name}: failed: {}", response.error.unwrap_or_default());
        }
        Activation::AlreadyPending => println!("{name}: still loading"),
        Activation::UnknownTool => println!("{name}: unknown tool"),
    }
}
