//! burrow - container environment manager CLI

use burrow_cli::cli::{Cli, Commands, ConfigAction};
use burrow_cli::commands;
use burrow_config::ConfigStore;
use burrow_core::{expand_invocation, CommandSet, CreateOptions, EnvironmentManager};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // The store loads before argument parsing because alias expansion
    // needs it.
    let store = ConfigStore::load()?;

    // Stage one: canonicalize the command word. Exact names pass
    // through, aliases expand, unique prefixes fill out; anything else
    // errors here before clap sees it.
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let expanded = expand_invocation(&CommandSet::builtin(), &store, argv)?;

    // Stage two: regular argument parsing.
    let cli = Cli::parse_from(std::iter::once("burrow".to_string()).chain(expanded));

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        // Config and alias edits never need an engine connection.
        Commands::Config { action } => {
            let mut store = store;
            match action {
                None => commands::config_show(&store)?,
                Some(ConfigAction::Get { key }) => commands::config_get(&store, &key)?,
                Some(ConfigAction::Set { key, value, user }) => {
                    commands::config_set(&mut store, &key, &value, user)?
                }
                Some(ConfigAction::Rm { key, user }) => {
                    commands::config_rm(&mut store, &key, user)?
                }
            }
            Ok(())
        }
        Commands::Alias {
            name,
            expansion,
            user,
        } => {
            let mut store = store;
            commands::alias(&mut store, name, expansion, user)
        }
        command => {
            let socket = cli.socket.or_else(|| store.engine_socket());
            tracing::debug!("Connecting to engine (socket override: {:?})", socket);
            let engine = burrow_engine::connect(socket.as_deref()).await?;
            let mut manager = EnvironmentManager::new(store, engine);

            match command {
                Commands::Create {
                    name,
                    image,
                    start,
                    with_docker,
                    cmd,
                } => {
                    let opts = CreateOptions {
                        image,
                        mount: None,
                        command: if cmd.is_empty() { None } else { Some(cmd) },
                        with_docker,
                        start,
                    };
                    commands::create(&mut manager, name, opts).await
                }
                Commands::Start { name } => commands::start(&manager, name).await,
                Commands::Stop { name, delete } => {
                    commands::stop(&mut manager, name, delete).await
                }
                Commands::Delete { names, all, yes } => {
                    commands::delete(&mut manager, names, all, yes).await
                }
                Commands::List { running, json } => {
                    commands::list(&manager, running, json).await
                }
                Commands::Config { .. } | Commands::Alias { .. } => unreachable!(), // Handled above
            }
        }
    }
}
