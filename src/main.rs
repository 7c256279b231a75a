use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use anything_app::shell::{self, ShellCommand};
use anything_app::{Config, Gateway, HttpGateway, KeywordClassifier, Orchestrator, Session};

/// Anything - a document workspace that extends itself with generated plugins
#[derive(Parser)]
#[command(name = "anything", version, about)]
struct Cli {
    /// Backend base URL (overrides config file and `ANYTHING_BACKEND_URL`)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// User id sent with remote calls
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Seed the interactive session with the backend's plugins (inactive)
    #[arg(long)]
    sync: bool,

    /// Without a subcommand, starts an interactive session (needs a terminal)
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send one command and print the reply
    Prompt {
        /// Command text (e.g. "Add a timer")
        text: String,
    },
    /// Generate a plugin and print it as JSON
    Generate {
        /// What the plugin should do
        description: String,
    },
    /// List plugins known to the backend
    List,
    /// Print the source the backend holds for a plugin
    Source {
        /// Plugin id (e.g. "timer-001")
        id: String,
    },
    /// Check that the backend is running
    Health,
}

type App = Orchestrator<HttpGateway, KeywordClassifier>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so replies on stdout stay clean
    let filter = match cli.verbose {
        0 => "warn,anything_app=info",
        1 => "info,anything_app=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = &cli.backend_url {
        config = config.with_backend_url(url)?;
    }
    config = config.with_user_id(cli.user_id);
    tracing::debug!(?config, "loaded configuration");

    let gateway = config.gateway()?;
    let user_id = config.user_id.clone();

    match cli.command {
        Some(Command::Prompt { text }) => {
            let app = build_app(&config, gateway);
            let mut session = Session::new();
            let outcome = app.handle_command(&mut session, &text).await?;
            println!("{}", outcome.reply);
            let added = outcome
                .plugin_id
                .as_deref()
                .and_then(|id| session.registry().get(id));
            if let Some(plugin) = added {
                println!("\nplugin added: {} ({})", plugin.metadata.name, plugin.id);
            }
            Ok(())
        }
        Some(Command::Generate { description }) => {
            let generated = gateway
                .generate_plugin(&description, user_id.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&generated)?);
            Ok(())
        }
        Some(Command::List) => {
            let plugins = gateway.list_plugins().await?;
            if plugins.is_empty() {
                println!("no plugins");
            }
            for p in plugins {
                println!(
                    "{} - {} ({}, v{}): {}",
                    p.plugin_id,
                    p.metadata.name,
                    p.metadata.kind,
                    p.metadata.version,
                    p.metadata.description
                );
            }
            Ok(())
        }
        Some(Command::Source { id }) => {
            match gateway.plugin_source(&id).await? {
                Some(code) => println!("{code}"),
                None => anyhow::bail!("backend has no plugin {id}"),
            }
            Ok(())
        }
        Some(Command::Health) => {
            let status = gateway.health().await?;
            println!("{} is {status}", gateway.base_url());
            Ok(())
        }
        None => {
            let app = build_app(&config, gateway);
            interactive(&app, cli.sync).await
        }
    }
}

fn build_app(config: &Config, gateway: HttpGateway) -> App {
    let app = Orchestrator::with_classifier(gateway, config.classifier());
    match &config.user_id {
        Some(user_id) => app.with_user_id(user_id.clone()),
        None => app,
    }
}

/// Interactive session: one command in flight at a time
async fn interactive(app: &App, sync: bool) -> anyhow::Result<()> {
    require_terminal(std::io::stdin().is_terminal())?;

    let mut session = Session::new();

    if sync {
        match app.gateway().list_plugins().await {
            Ok(plugins) => {
                let count = session.import(plugins, false);
                println!("imported {count} plugin(s) from the backend");
            }
            Err(e) => tracing::warn!(error = %e, "failed to import plugins"),
        }
    }

    println!("connected to {} - type /help for commands", app.gateway().base_url());

    loop {
        let Some(line) = read_line().await? else {
            break;
        };

        let command = match shell::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Prompt(text) if text.is_empty() => {}
            ShellCommand::Prompt(text) => match app.handle_command(&mut session, &text).await {
                Ok(outcome) => {
                    println!("{}", outcome.reply);
                    if let Some(id) = outcome.plugin_id {
                        println!("(plugin {id} added and activated)");
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            },
            other => {
                if let Some(message) = shell::apply(&mut session, &other) {
                    println!("{message}");
                }
            }
        }
    }

    Ok(())
}

fn require_terminal(is_terminal: bool) -> anyhow::Result<()> {
    if !is_terminal {
        anyhow::bail!(
            "the interactive session needs a terminal; use a subcommand such as `anything prompt <text>`"
        );
    }
    Ok(())
}

/// Read one line on a blocking thread; `None` on end of input
async fn read_line() -> anyhow::Result<Option<String>> {
    let line = tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
    })
    .await?;

    match line {
        Ok(line) => Ok(Some(line)),
        Err(e) => {
            tracing::debug!(error = %e, "input closed");
            Ok(None)
        }
    }
}
