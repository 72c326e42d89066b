use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wtichat::{ChatSession, Config, OpenRouterClient, Settings, SubmitOutcome};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "wtichat")]
#[command(author, version, long_about = None)]
#[command(about = "Chat with an OpenRouter-hosted model from the terminal")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model identifier, overriding the configured one
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Where the interactive UI writes its log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        text: String,
    },
    /// Inspect or update the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Store the OpenRouter API key
    SetKey { key: String },
    /// Store the default model
    SetModel { model: String },
    /// Print the resolved settings
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let log_path = match cli.log_file {
                Some(path) => path,
                None => Config::config_dir()?.join("wtichat.log"),
            };
            init_file_logging(cli.verbose, log_path)?;
            let settings = load_settings(cli.model)?;
            run_interactive(settings).await
        }
        Some(Commands::Ask { text }) => {
            init_stderr_logging(cli.verbose)?;
            let settings = load_settings(cli.model)?;
            ask_once(settings, &text).await
        }
        Some(Commands::Config { action }) => {
            init_stderr_logging(cli.verbose)?;
            run_config(action, cli.model)
        }
    }
}

fn init_file_logging(verbose: bool, path: PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn init_stderr_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_settings(model_override: Option<String>) -> Result<Settings> {
    let mut config = Config::load()?;
    if model_override.is_some() {
        config.model = model_override;
    }
    config.resolve()
}

fn build_session(settings: &Settings) -> ChatSession {
    let client = OpenRouterClient::new(settings);
    info!(model = client.model(), endpoint = %settings.endpoint, "starting chat session");
    ChatSession::new(Arc::new(client), settings.system_prompt.clone())
}

async fn run_interactive(settings: Settings) -> Result<()> {
    let session = build_session(&settings);
    let mut app = App::new(session.clone(), &settings);
    let mut events = EventHandler::new(session.subscribe());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;

    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn ask_once(settings: Settings, text: &str) -> Result<()> {
    let session = build_session(&settings);

    match session.submit(text).await {
        SubmitOutcome::Ignored => {
            anyhow::bail!("Nothing to send: message is blank");
        }
        SubmitOutcome::Replied | SubmitOutcome::FellBack => {
            if let Some(turn) = session.snapshot().transcript.last() {
                println!("{}", turn.text);
            }
        }
    }
    Ok(())
}

fn run_config(action: ConfigAction, model_override: Option<String>) -> Result<()> {
    match action {
        ConfigAction::SetKey { key } => {
            let mut config = Config::load()?;
            config.api_key = Some(key);
            config.save()?;
            println!("API key saved to {}", Config::get_config_path()?.display());
        }
        ConfigAction::SetModel { model } => {
            let mut config = Config::load()?;
            config.model = Some(model.clone());
            config.save()?;
            println!("Default model set to {model}");
        }
        ConfigAction::Show => {
            let settings = load_settings(model_override)?;
            println!("config file : {}", Config::get_config_path()?.display());
            println!("endpoint    : {}", settings.endpoint);
            println!("model       : {}", settings.model);
            println!("title       : {}", settings.title);
            println!("referer     : {}", settings.referer);
            println!("api key     : {}", settings.masked_key());
        }
    }
    Ok(())
}
