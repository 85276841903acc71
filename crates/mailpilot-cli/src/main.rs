#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mailpilot_client_core::controller::{ControllerError, Phase, SessionController};
use mailpilot_client_core::store::FileSessionStore;
use mailpilot_client_core::view::{self, ButtonEmphasis};
use mailpilot_control_client::AgentControlClient;

pub const ENV_STATE_DIR: &str = "MAILPILOT_STATE_DIR";

const SESSION_FILE: &str = "session.json";

#[derive(Parser)]
#[command(name = "mailpilot")]
#[command(about = "Control the mailpilot email agent from the terminal")]
pub struct MailpilotCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Authenticate against the control backend and start a session
    #[command(
        after_help = "App passwords are managed at https://myaccount.google.com/apppasswords"
    )]
    Login {
        #[arg(long)]
        email: String,
        /// App-specific password; internal spacing is stripped before sending
        #[arg(long)]
        app_password: String,
        /// OpenRouter API key the agent uses on your behalf
        #[arg(long)]
        api_key: String,
    },
    /// Show the run state reported by the backend
    Status,
    /// Start or stop the agent, depending on its current state
    Toggle,
    /// Update the poll interval
    Settings {
        /// Minutes between agent runs
        #[arg(long)]
        interval: String,
    },
    /// Forget the local session (never blocked by the network)
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = MailpilotCli::parse();

    let store = FileSessionStore::new(session_file_path()?);
    let api = AgentControlClient::from_env().context("resolve control backend address")?;
    let mut controller = SessionController::new(store, api);

    match run(&mut controller, cli.command).await {
        Ok(()) => render(&controller),
        // Errors are user-visible notices, not process failures: the
        // controller has already settled into an actionable state.
        Err(error) => println!("{error}"),
    }
    Ok(())
}

async fn run(
    controller: &mut SessionController<FileSessionStore, AgentControlClient>,
    command: Commands,
) -> Result<(), ControllerError> {
    match command {
        Commands::Login {
            email,
            app_password,
            api_key,
        } => controller.login(&email, &app_password, &api_key).await,
        Commands::Status => controller.restore().await,
        Commands::Toggle => {
            controller.restore().await?;
            controller.toggle().await
        }
        Commands::Settings { interval } => {
            controller.restore().await?;
            controller.save_settings(&interval).await
        }
        Commands::Logout => controller.logout().await,
    }
}

fn render(controller: &SessionController<FileSessionStore, AgentControlClient>) {
    match controller.phase() {
        Phase::LoggedOut => println!("Logged out."),
        Phase::LoggedIn { email, snapshot } => {
            println!("Signed in as {email}");
            match snapshot {
                Some(snapshot) => {
                    let state = view::project(snapshot);
                    println!("Agent:    {}", state.indicator_label);
                    println!("Last run: {}", state.last_run_display);
                    println!("Next run: {}", state.next_run_display);
                    println!("Interval: {} min", state.interval_selection);
                    println!(
                        "Action:   {}{}\x1b[0m (mailpilot toggle)",
                        emphasis_code(state.button_emphasis),
                        state.button_label
                    );
                }
                None => println!("Status unavailable."),
            }
        }
    }
}

fn emphasis_code(emphasis: ButtonEmphasis) -> &'static str {
    match emphasis {
        ButtonEmphasis::Danger => "\x1b[31m",
        ButtonEmphasis::Success => "\x1b[32m",
    }
}

fn session_file_path() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let dir = dir.trim();
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir).join(SESSION_FILE));
        }
    }
    let base = dirs::config_dir().context("no config directory available for session state")?;
    Ok(base.join("mailpilot").join(SESSION_FILE))
}
