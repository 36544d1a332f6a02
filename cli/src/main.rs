//! Dev harness for the advice flow.
//!
//! `advisor serve` runs the mock backend; `advisor advise` drives a
//! full verification session against a backend using the nullable
//! challenge driver (the real vendor runtime only exists in a browser
//! host, so the terminal harness scripts it).

mod config;
mod server;

use config::{AdvisorConfig, ConfigOverrides};

use advisor_dispatch::AdviceClient;
use advisor_nullables::NullScriptDriver;
use advisor_types::{ActionTag, ContainerId, InteractiveToken, SiteKey};
use advisor_verification::{AdviceSession, SessionOutcome};
use advisor_widget::RuntimeAdapter;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "advisor", about = "Tiered bot-verification advice flow harness")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Submit a prompt through the verification flow and print the
    /// advice or the resulting status.
    Advise {
        /// The problem description to submit.
        prompt: String,

        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Simulate completing the interactive challenge when the
        /// backend escalates, then resubmit.
        #[arg(long)]
        solve_challenge: bool,
    },

    /// Run the mock dev backend.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value_t = 8000, env = "ADVISOR_PORT")]
        port: u16,

        /// Report a low score for this many leading invisible
        /// submissions, to exercise the escalation path.
        #[arg(long, default_value_t = 0)]
        escalate_first: u32,

        /// Origin allowed by the CORS layer.
        #[arg(long, default_value = "http://localhost:3000")]
        allow_origin: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    advisor_utils::init_tracing();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => AdvisorConfig::load(path),
        None => AdvisorConfig::default(),
    };

    match cli.command {
        Command::Advise {
            prompt,
            overrides,
            solve_challenge,
        } => {
            let config = config.merge(overrides);
            advise(&config, &prompt, solve_challenge).await?;
        }
        Command::Serve {
            port,
            escalate_first,
            allow_origin,
        } => {
            server::run(port, escalate_first, &allow_origin).await?;
        }
    }

    Ok(())
}

async fn advise(config: &AdvisorConfig, prompt: &str, solve_challenge: bool) -> anyhow::Result<()> {
    let adapter = RuntimeAdapter::new(
        NullScriptDriver::new(),
        SiteKey::new(config.invisible_site_key.clone()),
        config.interactive_site_key.clone().map(SiteKey::new),
    );
    let client = match config.timeout_secs {
        Some(secs) => AdviceClient::with_timeout(
            config.backend_url.clone(),
            std::time::Duration::from_secs(secs),
        )?,
        None => AdviceClient::new(config.backend_url.clone())?,
    };
    let mut session = AdviceSession::new(
        adapter,
        client,
        ContainerId::new(config.container.clone()),
        ActionTag::new(config.action.clone()),
    );

    session.initialize().await?;

    let mut outcome = session.submit(prompt).await;

    if outcome == SessionOutcome::ChallengeRequired && solve_challenge {
        if let Some(handle) = session.state().interactive_widget() {
            tracing::info!("simulating a completed interactive challenge");
            session
                .adapter()
                .driver()
                .solve(handle, InteractiveToken::new("dev-interactive-proof"));
            outcome = session.submit(prompt).await;
        }
    }

    println!("{}", outcome.status_line());
    Ok(())
}
