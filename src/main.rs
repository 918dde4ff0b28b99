// ANI Desktop - settings, n8n workflow import and UI bridge backend
// License: Apache-2.0

use ani_desktop::bridge::{Bridge, BridgeRequest, BridgeResponse};
use ani_desktop::config::AppConfig;
use ani_desktop::settings::SettingsPatch;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LOGO: &str = "ANI";

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "ani",
    about = "ANI Desktop backend: settings, n8n workflow import and UI bridge",
    version
)]
struct Cli {
    /// Project root (default: parent of the working directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Workflow directory (default: <root>/workflows)
    #[arg(long, global = true)]
    workflows_dir: Option<PathBuf>,
    /// Settings file (default: <root>/.config/settings.json)
    #[arg(long, global = true)]
    settings_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve bridge requests as JSON lines on stdin/stdout
    Bridge,
    /// Show the companion service ports
    Env,
    /// Show or change the n8n connection settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Import local workflow files into n8n
    Import {
        #[command(flatten)]
        overrides: ConnectionArgs,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the stored settings
    Show,
    /// Overwrite the stored settings
    Save {
        #[command(flatten)]
        values: ConnectionArgs,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// n8n base URL
    #[arg(long)]
    base_url: Option<String>,
    /// n8n API key
    #[arg(long)]
    api_key: Option<String>,
}

impl From<ConnectionArgs> for SettingsPatch {
    fn from(args: ConnectionArgs) -> Self {
        SettingsPatch {
            base_url: args.base_url,
            api_key: args.api_key,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    ani_desktop::logger::init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} Configuration Error: {:#}", LOGO, e);
            std::process::exit(1);
        }
    };
    tracing::debug!(
        settings = ?config.settings_path,
        workflows = ?config.workflows_dir,
        "Resolved project layout"
    );

    let bridge = Bridge::new(&config);

    let request = match cli.command {
        Some(Commands::Bridge) | None => {
            if let Err(e) = bridge_cmd(&bridge).await {
                eprintln!("{} Bridge error: {:#}", LOGO, e);
                std::process::exit(1);
            }
            return;
        }
        Some(Commands::Version) => {
            println!("ani {}", ani_desktop::VERSION);
            return;
        }
        Some(Commands::Env) => BridgeRequest::EnvGet,
        Some(Commands::Settings {
            action: SettingsAction::Show,
        }) => BridgeRequest::SettingsGet,
        Some(Commands::Settings {
            action: SettingsAction::Save { values },
        }) => BridgeRequest::SettingsSave(values.into()),
        Some(Commands::Import { overrides }) => {
            BridgeRequest::WorkflowsImport(Some(overrides.into()))
        }
    };

    let response = bridge.handle(request).await;
    print_response(&response);
    if !response.ok {
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn bridge_cmd(bridge: &Bridge) -> anyhow::Result<()> {
    tracing::info!("Bridge listening on stdio");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    bridge
        .serve(stdin, tokio::io::stdout())
        .await
        .context("stdio transport failed")?;
    tracing::info!("Bridge input closed");
    Ok(())
}

fn print_response(response: &BridgeResponse) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{} Failed to encode response: {}", LOGO, e),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Layout from the working directory and `ANI_*` env vars, then CLI flags.
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.root {
        Some(root) => AppConfig::with_root(root),
        None => AppConfig::load().context("could not resolve project root")?,
    };
    if let Some(dir) = &cli.workflows_dir {
        config.workflows_dir = dir.clone();
    }
    if let Some(path) = &cli.settings_file {
        config.settings_path = path.clone();
    }
    Ok(config)
}
