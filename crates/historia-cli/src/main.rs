use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;

use historia_cli::config::{self, HistoriaConfig};
use historia_cli::wizard::Wizard;
use historia_completion::client::{CompletionService, ProxyClient};
use historia_completion::retry::RetryingClient;
use historia_intake::recognition::{TesseractRecognizer, TextRecognizer};
use historia_intake::session::IntakeSession;
use historia_storage::snapshot::clear_snapshot;
use historia_storage::store::{FileStore, KeyValueStore};

#[derive(Parser)]
#[command(name = "historia", version, about = "Guided patient intake with an AI history interview")]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at info level instead of warnings only.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start or resume the intake (the default).
    Run {
        /// Lab report image to recognize on the lab report screen.
        #[arg(long)]
        image: Option<PathBuf>,

        /// Directory for exported reports.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Discard the saved session.
    Reset,
    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    Init {
        #[arg(long)]
        proxy_endpoint: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Overwrite an existing config.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    match cli.command.unwrap_or(Command::Run {
        image: None,
        out: PathBuf::from("."),
    }) {
        Command::Run { image, out } => {
            let config = config::load_or_default(&config_path)?;
            run(config, image, out).await
        }
        Command::Reset => {
            let config = config::load_or_default(&config_path)?;
            let store = FileStore::open(config.session_dir())?;
            clear_snapshot(&store)?;
            println!("Saved session cleared.");
            Ok(())
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let config = config::load_or_default(&config_path)?;
                println!("# {}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigAction::Init {
                proxy_endpoint,
                data_dir,
                force,
            } => {
                if config_path.exists() && !force {
                    return Err(eyre::eyre!(
                        "config already exists at {} (use --force to overwrite)",
                        config_path.display()
                    ));
                }
                let mut config = match data_dir {
                    Some(dir) => HistoriaConfig::new(dir),
                    None => HistoriaConfig::defaults()?,
                };
                if let Some(endpoint) = proxy_endpoint {
                    config.proxy_endpoint = endpoint;
                }
                config::save_config(&config, &config_path)?;
                println!("Wrote {}", config_path.display());
                Ok(())
            }
        },
    }
}

async fn run(config: HistoriaConfig, image: Option<PathBuf>, out: PathBuf) -> Result<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.session_dir())?);
    let client = ProxyClient::new(config.proxy_endpoint.clone(), config.request_timeout())?;
    let completion: Arc<dyn CompletionService> = Arc::new(RetryingClient::new(client, config.retry));
    let session = IntakeSession::resume(store, completion, config.intake())?;

    // First Ctrl-C cancels an in-flight request; otherwise it exits.
    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !cancel.cancel() {
                std::process::exit(130);
            }
        }
    });

    let recognizer: Arc<dyn TextRecognizer> =
        Arc::new(TesseractRecognizer::new(config.tesseract_binary.clone()));
    let stdin = std::io::stdin().lock();
    let mut wizard = Wizard::new(session, recognizer, stdin, std::io::stdout())
        .with_export_dir(out)
        .with_lab_image(image);
    wizard.run().await
}
