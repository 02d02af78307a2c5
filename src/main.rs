use anyhow::{Context, Result};
use clap::Parser;
use skygram::ai::{GeminiClassifier, HuggingFaceImageClient};
use skygram::captions::RandomCaptionPicker;
use skygram::models::{Config, ServiceStatus};
use skygram::pipeline::{CloudPipeline, PipelineServices};
use skygram::server::{self, AppState};
use skygram::storage::ImageStore;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "skygram")]
#[command(about = "Turn photos of clouds into cloud art")]
struct CliArgs {
    /// Bind host. Overrides HOST.
    #[arg(long)]
    host: Option<String>,

    /// Bind port. Overrides PORT.
    #[arg(long)]
    port: Option<u16>,
}

fn default_log_filter(debug: bool) -> &'static str {
    if debug {
        "skygram=debug,tower_http=debug"
    } else {
        "skygram=info,tower_http=info"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter(config.debug).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting skygram");

    if let Err(e) = serve(config, args).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn serve(config: Config, args: CliArgs) -> Result<()> {
    let store = ImageStore::new(&config.upload_dir, &config.generated_dir)
        .context("Failed to create image directories")?;

    // Reuse one HTTP connection pool across both upstream clients.
    let http_client = reqwest::Client::new();

    let classifier = GeminiClassifier::new_with_client(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        http_client.clone(),
    );
    info!("Classifier: Gemini (model: {})", classifier.model());

    let generator = HuggingFaceImageClient::new_with_client(
        config.hf_token.clone(),
        config.hf_model_url.clone(),
        http_client,
    );
    info!("Generator: Hugging Face ({})", generator.model_url());

    let pipeline = CloudPipeline::new(
        PipelineServices {
            classifier: Box::new(classifier),
            generator: Box::new(generator),
            captions: Box::new(RandomCaptionPicker),
        },
        store,
    );
    let services = ServiceStatus::from_flags(
        !config.gemini_api_key.is_empty(),
        !config.hf_token.is_empty(),
    );
    let app = server::router(AppState::new(pipeline, services), &config.allowed_origins);

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let listener = bind_listener(&host, port).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind to a hostname, an IPv4 literal or an IPv6 literal (bare or bracketed).
async fn bind_listener(host: &str, port: u16) -> Result<TcpListener> {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))
}
