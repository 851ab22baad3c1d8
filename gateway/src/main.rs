use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, Subcommand};
use http::{Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use anyhow::{Context, anyhow};

use voiceover_gateway::{
    ElevenLabsTTS, ElevenLabsTTSConfig, ElevenLabsVoices, ObjectStorage, ServerConfig,
    SynthesisRequest, VoiceRegistrar, VoiceRegistration, parse_label, routes, state::AppState,
    synthesize_to_file, utils::scoped_temp_file,
};

/// Voiceover gateway - script upload, speech synthesis and voice cloning
#[derive(Parser, Debug)]
#[command(name = "voiceover-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Synthesize text to a local audio file
    Synthesize {
        /// Text to synthesize
        #[arg(
            short = 't',
            long = "text",
            conflicts_with = "input",
            required_unless_present = "input"
        )]
        text: Option<String>,

        /// Read the text from a UTF-8 file
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: Option<PathBuf>,

        /// Destination audio file
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: PathBuf,

        /// Voice to use instead of the configured one
        #[arg(long = "voice-id")]
        voice_id: Option<String>,
    },

    /// Register a cloned voice from sample recordings
    CloneVoice {
        /// Name of the new voice
        #[arg(short = 'n', long = "name")]
        name: String,

        /// Description shown in the voice library
        #[arg(short = 'd', long = "description")]
        description: Option<String>,

        /// Local sample file (repeatable)
        #[arg(short = 's', long = "sample", value_name = "FILE")]
        samples: Vec<PathBuf>,

        /// Sample stored in the bucket under this key (repeatable)
        #[arg(long = "bucket-sample", value_name = "KEY")]
        bucket_samples: Vec<String>,

        /// Ask the vendor to strip background noise from the samples
        #[arg(long = "remove-background-noise")]
        remove_background_noise: bool,

        /// Label attached to the voice (repeatable)
        #[arg(short = 'l', long = "label", value_name = "KEY=VALUE", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Synthesize {
            text,
            input,
            output,
            voice_id,
        } => synthesize(config, text, input, &output, voice_id).await,
        Commands::CloneVoice {
            name,
            description,
            samples,
            bucket_samples,
            remove_background_noise,
            labels,
        } => {
            let mut registration = VoiceRegistration::new(name, samples);
            registration.description = description;
            registration.remove_background_noise = remove_background_noise;
            registration.labels = labels.into_iter().collect();
            clone_voice(config, registration, &bucket_samples).await
        }
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let address = config.address();
    let tls_config = config.tls.clone();
    let rate_limit_rps = config.rate_limit_requests_per_second;
    let rate_limit_burst = config.rate_limit_burst_size;
    let cors_origins = config.cors_allowed_origins.clone();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;

    // Configure rate limiting (disabled when rate >= 100000 for load testing)
    let governor_layer = if rate_limit_rps < 100000 {
        let governor_config = GovernorConfigBuilder::default()
            .per_second(rate_limit_rps as u64)
            .burst_size(rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow!("Failed to build rate limiter config"))?;
        Some(GovernorLayer::new(governor_config))
    } else {
        println!("Rate limiting disabled (rate >= 100000/s)");
        None
    };

    // Configure CORS
    let cors_layer = if let Some(ref origins) = cors_origins {
        if origins == "*" {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(false)
        } else {
            // Parse comma-separated origins
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(true)
        }
    } else {
        // No allow_origin = same-origin only (browsers block cross-origin requests)
        info!(
            "CORS not configured, defaulting to same-origin only. \
             Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
        );
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(false)
    };

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            http::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            http::HeaderValue::from_static("DENY"),
        ));

    let app = routes::api::create_app(app_state)
        .layer(cors_layer)
        .layer(tower::util::option_layer(governor_layer))
        .layer(security_headers);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    // Start server with or without TLS
    if let Some(tls) = tls_config {
        // Load TLS configuration from certificate and key files
        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to load TLS certificates from {} and {}: {}",
                    tls.cert_path.display(),
                    tls.key_path.display(),
                    e
                )
            })?;

        println!("Server listening on https://{} (TLS enabled)", socket_addr);

        axum_server::bind_rustls(socket_addr, rustls_config)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|e| anyhow!("TLS server error: {}", e))?;
    } else {
        println!("Server listening on http://{}", socket_addr);

        let listener = TcpListener::bind(&socket_addr).await?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
    }

    Ok(())
}

/// Synthesize text straight to a local file.
///
/// Audio is spooled next to `output` and renamed into place only after the
/// whole stream arrived, so a failed run never leaves a truncated file.
async fn synthesize(
    config: ServerConfig,
    text: Option<String>,
    input: Option<PathBuf>,
    output: &Path,
    voice_id: Option<String>,
) -> anyhow::Result<()> {
    let text = match (text, input) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --text or --input is required"),
    };

    let tts = ElevenLabsTTS::new(ElevenLabsTTSConfig::from_server_config(&config)?)?;
    let request = SynthesisRequest::new(
        text,
        voice_id.unwrap_or_else(|| config.voice_id.clone()),
        config.model_id.clone(),
        config.output_format.clone(),
    );

    let parent = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let scratch = scoped_temp_file(&parent, "part")
        .with_context(|| format!("Failed to create a temporary file in {}", parent.display()))?;

    let written = synthesize_to_file(&tts, &request, &scratch).await?;
    scratch
        .persist(output)
        .map_err(|e| anyhow!("Failed to write {}: {}", output.display(), e.error))?;

    println!("Wrote {} bytes of audio to {}", written, output.display());
    Ok(())
}

/// Register a cloned voice and print its id.
async fn clone_voice(
    config: ServerConfig,
    mut registration: VoiceRegistration,
    bucket_samples: &[String],
) -> anyhow::Result<()> {
    let api_key = config.get_elevenlabs_api_key().map_err(|e| anyhow!(e))?;
    let voices =
        ElevenLabsVoices::new(api_key, &config.elevenlabs_base_url, config.tts_timeout())?;

    // Bucket samples are copied into scratch files that live until registration ends
    let mut downloaded = Vec::with_capacity(bucket_samples.len());
    if !bucket_samples.is_empty() {
        let storage = ObjectStorage::from_config(&config.storage)?;
        let temp_dir = config.temp_dir();

        for key in bucket_samples {
            let extension = Path::new(key)
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("bin");
            let scratch = scoped_temp_file(&temp_dir, extension).with_context(|| {
                format!("Failed to create a temporary file in {}", temp_dir.display())
            })?;
            storage.download_to(key, scratch.path()).await?;
            registration.sample_paths.push(scratch.path().to_path_buf());
            downloaded.push(scratch);
        }
    }

    let profile = voices.register_voice(&registration).await?;
    drop(downloaded);

    println!("Voice '{}' created with id {}", profile.name, profile.voice_id);
    println!("Set VOICE_ID={} to synthesize with it", profile.voice_id);
    Ok(())
}
