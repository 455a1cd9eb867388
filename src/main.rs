#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use vuesync::atom::Atom;
use vuesync::config::{self, VueSyncConfig, load_configuration, parse_lookback};
use vuesync::credentials::TokenFile;
use vuesync::datamodel::DeviceGid;
use vuesync::export::{ExportDriver, ExportOptions};
use vuesync::storage::storage_factory::create_storage_from_connection_string;
use vuesync::vue::{
    CachedTokenSource, CognitoAuthenticator, Credentials, RateLimiter, UsageApi, VueClient,
};

#[derive(Parser, Debug)]
#[command(name = "vuesync", version)]
#[command(about = "Copies Emporia Vue usage history into VictoriaMetrics")]
struct Cli {
    /// Destination host:port of VictoriaMetrics.
    #[arg(long)]
    dest: Option<String>,

    /// Look this far back for samples missing from the destination, e.g. 10d.
    #[arg(long)]
    lookback: Option<String>,

    /// Emporia Vue username, used when no valid token is stored.
    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Where the token is kept between runs.
    #[arg(long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default)]
enum Command {
    /// Export the missing usage history of every channel (default)
    #[default]
    Sync,
    /// List devices and their channels
    Devices,
    /// Show the current usage of every device
    Usage,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    let _sentry = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let result = run(&cli, &config).await;
    if let Err(err) = &result {
        sentry::integrations::anyhow::capture_anyhow(err);
    }
    result
}

async fn run(cli: &Cli, config: &VueSyncConfig) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending requests");
            on_interrupt.cancel();
        }
    });

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .context("Failed to create HTTP client")?;

    let client = build_vue_client(cli, config, http.clone(), cancel)?;

    match cli.command.unwrap_or_default() {
        Command::Sync => sync(cli, config, http, client).await,
        Command::Devices => list_devices(client).await,
        Command::Usage => show_usage(config, client).await,
    }
}

fn build_vue_client(
    cli: &Cli,
    config: &VueSyncConfig,
    http: reqwest::Client,
    cancel: CancellationToken,
) -> Result<Arc<VueClient>> {
    let token_file = match cli.token_file.as_ref().or(config.token_file.as_ref()) {
        Some(path) => TokenFile::new(path),
        None => TokenFile::default_location().context("Failed to locate the token file")?,
    };
    let stored = token_file
        .load()
        .context("Failed to load the stored token")?;
    let token = Arc::new(Atom::new(stored));
    token.watch(move |_, new| {
        if let Err(err) = token_file.save(new.as_ref()) {
            error!("Could not save new token: {}", err);
        }
    });

    let username = cli.username.clone().or_else(|| config.username.clone());
    let password = cli.password.clone().or_else(|| config.password.clone());
    let credentials = match (username, password) {
        (Some(username), Some(password)) => Some(Credentials { username, password }),
        _ => None,
    };

    let authenticator = CognitoAuthenticator::new(
        http.clone(),
        &config.cognito_region,
        &config.cognito_client_id,
    );
    let tokens = Arc::new(CachedTokenSource::new(authenticator, token, credentials));
    let limiter = Arc::new(
        RateLimiter::new(config.rate_limit_per_second).context("Invalid rate limit")?,
    );

    let client = VueClient::new(http, &config.api_base_url, limiter, tokens)
        .context("Invalid usage API URL")?
        .with_cancellation(cancel);
    Ok(Arc::new(client))
}

async fn sync(
    cli: &Cli,
    config: &VueSyncConfig,
    http: reqwest::Client,
    client: Arc<VueClient>,
) -> Result<()> {
    let lookback = match &cli.lookback {
        Some(lookback) => parse_lookback(lookback)?,
        None => config.parse_lookback()?,
    };
    let options = ExportOptions {
        scale: config.parse_scale()?,
        energy_unit: config.parse_energy_unit()?,
        flush_threshold: config.flush_threshold,
        ..Default::default()
    };

    let destination = cli.dest.as_deref().unwrap_or(&config.destination);
    println!("🗄️  Connecting to storage: {}", destination);
    let storage = create_storage_from_connection_string(destination, http)
        .context("Failed to create storage backend")?;
    let driver = ExportDriver::new(client.clone(), storage, options)
        .context("Usage history cannot be exported at this scale")?;

    let devices = client.devices().await.context("Failed to list devices")?;
    let until = Utc::now();
    let since = until - lookback;
    info!(
        "Exporting {} devices from {} to {}",
        devices.len(),
        since,
        until
    );

    let summary = driver.export_all(&devices, since, until).await?;
    println!(
        "✅ Exported {} new samples from {} channels in {} pushes",
        summary.new_samples(),
        summary.channels.len(),
        summary.pushes()
    );
    Ok(())
}

async fn list_devices(client: Arc<VueClient>) -> Result<()> {
    let devices = client.devices().await.context("Failed to list devices")?;
    for device in &devices {
        println!(
            "📟 {} {}",
            device.device_gid,
            device.model.as_deref().unwrap_or("unknown model")
        );
        for channel in device.all_channels() {
            println!(
                "   {} {:?} x{}",
                channel.channel_num,
                channel.display_name(),
                channel.channel_multiplier
            );
        }
    }
    Ok(())
}

async fn show_usage(config: &VueSyncConfig, client: Arc<VueClient>) -> Result<()> {
    let devices = client.devices().await.context("Failed to list devices")?;
    let gids: Vec<DeviceGid> = devices.iter().map(|d| d.device_gid).collect();
    let snapshot = client
        .usage(
            &gids,
            Utc::now(),
            config.parse_scale()?,
            config.parse_energy_unit()?,
        )
        .await
        .context("Failed to get current usage")?;

    println!("⚡ Usage at {}", snapshot.instant);
    for device in &snapshot.devices {
        for channel in &device.channel_usages {
            match channel.usage {
                Some(usage) => println!(
                    "   {} {} {:?}: {}",
                    device.device_gid,
                    channel.channel_num,
                    channel.name.as_deref().unwrap_or_default(),
                    usage
                ),
                None => println!(
                    "   {} {} {:?}: no data",
                    device.device_gid,
                    channel.channel_num,
                    channel.name.as_deref().unwrap_or_default()
                ),
            }
        }
    }
    Ok(())
}
