use color_eyre::{eyre::eyre, Result};
use padport::controller::GilrsPoller;
use padport::host::{run_frame_loop, spawn_ctrl_c_listener, LoggingHooks};
use padport::mapping::{InputSession, MediaKind, TargetSystem};
use padport::persistence::config_loader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let system = env_or_default("PADPORT_SYSTEM", TargetSystem::Nes);
    let media = env_or_default("PADPORT_MEDIA", MediaKind::Cartridge);

    let config_path = config_loader::default_config_path();
    let config = config_loader::ensure_default_config(&config_path).await?;

    let table = config
        .button_table(system)
        .map_err(|e| eyre!("Failed to build button map: {}", e))?;
    let session = InputSession::create(system, table, config.rotation(system), media)
        .map_err(|e| eyre!("Failed to create input session: {}", e))?
        .start();

    info!("Initializing controller poller");
    let mut poller = GilrsPoller::create(Some(config.host.poller_settings()))
        .map_err(|e| eyre!("Failed to create poller: {}", e))?;
    let mut hooks = LoggingHooks::default();

    let shutdown = CancellationToken::new();
    let _ctrl_c = spawn_ctrl_c_listener(shutdown.clone());

    let ended = run_frame_loop(session, &mut poller, &mut hooks, &config.host, shutdown).await;

    info!(
        "{} session ended after {} frames, {} core requests",
        ended.system(),
        ended.frames(),
        hooks.total()
    );
    Ok(())
}

fn env_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|e| {
            warn!("Invalid {} '{}': {}. Using {:?}", key, value, e, default);
            default
        }),
        Err(_) => default,
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
