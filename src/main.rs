use leonai::{Config, FileCookieStore, LeonardoClient};
use mimalloc::MiMalloc;
use std::{path::PathBuf, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: leonai <image.(jpg|jpeg|png)> [motion-strength]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let image = args.next().map(PathBuf::from).ok_or(USAGE)?;
    let motion_strength = args
        .next()
        .map(|raw| raw.parse::<u32>())
        .transpose()
        .map_err(|e| format!("invalid motion strength: {e}\n{USAGE}"))?;

    info!(
        version = option_env!("LEONAI_BUILD_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")),
        commit = option_env!("LEONAI_BUILD_COMMIT").unwrap_or("<unknown>"),
        proxy = %cfg.client.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        cookie_path = %cfg.basic.cookie_path.display(),
        wait_ms = cfg.client.wait_ms,
        "leonai starting"
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let cookies = Arc::new(FileCookieStore::new(cfg.basic.cookie_path.clone()));
    let client = LeonardoClient::new(&cfg, cookies)?;

    client.start(&cancel).await?;
    let outcome = client.animate(&image, motion_strength, &cancel).await;

    // Rotated cookies are worth keeping even when the job failed.
    if let Err(e) = client.stop().await {
        warn!(error = %e, "Couldn't persist cookies");
    }

    match outcome {
        Ok(result) => {
            info!(asset_id = %result.asset_id, url = %result.url, "Motion video ready");
            Ok(())
        }
        Err(e) => {
            error!(
                phase = %e.phase,
                generation_id = %e.generation_id.as_deref().unwrap_or("<none>"),
                error = %e,
                "Motion job failed"
            );
            Err(e.into())
        }
    }
}

async fn cancel_on_shutdown(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Couldn't install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Couldn't install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown requested, cancelling");
    cancel.cancel();
}
