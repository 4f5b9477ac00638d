//! RegionGate session reconciler agent.
//!
//! Holds one signed-in session and keeps its cached regions in sync with the
//! API until interrupted.

#![forbid(unsafe_code)]

mod reconciler_config;

use std::sync::Arc;

use regiongate_application::{AccessChanged, ClientSession};
use regiongate_core::{AppError, UserIdentity};
use regiongate_domain::RegionName;
use regiongate_infrastructure::HttpEffectiveRegionsClient;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::reconciler_config::ReconcilerConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    reconciler_config::init_tracing();

    let config = ReconcilerConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let source = Arc::new(HttpEffectiveRegionsClient::new(
        http_client,
        config.api_base_url.as_str(),
        config.access_token.as_str(),
    ));

    let identity = UserIdentity::new(
        config.user_id,
        config.display_name.as_str(),
        None,
        config.role,
    );
    let mut session =
        ClientSession::login_with_source(identity, &*source, config.initial_regions.clone())
            .await;
    let region_count = session.context().cache().snapshot().await.regions.len();
    if region_count == 0 {
        warn!(
            user_id = %config.user_id,
            "session starts without regions, reconciliation stays idle"
        );
    }
    let mut notifications = session.start_reconciler(source, config.schedule());

    info!(
        user_id = %config.user_id,
        api_base_url = %config.api_base_url,
        interval_seconds = config.interval.as_secs(),
        initial_delay_seconds = config.initial_delay.as_secs(),
        region_count,
        "regiongate-reconciler started"
    );

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    warn!(error = %error, "failed to listen for shutdown signal");
                }
                break;
            }
            received = notifications.recv() => match received {
                Ok(change) => log_access_change(&change),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "access change notifications were missed");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    session.logout().await;
    info!("regiongate-reconciler stopped");

    Ok(())
}

fn log_access_change(change: &AccessChanged) {
    let join = |regions: Vec<&RegionName>| {
        regions
            .iter()
            .map(|region| region.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    info!(
        version = change.version,
        added = %join(change.added()),
        removed = %join(change.removed()),
        "region access changed"
    );
}
