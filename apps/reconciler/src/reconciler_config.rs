use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use regiongate_application::ReconcilerSchedule;
use regiongate_core::{AppError, AppResult, UserId, UserRole};
use regiongate_domain::RegionName;
use tracing_subscriber::EnvFilter;


#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub api_base_url: String,
    pub access_token: String,
    pub user_id: UserId,
    pub display_name: String,
    pub role: UserRole,
    pub initial_regions: BTreeSet<RegionName>,
    pub interval: Duration,
    pub initial_delay: Duration,
    pub request_timeout: Duration,
}

impl ReconcilerConfig {
    pub fn load() -> AppResult<Self> {
        let api_base_url = env::var("RECONCILER_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3001".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let access_token = required_env("RECONCILER_ACCESS_TOKEN")?;
        let user_id = UserId::parse(required_env("RECONCILER_USER_ID")?.trim())?;
        let display_name = env::var("RECONCILER_DISPLAY_NAME")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("reconciler-{}", std::process::id()));
        let role = match env::var("RECONCILER_USER_ROLE") {
            Ok(value) if !value.trim().is_empty() => UserRole::from_str(value.as_str())?,
            _ => UserRole::User,
        };
        let initial_regions =
            parse_region_list(env::var("RECONCILER_INITIAL_REGIONS").unwrap_or_default().as_str())?;

        let interval_seconds = parse_env_u64("RECONCILER_INTERVAL_SECONDS", 60)?;
        let initial_delay_seconds = parse_env_u64("RECONCILER_INITIAL_DELAY_SECONDS", 5)?;
        let request_timeout_seconds = parse_env_u64("RECONCILER_REQUEST_TIMEOUT_SECONDS", 5)?;

        if interval_seconds == 0 {
            return Err(AppError::Validation(
                "RECONCILER_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if request_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "RECONCILER_REQUEST_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            access_token,
            user_id,
            display_name,
            role,
            initial_regions,
            interval: Duration::from_secs(interval_seconds),
            initial_delay: Duration::from_secs(initial_delay_seconds),
            request_timeout: Duration::from_secs(request_timeout_seconds),
        })
    }

    pub fn schedule(&self) -> ReconcilerSchedule {
        ReconcilerSchedule {
            interval: self.interval,
            initial_delay: self.initial_delay,
        }
    }
}

pub fn parse_region_list(value: &str) -> AppResult<BTreeSet<RegionName>> {
    value
        .split(',')
        .filter(|region| !region.trim().is_empty())
        .map(RegionName::new)
        .collect()
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
