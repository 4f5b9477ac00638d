use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use regiongate_core::{AppError, UserId, UserRole};
use tracing_subscriber::EnvFilter;


const DEFAULT_TOKEN_TTL_MINUTES: u64 = 60;
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Operation selected by the first command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    IssueToken {
        user_id: UserId,
        ttl_minutes: u64,
    },
    CreateUser {
        display_name: String,
        role: UserRole,
        email: Option<String>,
    },
}

impl ApiCommand {
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();

        match args.next().as_deref() {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("issue-token") => {
                let user_id = args.next().ok_or_else(|| {
                    AppError::Validation("usage: issue-token <user-id> [ttl-minutes]".to_owned())
                })?;
                let ttl_minutes = args
                    .next()
                    .map(|value| parse_u64("ttl-minutes", value.as_str()))
                    .transpose()?
                    .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
                if ttl_minutes == 0 {
                    return Err(AppError::Validation(
                        "ttl-minutes must be greater than zero".to_owned(),
                    ));
                }

                Ok(Self::IssueToken {
                    user_id: UserId::parse(user_id.as_str())?,
                    ttl_minutes,
                })
            }
            Some("create-user") => {
                let usage = || {
                    AppError::Validation(
                        "usage: create-user <display-name> <role> [email]".to_owned(),
                    )
                };
                let display_name = args.next().ok_or_else(usage)?;
                let role = UserRole::from_str(args.next().ok_or_else(usage)?.as_str())?;

                Ok(Self::CreateUser {
                    display_name,
                    role,
                    email: args.next(),
                })
            }
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected serve, migrate, issue-token or create-user"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::from_args(env::args().skip(1))?;

        let database_url = required_env("DATABASE_URL")?;
        let database_max_connections = u32::try_from(parse_env_u64("DATABASE_MAX_CONNECTIONS", 10)?)
            .map_err(|error| {
                AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
            })?
            .max(1);

        let jwt_secret = required_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters"
            )));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = u16::try_from(parse_env_u64("API_PORT", 3001)?)
            .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?;

        Ok(Self {
            command,
            database_url,
            database_max_connections,
            jwt_secret,
            frontend_url,
            api_host,
            api_port,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => parse_u64(name, value.trim()),
        _ => Ok(default),
    }
}

fn parse_u64(name: &str, value: &str) -> Result<u64, AppError> {
    value
        .parse::<u64>()
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
}
