//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_effective_regions_client;
mod in_memory_audit_repository;
mod in_memory_grant_repository;
mod in_memory_user_directory;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_grant_repository;
mod postgres_user_repository;

pub use http_effective_regions_client::HttpEffectiveRegionsClient;
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_grant_repository::InMemoryGrantRepository;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_grant_repository::PostgresGrantRepository;
pub use postgres_user_repository::PostgresUserRepository;
