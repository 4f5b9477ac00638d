pub mod audit_log;
pub mod health;
pub mod region_access;
pub mod region_grants;
pub mod region_requests;
