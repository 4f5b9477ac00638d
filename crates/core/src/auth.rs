use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppError, UserId};

/// Account role stored on the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative override.
    Admin,
    /// Reviews access requests and manages grants.
    Manager,
    /// Field technician working inside granted regions.
    Technician,
    /// Regular user working inside granted regions.
    User,
}

impl UserRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Technician => "technician",
            Self::User => "user",
        }
    }

    /// Administrators bypass region checks entirely.
    #[must_use]
    pub fn has_region_override(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role may create, extend and revoke grants and review requests.
    #[must_use]
    pub fn can_manage_grants(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Whether the role may cancel pending requests filed by other users.
    #[must_use]
    pub fn can_cancel_any_request(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role may read the audit log.
    #[must_use]
    pub fn can_read_audit_log(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Whether the role may purge audit history.
    #[must_use]
    pub fn can_purge_audit_log(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "technician" => Ok(Self::Technician),
            "user" => Ok(Self::User),
            _ => Err(AppError::Validation(format!("unknown user role '{value}'"))),
        }
    }
}

/// Authenticated caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
    role: UserRole,
}

impl UserIdentity {
    /// Creates a user identity from the stored account data.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        role: UserRole,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
            role,
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the actor label written to audit entries.
    #[must_use]
    pub fn subject(&self) -> String {
        self.user_id.to_string()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if one is on file.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the account role.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::UserRole;

    #[test]
    fn role_roundtrip_storage_value() {
        for role in [
            UserRole::Admin,
            UserRole::Manager,
            UserRole::Technician,
            UserRole::User,
        ] {
            let restored = UserRole::from_str(role.as_str());
            assert!(matches!(restored, Ok(value) if value == role));
        }
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert!(matches!(UserRole::from_str("Manager"), Ok(UserRole::Manager)));
        assert!(UserRole::from_str("superuser").is_err());
    }

    #[test]
    fn only_admin_and_manager_manage_grants() {
        assert!(UserRole::Admin.can_manage_grants());
        assert!(UserRole::Manager.can_manage_grants());
        assert!(!UserRole::Technician.can_manage_grants());
        assert!(!UserRole::User.can_manage_grants());
        assert!(!UserRole::Manager.has_region_override());
        assert!(!UserRole::Manager.can_purge_audit_log());
    }

    #[test]
    fn role_serializes_as_snake_case() {
        let encoded = serde_json::to_string(&UserRole::Technician);
        assert!(matches!(encoded.as_deref(), Ok("\"technician\"")));
    }
}
