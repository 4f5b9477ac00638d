use std::fmt::{Display, Formatter};

use regiongate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Longest accepted region name.
pub const REGION_NAME_MAX_LENGTH: usize = 100;

/// Validated geographic region name, e.g. `Maharashtra`.
///
/// Names are trimmed on construction and compared exactly afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionName(String);

impl RegionName {
    /// Creates a validated region name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "region name must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().count() > REGION_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "region name must be at most {REGION_NAME_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the region name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RegionName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionName> for String {
    fn from(value: RegionName) -> Self {
        value.0
    }
}

impl Display for RegionName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}
