//! Claim status and its allowed transitions.

use crate::error::FoodError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a claim.
///
/// A claim starts out `Pending` and ends either `Completed` (the food was
/// picked up) or `Cancelled`. Both end states are terminal.
///
/// # Examples
///
/// ```rust
/// use food_wastage::ClaimStatus;
///
/// let status: ClaimStatus = "completed".parse().unwrap();
/// assert_eq!(status, ClaimStatus::Completed);
/// assert_eq!(status.to_string(), "Completed");
/// assert!(!status.can_transition_to(ClaimStatus::Pending));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ClaimStatus {
    /// Claim placed, food not yet collected
    Pending,
    /// Food was collected by the receiver
    Completed,
    /// Claim withdrawn or rejected
    Cancelled,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 3] = [
        ClaimStatus::Pending,
        ClaimStatus::Completed,
        ClaimStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Completed => "Completed",
            ClaimStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Pending)
    }

    /// Whether a claim in this status may be moved to `next`.
    ///
    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(&self, next: ClaimStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = FoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ClaimStatus::Pending),
            "completed" | "complete" => Ok(ClaimStatus::Completed),
            "cancelled" | "canceled" => Ok(ClaimStatus::Cancelled),
            _ => Err(FoodError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl ToSql for ClaimStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ClaimStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: FoodError| FromSqlError::Other(Box::new(e)))
    }
}
