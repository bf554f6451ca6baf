//! ID types for providers, receivers, food listings and claims.

use crate::error::{FoodError, Result};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = FoodError;

            fn from_str(s: &str) -> Result<Self> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

record_id!(
    /// Type-safe wrapper for Provider IDs.
    ///
    /// Keeps provider ids from being mixed up with receiver, listing or claim ids.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use food_wastage::ProviderId;
    ///
    /// let id: ProviderId = "17".parse().unwrap();
    /// assert_eq!(id.as_i64(), 17);
    /// assert_eq!(id.to_string(), "17");
    /// ```
    ProviderId
);

record_id!(
    /// Type-safe wrapper for Receiver IDs
    ReceiverId
);

record_id!(
    /// Type-safe wrapper for Food Listing IDs (`Food_ID` in the source data)
    FoodId
);

record_id!(
    /// Type-safe wrapper for Claim IDs
    ClaimId
);
