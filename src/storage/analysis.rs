//! Fixed catalog of analytical reports
//!
//! Every report is a read-only query over the four tables. The set is closed:
//! each [`Report`] variant owns one [`ReportDefinition`] naming its columns and
//! SQL, and [`FoodDatabase::run_report`] returns a [`ReportTable`] ready for
//! charting. Orderings always end in a unique tiebreaker so output is stable,
//! and aggregates fall back to zero on empty tables.

use super::schema::FoodDatabase;
use crate::error::{FoodError, Result};
use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Named reports available to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Report {
    ProvidersReceiversByCity,
    QuantityByProviderType,
    TopReceiversByClaims,
    TotalQuantity,
    ListingsByCity,
    FoodTypeDistribution,
    ClaimsPerFoodItem,
    TopProvidersByCompletedClaims,
    ClaimStatusShare,
    AvgQuantityPerReceiver,
    MealTypeDemand,
    QuantityPerProvider,
    ClaimsByHour,
    QuantityByCity,
    ClaimTimeliness,
    CompletionRate,
    CompletionRateByCity,
    CompletionRateByFoodType,
    CompletionRateByProviderType,
    CompletedFoodTypes,
    CompletedMealTypes,
    ListedVsClaimed,
    MostActiveProviders,
}

/// Static contract of a report: its name, output columns and query
#[derive(Debug, Clone, Copy)]
pub struct ReportDefinition {
    pub name: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub sql: &'static str,
}

/// A single result cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "-"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{:.2}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Integer(v),
            ValueRef::Real(v) => Cell::Real(v),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Text(format!("<{} bytes>", b.len())),
        }
    }
}

/// Tabular report output: named columns and rows of cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub report: Report,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    /// Position of a named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` under the named column
    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column(column)?;
        self.rows.get(row)?.get(idx)
    }
}

impl Report {
    pub const ALL: [Report; 23] = [
        Report::ProvidersReceiversByCity,
        Report::QuantityByProviderType,
        Report::TopReceiversByClaims,
        Report::TotalQuantity,
        Report::ListingsByCity,
        Report::FoodTypeDistribution,
        Report::ClaimsPerFoodItem,
        Report::TopProvidersByCompletedClaims,
        Report::ClaimStatusShare,
        Report::AvgQuantityPerReceiver,
        Report::MealTypeDemand,
        Report::QuantityPerProvider,
        Report::ClaimsByHour,
        Report::QuantityByCity,
        Report::ClaimTimeliness,
        Report::CompletionRate,
        Report::CompletionRateByCity,
        Report::CompletionRateByFoodType,
        Report::CompletionRateByProviderType,
        Report::CompletedFoodTypes,
        Report::CompletedMealTypes,
        Report::ListedVsClaimed,
        Report::MostActiveProviders,
    ];

    pub fn name(&self) -> &'static str {
        self.definition().name
    }

    /// The report's contract
    pub fn definition(&self) -> ReportDefinition {
        match self {
            Report::ProvidersReceiversByCity => ReportDefinition {
                name: "providers-receivers-by-city",
                title: "Providers and receivers per city",
                columns: &["city", "provider_count", "receiver_count"],
                sql: "SELECT city AS city,
                             COUNT(provider_id) AS provider_count,
                             COUNT(receiver_id) AS receiver_count
                      FROM (
                          SELECT city, provider_id, NULL AS receiver_id FROM providers
                          UNION ALL
                          SELECT city, NULL, receiver_id FROM receivers
                      )
                      GROUP BY city
                      ORDER BY provider_count DESC, receiver_count DESC, city ASC
                      LIMIT 10",
            },
            Report::QuantityByProviderType => ReportDefinition {
                name: "quantity-by-provider-type",
                title: "Food quantity listed per provider type",
                columns: &["provider_type", "total_quantity"],
                sql: "SELECT p.provider_type AS provider_type, SUM(f.quantity) AS total_quantity
                      FROM food_listings f
                      JOIN providers p ON f.provider_id = p.provider_id
                      GROUP BY p.provider_type
                      ORDER BY total_quantity DESC, p.provider_type ASC",
            },
            Report::TopReceiversByClaims => ReportDefinition {
                name: "top-receivers-by-claims",
                title: "Receivers with the most claims",
                columns: &["receiver", "total_claims"],
                sql: "SELECT r.name AS receiver, COUNT(c.claim_id) AS total_claims
                      FROM claims c
                      JOIN receivers r ON c.receiver_id = r.receiver_id
                      GROUP BY r.name
                      ORDER BY total_claims DESC, receiver ASC
                      LIMIT 10",
            },
            Report::TotalQuantity => ReportDefinition {
                name: "total-quantity",
                title: "Total quantity of food listed",
                columns: &["total_quantity"],
                sql: "SELECT COALESCE(SUM(quantity), 0) AS total_quantity FROM food_listings",
            },
            Report::ListingsByCity => ReportDefinition {
                name: "listings-by-city",
                title: "Cities with the most listings",
                columns: &["city", "listing_count"],
                sql: "SELECT location AS city, COUNT(*) AS listing_count
                      FROM food_listings
                      GROUP BY location
                      ORDER BY listing_count DESC, city ASC
                      LIMIT 10",
            },
            Report::FoodTypeDistribution => ReportDefinition {
                name: "food-type-distribution",
                title: "Listings per food type",
                columns: &["food_type", "listing_count"],
                sql: "SELECT food_type AS food_type, COUNT(*) AS listing_count
                      FROM food_listings
                      GROUP BY food_type
                      ORDER BY listing_count DESC, food_type ASC",
            },
            Report::ClaimsPerFoodItem => ReportDefinition {
                name: "claims-per-food-item",
                title: "Most claimed food items",
                columns: &["food_name", "claim_count"],
                sql: "SELECT f.food_name AS food_name, COUNT(c.claim_id) AS claim_count
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      GROUP BY f.food_name
                      ORDER BY claim_count DESC, f.food_name ASC
                      LIMIT 10",
            },
            Report::TopProvidersByCompletedClaims => ReportDefinition {
                name: "top-providers-by-completed-claims",
                title: "Providers with the most completed claims",
                columns: &["provider", "completed_claims"],
                sql: "SELECT p.name AS provider, COUNT(c.claim_id) AS completed_claims
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      JOIN providers p ON f.provider_id = p.provider_id
                      WHERE c.status = 'Completed'
                      GROUP BY p.name
                      ORDER BY completed_claims DESC, provider ASC
                      LIMIT 10",
            },
            Report::ClaimStatusShare => ReportDefinition {
                name: "claim-status-share",
                title: "Claims per status",
                columns: &["status", "claim_count", "share"],
                sql: "SELECT status AS status,
                             COUNT(*) AS claim_count,
                             CAST(COUNT(*) AS REAL) / (SELECT COUNT(*) FROM claims) AS share
                      FROM claims
                      GROUP BY status
                      ORDER BY claim_count DESC, status ASC",
            },
            Report::AvgQuantityPerReceiver => ReportDefinition {
                name: "avg-quantity-per-receiver",
                title: "Average listing quantity claimed per receiver",
                columns: &["receiver", "avg_quantity"],
                sql: "SELECT r.name AS receiver, AVG(f.quantity) AS avg_quantity
                      FROM claims c
                      JOIN receivers r ON c.receiver_id = r.receiver_id
                      JOIN food_listings f ON c.food_id = f.food_id
                      GROUP BY r.name
                      ORDER BY avg_quantity DESC, receiver ASC
                      LIMIT 10",
            },
            Report::MealTypeDemand => ReportDefinition {
                name: "meal-type-demand",
                title: "Claims per meal type",
                columns: &["meal_type", "claim_count"],
                sql: "SELECT f.meal_type AS meal_type, COUNT(c.claim_id) AS claim_count
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      GROUP BY f.meal_type
                      ORDER BY claim_count DESC, f.meal_type ASC",
            },
            Report::QuantityPerProvider => ReportDefinition {
                name: "quantity-per-provider",
                title: "Providers by total quantity donated",
                columns: &["provider", "total_quantity"],
                sql: "SELECT p.name AS provider, SUM(f.quantity) AS total_quantity
                      FROM food_listings f
                      JOIN providers p ON f.provider_id = p.provider_id
                      GROUP BY p.name
                      ORDER BY total_quantity DESC, provider ASC
                      LIMIT 10",
            },
            Report::ClaimsByHour => ReportDefinition {
                name: "claims-by-hour",
                title: "Claims per hour of day",
                columns: &["hour", "claim_count"],
                sql: "SELECT strftime('%H', claimed_at) AS hour, COUNT(claim_id) AS claim_count
                      FROM claims
                      GROUP BY hour
                      ORDER BY hour ASC",
            },
            Report::QuantityByCity => ReportDefinition {
                name: "quantity-by-city",
                title: "Cities by total quantity listed",
                columns: &["city", "total_quantity"],
                sql: "SELECT location AS city, SUM(quantity) AS total_quantity
                      FROM food_listings
                      GROUP BY location
                      ORDER BY total_quantity DESC, city ASC
                      LIMIT 10",
            },
            Report::ClaimTimeliness => ReportDefinition {
                name: "claim-timeliness",
                title: "Average days before expiry at completed claim time",
                columns: &["avg_days_before_expiry"],
                sql: "SELECT COALESCE(
                                 AVG(julianday(f.expiry_date) - julianday(c.claimed_at)),
                                 0.0
                             ) AS avg_days_before_expiry
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      WHERE c.status = 'Completed'",
            },
            Report::CompletionRate => ReportDefinition {
                name: "completion-rate",
                title: "Claim completion rate",
                columns: &["total_claims", "completed_claims", "completion_rate"],
                sql: "SELECT COUNT(*) AS total_claims,
                             COALESCE(SUM(status = 'Completed'), 0) AS completed_claims,
                             CASE WHEN COUNT(*) = 0 THEN 0.0
                                  ELSE CAST(SUM(status = 'Completed') AS REAL) / COUNT(*)
                             END AS completion_rate
                      FROM claims",
            },
            Report::CompletionRateByCity => ReportDefinition {
                name: "completion-rate-by-city",
                title: "Claim completion rate per listing city",
                columns: &["city", "total_claims", "completed_claims", "completion_rate"],
                sql: "SELECT f.location AS city,
                             COUNT(*) AS total_claims,
                             SUM(c.status = 'Completed') AS completed_claims,
                             CAST(SUM(c.status = 'Completed') AS REAL) / COUNT(*) AS completion_rate
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      GROUP BY f.location
                      ORDER BY completion_rate DESC, total_claims DESC, city ASC",
            },
            Report::CompletionRateByFoodType => ReportDefinition {
                name: "completion-rate-by-food-type",
                title: "Claim completion rate per food type",
                columns: &["food_type", "total_claims", "completed_claims", "completion_rate"],
                sql: "SELECT f.food_type AS food_type,
                             COUNT(*) AS total_claims,
                             SUM(c.status = 'Completed') AS completed_claims,
                             CAST(SUM(c.status = 'Completed') AS REAL) / COUNT(*) AS completion_rate
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      GROUP BY f.food_type
                      ORDER BY completion_rate DESC, total_claims DESC, f.food_type ASC",
            },
            Report::CompletionRateByProviderType => ReportDefinition {
                name: "completion-rate-by-provider-type",
                title: "Claim completion rate per provider type",
                columns: &[
                    "provider_type",
                    "total_claims",
                    "completed_claims",
                    "completion_rate",
                ],
                sql: "SELECT p.provider_type AS provider_type,
                             COUNT(*) AS total_claims,
                             SUM(c.status = 'Completed') AS completed_claims,
                             CAST(SUM(c.status = 'Completed') AS REAL) / COUNT(*) AS completion_rate
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      JOIN providers p ON f.provider_id = p.provider_id
                      GROUP BY p.provider_type
                      ORDER BY completion_rate DESC, total_claims DESC, p.provider_type ASC",
            },
            Report::CompletedFoodTypes => ReportDefinition {
                name: "completed-food-types",
                title: "Food types among completed claims",
                columns: &["food_type", "completed_claims"],
                sql: "SELECT f.food_type AS food_type, COUNT(*) AS completed_claims
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      WHERE c.status = 'Completed'
                      GROUP BY f.food_type
                      ORDER BY completed_claims DESC, f.food_type ASC",
            },
            Report::CompletedMealTypes => ReportDefinition {
                name: "completed-meal-types",
                title: "Meal types among completed claims",
                columns: &["meal_type", "completed_claims"],
                sql: "SELECT f.meal_type AS meal_type, COUNT(*) AS completed_claims
                      FROM claims c
                      JOIN food_listings f ON c.food_id = f.food_id
                      WHERE c.status = 'Completed'
                      GROUP BY f.meal_type
                      ORDER BY completed_claims DESC, f.meal_type ASC",
            },
            Report::ListedVsClaimed => ReportDefinition {
                name: "listed-vs-claimed",
                title: "Quantity listed versus quantity successfully claimed",
                columns: &["total_listed", "total_claimed", "unclaimed", "claimed_share"],
                sql: "SELECT total_listed AS total_listed,
                             total_claimed AS total_claimed,
                             total_listed - total_claimed AS unclaimed,
                             CASE WHEN total_listed = 0 THEN 0.0
                                  ELSE CAST(total_claimed AS REAL) / total_listed
                             END AS claimed_share
                      FROM (
                          SELECT COALESCE(SUM(f.quantity), 0) AS total_listed,
                                 COALESCE(SUM(CASE WHEN EXISTS (
                                          SELECT 1 FROM claims c
                                          WHERE c.food_id = f.food_id AND c.status = 'Completed'
                                      ) THEN f.quantity ELSE 0 END), 0) AS total_claimed
                          FROM food_listings f
                      )",
            },
            Report::MostActiveProviders => ReportDefinition {
                name: "most-active-providers",
                title: "Providers with the most listings",
                columns: &["provider", "listing_count", "total_quantity"],
                sql: "SELECT p.name AS provider,
                             COUNT(f.food_id) AS listing_count,
                             COALESCE(SUM(f.quantity), 0) AS total_quantity
                      FROM providers p
                      JOIN food_listings f ON f.provider_id = p.provider_id
                      GROUP BY p.provider_id, p.name
                      ORDER BY listing_count DESC, total_quantity DESC, provider ASC, p.provider_id ASC
                      LIMIT 10",
            },
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Report {
    type Err = FoodError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Report::ALL
            .iter()
            .copied()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| FoodError::UnknownReport {
                name: s.to_string(),
            })
    }
}

impl FoodDatabase {
    /// Run one report against the current database state
    pub fn run_report(&self, report: Report) -> Result<ReportTable> {
        let definition = report.definition();
        let mut stmt = self.conn.prepare(definition.sql)?;
        let width = stmt.column_count();
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        debug_assert_eq!(columns, definition.columns, "report {} columns", definition.name);

        let mut rows = stmt.query([])?;
        let mut table_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(Cell::from(row.get_ref(idx)?));
            }
            table_rows.push(cells);
        }

        Ok(ReportTable {
            report,
            title: definition.title.to_string(),
            columns,
            rows: table_rows,
        })
    }

    /// Run every report in catalog order
    pub fn run_all_reports(&self) -> Result<Vec<ReportTable>> {
        Report::ALL.iter().map(|r| self.run_report(*r)).collect()
    }
}
