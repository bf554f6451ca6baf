//! Type-safe wrappers and enums for stored food-sharing records.

pub mod ids;
pub mod status;

pub use ids::{ClaimId, FoodId, ProviderId, ReceiverId};
pub use status::ClaimStatus;
