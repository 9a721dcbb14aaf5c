pub mod availability;
pub mod client;
pub mod error;
pub mod pacing;
pub mod request;
pub mod types;

pub use availability::{evaluate, store_matches_whitelist, Evaluation, PickupDetail, StoreAvailability};
pub use client::{FetchOutcome, StoreClient};
pub use error::ScraperError;
pub use pacing::Jitter;
pub use request::{build_request, FulfillmentRequest};
pub use types::FulfillmentResponse;
