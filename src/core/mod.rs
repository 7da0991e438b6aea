pub mod expiration;
pub mod record_service;
pub mod seed;

pub use crate::domain::model::{CarHistory, CarSummary, ExpiredPolicy, NewClaim};
pub use crate::domain::ports::InsuranceStore;
pub use crate::utils::error::Result;
