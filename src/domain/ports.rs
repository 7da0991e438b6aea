use crate::domain::model::{
    Car, CarSummary, Claim, ExpiredPolicy, NewCar, NewClaim, NewPolicy, Policy,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Relational storage for cars, owners, policies and claims.
///
/// Each call is one query or one insert; nothing spans calls.
#[async_trait]
pub trait InsuranceStore: Send + Sync {
    async fn list_cars(&self) -> Result<Vec<CarSummary>>;

    async fn car_exists(&self, car_id: i64) -> Result<bool>;

    async fn find_car(&self, car_id: i64) -> Result<Option<Car>>;

    /// True if any policy of the car has `start_date <= date <= end_date`.
    async fn has_policy_covering(&self, car_id: i64, date: NaiveDate) -> Result<bool>;

    /// Ordered by start date.
    async fn policies_for_car(&self, car_id: i64) -> Result<Vec<Policy>>;

    /// Ordered by claim date.
    async fn claims_for_car(&self, car_id: i64) -> Result<Vec<Claim>>;

    /// Returns the assigned claim id.
    async fn insert_claim(&self, car_id: i64, claim: &NewClaim) -> Result<i64>;

    async fn policies_ending_on(&self, date: NaiveDate) -> Result<Vec<ExpiredPolicy>>;

    async fn insert_owner(&self, name: &str, email: Option<&str>) -> Result<i64>;

    async fn insert_car(&self, car: &NewCar) -> Result<i64>;

    async fn insert_policy(&self, policy: &NewPolicy) -> Result<i64>;
}
