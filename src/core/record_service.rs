use crate::domain::format::{claim_entry, policy_entry};
use crate::domain::model::{CarHistory, CarSummary, NewClaim};
use crate::domain::ports::InsuranceStore;
use crate::utils::error::{InsuranceError, Result};
use chrono::NaiveDate;
use std::sync::Arc;

/// Stateless facade over the store used by request handlers.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn InsuranceStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn InsuranceStore>) -> Self {
        Self { store }
    }

    pub async fn list_cars(&self) -> Result<Vec<CarSummary>> {
        let cars = self.store.list_cars().await?;
        tracing::debug!("Listed {} cars", cars.len());
        Ok(cars)
    }

    /// Inclusive on both ends; any one overlapping policy is enough.
    pub async fn is_insurance_valid(&self, car_id: i64, date: NaiveDate) -> Result<bool> {
        self.ensure_car_exists(car_id).await?;

        let valid = self.store.has_policy_covering(car_id, date).await?;
        tracing::debug!("Insurance for car {} on {}: valid={}", car_id, date, valid);
        Ok(valid)
    }

    /// Amount, description and date are stored as given.
    pub async fn register_claim(&self, car_id: i64, claim: &NewClaim) -> Result<i64> {
        self.ensure_car_exists(car_id).await?;

        let id = self.store.insert_claim(car_id, claim).await?;
        tracing::debug!("Registered claim {} for car {}", id, car_id);
        Ok(id)
    }

    pub async fn car_history(&self, car_id: i64) -> Result<CarHistory> {
        let car = self
            .store
            .find_car(car_id)
            .await?
            .ok_or(InsuranceError::CarNotFound { car_id })?;

        let mut policies: Vec<_> = self
            .store
            .policies_for_car(car_id)
            .await?
            .iter()
            .map(policy_entry)
            .collect();
        let mut claims: Vec<_> = self
            .store
            .claims_for_car(car_id)
            .await?
            .iter()
            .map(claim_entry)
            .collect();

        // storage ordering is not trusted
        policies.sort_by_key(|p| p.start_date);
        claims.sort_by_key(|c| c.claim_date);

        tracing::debug!(
            "History for car {}: {} policies, {} claims",
            car_id,
            policies.len(),
            claims.len()
        );

        Ok(CarHistory {
            car_id: car.id,
            vin: car.vin,
            policies,
            claims,
        })
    }

    async fn ensure_car_exists(&self, car_id: i64) -> Result<()> {
        if self.store.car_exists(car_id).await? {
            Ok(())
        } else {
            Err(InsuranceError::CarNotFound { car_id })
        }
    }
}
