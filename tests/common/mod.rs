#![allow(dead_code)]

use async_trait::async_trait;
use car_insurance::domain::model::{
    Car, CarSummary, Claim, ExpiredPolicy, NewCar, NewClaim, NewPolicy, Policy,
};
use car_insurance::{Clock, InsuranceError, InsuranceStore, MemoryStore, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Inserts one owner and one car, returning the car id.
pub async fn add_car(store: &dyn InsuranceStore, vin: &str) -> i64 {
    let owner = store
        .insert_owner("Ana Pop", Some("ana.pop@example.com"))
        .await
        .unwrap();
    store
        .insert_car(&NewCar {
            vin: vin.to_string(),
            make: Some("Dacia".to_string()),
            model: Some("Logan".to_string()),
            year_of_manufacture: 2018,
            owner_id: owner,
        })
        .await
        .unwrap()
}

pub async fn add_policy(
    store: &dyn InsuranceStore,
    car_id: i64,
    provider: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
) -> i64 {
    store
        .insert_policy(&NewPolicy {
            car_id,
            provider: provider.map(str::to_string),
            start_date: start,
            end_date: end,
        })
        .await
        .unwrap()
}

/// Wraps a `MemoryStore`, optionally failing expiration scans or returning
/// history rows in reverse order.
pub struct ScriptedStore {
    pub inner: MemoryStore,
    pub failing_scans: AtomicUsize,
    pub scan_calls: AtomicUsize,
    pub reverse_history: bool,
}

impl ScriptedStore {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            failing_scans: AtomicUsize::new(0),
            scan_calls: AtomicUsize::new(0),
            reverse_history: false,
        })
    }

    pub fn failing_first_scans(inner: MemoryStore, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            failing_scans: AtomicUsize::new(failures),
            scan_calls: AtomicUsize::new(0),
            reverse_history: false,
        })
    }

    pub fn reversed(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            failing_scans: AtomicUsize::new(0),
            scan_calls: AtomicUsize::new(0),
            reverse_history: true,
        })
    }

    pub fn scans(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsuranceStore for ScriptedStore {
    async fn list_cars(&self) -> Result<Vec<CarSummary>> {
        self.inner.list_cars().await
    }

    async fn car_exists(&self, car_id: i64) -> Result<bool> {
        self.inner.car_exists(car_id).await
    }

    async fn find_car(&self, car_id: i64) -> Result<Option<Car>> {
        self.inner.find_car(car_id).await
    }

    async fn has_policy_covering(&self, car_id: i64, date: NaiveDate) -> Result<bool> {
        self.inner.has_policy_covering(car_id, date).await
    }

    async fn policies_for_car(&self, car_id: i64) -> Result<Vec<Policy>> {
        let mut policies = self.inner.policies_for_car(car_id).await?;
        if self.reverse_history {
            policies.reverse();
        }
        Ok(policies)
    }

    async fn claims_for_car(&self, car_id: i64) -> Result<Vec<Claim>> {
        let mut claims = self.inner.claims_for_car(car_id).await?;
        if self.reverse_history {
            claims.reverse();
        }
        Ok(claims)
    }

    async fn insert_claim(&self, car_id: i64, claim: &NewClaim) -> Result<i64> {
        self.inner.insert_claim(car_id, claim).await
    }

    async fn policies_ending_on(&self, date: NaiveDate) -> Result<Vec<ExpiredPolicy>> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_scans.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_scans.store(remaining - 1, Ordering::SeqCst);
            return Err(InsuranceError::storage("database is locked"));
        }
        self.inner.policies_ending_on(date).await
    }

    async fn insert_owner(&self, name: &str, email: Option<&str>) -> Result<i64> {
        self.inner.insert_owner(name, email).await
    }

    async fn insert_car(&self, car: &NewCar) -> Result<i64> {
        self.inner.insert_car(car).await
    }

    async fn insert_policy(&self, policy: &NewPolicy) -> Result<i64> {
        self.inner.insert_policy(policy).await
    }
}
