use crate::domain::model::{
    Car, CarSummary, Claim, ExpiredPolicy, NewCar, NewClaim, NewPolicy, Owner, Policy,
};
use crate::domain::ports::InsuranceStore;
use crate::utils::error::{InsuranceError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    owners: Vec<Owner>,
    cars: Vec<Car>,
    policies: Vec<Policy>,
    claims: Vec<Claim>,
    next_owner_id: i64,
    next_car_id: i64,
    next_policy_id: i64,
    next_claim_id: i64,
}

impl Tables {
    fn car(&self, car_id: i64) -> Option<&Car> {
        self.cars.iter().find(|c| c.id == car_id)
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// In-process store with auto-incrementing ids starting at 1.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| InsuranceError::storage("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| InsuranceError::storage("memory store lock poisoned"))
    }
}

#[async_trait]
impl InsuranceStore for MemoryStore {
    async fn list_cars(&self) -> Result<Vec<CarSummary>> {
        let tables = self.read()?;
        tables
            .cars
            .iter()
            .map(|car| {
                let owner = tables
                    .owners
                    .iter()
                    .find(|o| o.id == car.owner_id)
                    .ok_or_else(|| {
                        InsuranceError::storage(format!(
                            "car {} references missing owner {}",
                            car.id, car.owner_id
                        ))
                    })?;
                Ok(CarSummary {
                    id: car.id,
                    vin: car.vin.clone(),
                    make: car.make.clone(),
                    model: car.model.clone(),
                    year: car.year_of_manufacture,
                    owner_id: owner.id,
                    owner_name: owner.name.clone(),
                    owner_email: owner.email.clone(),
                })
            })
            .collect()
    }

    async fn car_exists(&self, car_id: i64) -> Result<bool> {
        Ok(self.read()?.car(car_id).is_some())
    }

    async fn find_car(&self, car_id: i64) -> Result<Option<Car>> {
        Ok(self.read()?.car(car_id).cloned())
    }

    async fn has_policy_covering(&self, car_id: i64, date: NaiveDate) -> Result<bool> {
        Ok(self
            .read()?
            .policies
            .iter()
            .any(|p| p.car_id == car_id && p.start_date <= date && p.end_date >= date))
    }

    async fn policies_for_car(&self, car_id: i64) -> Result<Vec<Policy>> {
        let mut policies: Vec<Policy> = self
            .read()?
            .policies
            .iter()
            .filter(|p| p.car_id == car_id)
            .cloned()
            .collect();
        policies.sort_by_key(|p| p.start_date);
        Ok(policies)
    }

    async fn claims_for_car(&self, car_id: i64) -> Result<Vec<Claim>> {
        let mut claims: Vec<Claim> = self
            .read()?
            .claims
            .iter()
            .filter(|c| c.car_id == car_id)
            .cloned()
            .collect();
        claims.sort_by_key(|c| c.claim_date);
        Ok(claims)
    }

    async fn insert_claim(&self, car_id: i64, claim: &NewClaim) -> Result<i64> {
        let mut tables = self.write()?;
        if tables.car(car_id).is_none() {
            return Err(InsuranceError::CarNotFound { car_id });
        }
        let id = next_id(&mut tables.next_claim_id);
        tables.claims.push(Claim {
            id,
            car_id,
            claim_date: claim.claim_date,
            description: claim.description.clone(),
            amount: claim.amount,
        });
        Ok(id)
    }

    async fn policies_ending_on(&self, date: NaiveDate) -> Result<Vec<ExpiredPolicy>> {
        let tables = self.read()?;
        tables
            .policies
            .iter()
            .filter(|p| p.end_date == date)
            .map(|p| {
                let car = tables.car(p.car_id).ok_or_else(|| {
                    InsuranceError::storage(format!(
                        "policy {} references missing car {}",
                        p.id, p.car_id
                    ))
                })?;
                Ok(ExpiredPolicy {
                    policy_id: p.id,
                    car_id: car.id,
                    vin: car.vin.clone(),
                    end_date: p.end_date,
                })
            })
            .collect()
    }

    async fn insert_owner(&self, name: &str, email: Option<&str>) -> Result<i64> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.next_owner_id);
        tables.owners.push(Owner {
            id,
            name: name.to_string(),
            email: email.map(str::to_string),
        });
        Ok(id)
    }

    async fn insert_car(&self, car: &NewCar) -> Result<i64> {
        let mut tables = self.write()?;
        if !tables.owners.iter().any(|o| o.id == car.owner_id) {
            return Err(InsuranceError::invalid_input(
                "owner_id",
                format!("owner {} does not exist", car.owner_id),
            ));
        }
        let id = next_id(&mut tables.next_car_id);
        tables.cars.push(Car {
            id,
            vin: car.vin.clone(),
            make: car.make.clone(),
            model: car.model.clone(),
            year_of_manufacture: car.year_of_manufacture,
            owner_id: car.owner_id,
        });
        Ok(id)
    }

    async fn insert_policy(&self, policy: &NewPolicy) -> Result<i64> {
        let mut tables = self.write()?;
        if tables.car(policy.car_id).is_none() {
            return Err(InsuranceError::CarNotFound {
                car_id: policy.car_id,
            });
        }
        let id = next_id(&mut tables.next_policy_id);
        tables.policies.push(Policy {
            id,
            car_id: policy.car_id,
            provider: policy.provider.clone(),
            start_date: policy.start_date,
            end_date: policy.end_date,
        });
        Ok(id)
    }
}
