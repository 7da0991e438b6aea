use crate::domain::model::{NewCar, NewPolicy};
use crate::domain::ports::InsuranceStore;
use crate::utils::error::Result;
use chrono::NaiveDate;

const fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => date,
        None => panic!("seed date out of range"),
    }
}

const LOGAN: usize = 0;
const GOLF: usize = 1;

/// (car, provider, start, end); evaluated at compile time.
const SEED_POLICIES: [(usize, Option<&str>, NaiveDate, NaiveDate); 3] = [
    (LOGAN, Some("Allianz"), ymd(2024, 1, 1), ymd(2024, 12, 31)),
    (LOGAN, Some("Groupama"), ymd(2025, 1, 1), ymd(2025, 12, 31)),
    (GOLF, None, ymd(2024, 3, 1), ymd(2024, 9, 30)),
];

/// Populates an empty store with sample owners, cars and policies.
///
/// Returns false and leaves the store untouched when it already holds cars.
pub async fn seed_demo_data(store: &dyn InsuranceStore) -> Result<bool> {
    if !store.list_cars().await?.is_empty() {
        tracing::info!("Store already has cars, skipping demo data");
        return Ok(false);
    }

    let ana = store.insert_owner("Ana Pop", Some("ana.pop@example.com")).await?;
    let bogdan = store
        .insert_owner("Bogdan Ionescu", Some("bogdan.ionescu@example.com"))
        .await?;

    let logan = store
        .insert_car(&NewCar {
            vin: "VIN12345".to_string(),
            make: Some("Dacia".to_string()),
            model: Some("Logan".to_string()),
            year_of_manufacture: 2018,
            owner_id: ana,
        })
        .await?;
    let golf = store
        .insert_car(&NewCar {
            vin: "VIN67890".to_string(),
            make: Some("VW".to_string()),
            model: Some("Golf".to_string()),
            year_of_manufacture: 2021,
            owner_id: bogdan,
        })
        .await?;

    let cars = [logan, golf];
    for (car, provider, start_date, end_date) in SEED_POLICIES {
        store
            .insert_policy(&NewPolicy {
                car_id: cars[car],
                provider: provider.map(str::to_string),
                start_date,
                end_date,
            })
            .await?;
    }

    tracing::info!("Seeded demo data: 2 owners, 2 cars, 3 policies");
    Ok(true)
}
