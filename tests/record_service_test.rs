mod common;

use car_insurance::domain::model::{Amount, NewClaim};
use car_insurance::{InsuranceStore, MemoryStore, RecordService, SqliteStore};
use common::{add_car, add_policy, date, ScriptedStore};
use std::sync::Arc;

fn claim(on: chrono::NaiveDate, description: &str, cents: i64) -> NewClaim {
    NewClaim {
        claim_date: on,
        description: description.to_string(),
        amount: Amount::from_cents(cents),
    }
}

async fn service_with_yearly_policy(store: Arc<dyn InsuranceStore>) -> (RecordService, i64) {
    let car = add_car(store.as_ref(), "VIN12345").await;
    add_policy(store.as_ref(), car, Some("Allianz"), date(2023, 1, 1), date(2023, 12, 31)).await;
    (RecordService::new(store), car)
}

#[tokio::test]
async fn test_validity_inside_and_outside_policy() {
    let (service, car) = service_with_yearly_policy(Arc::new(MemoryStore::new())).await;

    assert!(service.is_insurance_valid(car, date(2023, 6, 15)).await.unwrap());
    assert!(!service.is_insurance_valid(car, date(2024, 1, 1)).await.unwrap());
    assert!(!service.is_insurance_valid(car, date(2022, 12, 31)).await.unwrap());
}

#[tokio::test]
async fn test_validity_bounds_are_inclusive() {
    for store in [
        Arc::new(MemoryStore::new()) as Arc<dyn InsuranceStore>,
        Arc::new(SqliteStore::open_in_memory().unwrap()) as Arc<dyn InsuranceStore>,
    ] {
        let (service, car) = service_with_yearly_policy(store).await;
        assert!(service.is_insurance_valid(car, date(2023, 1, 1)).await.unwrap());
        assert!(service.is_insurance_valid(car, date(2023, 12, 31)).await.unwrap());
    }
}

#[tokio::test]
async fn test_validity_with_overlapping_policies() {
    let store = Arc::new(MemoryStore::new());
    let car = add_car(store.as_ref(), "VINOVERLAP").await;
    add_policy(store.as_ref(), car, None, date(2024, 1, 1), date(2024, 6, 30)).await;
    add_policy(store.as_ref(), car, Some("Omniasig"), date(2024, 3, 1), date(2024, 12, 31)).await;
    let service = RecordService::new(store);

    assert!(service.is_insurance_valid(car, date(2024, 4, 1)).await.unwrap());
    assert!(service.is_insurance_valid(car, date(2024, 11, 1)).await.unwrap());
    assert!(!service.is_insurance_valid(car, date(2025, 1, 1)).await.unwrap());
}

#[tokio::test]
async fn test_validity_for_car_without_policies_is_false() {
    let store = Arc::new(MemoryStore::new());
    let car = add_car(store.as_ref(), "VINBARE").await;
    let service = RecordService::new(store);

    assert!(!service.is_insurance_valid(car, date(2024, 1, 1)).await.unwrap());
}

#[tokio::test]
async fn test_missing_car_is_not_found_everywhere() {
    let (service, _) = service_with_yearly_policy(Arc::new(MemoryStore::new())).await;

    let err = service.is_insurance_valid(404, date(2023, 6, 15)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Car 404 not found");

    let err = service
        .register_claim(404, &claim(date(2024, 3, 1), "Bumper damage", 45000))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = service.car_history(404).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_register_claim_appears_in_history() {
    for store in [
        Arc::new(MemoryStore::new()) as Arc<dyn InsuranceStore>,
        Arc::new(SqliteStore::open_in_memory().unwrap()) as Arc<dyn InsuranceStore>,
    ] {
        let (service, car) = service_with_yearly_policy(store).await;

        let id = service
            .register_claim(car, &claim(date(2024, 3, 1), "Bumper damage", 45000))
            .await
            .unwrap();
        assert!(id >= 1);

        let history = service.car_history(car).await.unwrap();
        assert_eq!(history.claims.len(), 1);
        assert_eq!(history.claims[0].claim_date, date(2024, 3, 1));
        assert_eq!(
            history.claims[0].description,
            "Insurance claim: Bumper damage (Amount: $450.00)"
        );
    }
}

#[tokio::test]
async fn test_claim_ids_are_always_new() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let first_car = add_car(store.as_ref(), "VINA").await;
    let second_car = add_car(store.as_ref(), "VINB").await;
    let service = RecordService::new(store);

    let mut ids = Vec::new();
    for i in 0..5 {
        let car = if i % 2 == 0 { first_car } else { second_car };
        ids.push(
            service
                .register_claim(car, &claim(date(2024, 1, 1 + i), "Dent", 1000))
                .await
                .unwrap(),
        );
    }

    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[tokio::test]
async fn test_register_claim_is_permissive() {
    let (service, car) = service_with_yearly_policy(Arc::new(MemoryStore::new())).await;

    service
        .register_claim(car, &claim(date(1970, 1, 1), "", -12_345))
        .await
        .unwrap();

    let history = service.car_history(car).await.unwrap();
    assert_eq!(
        history.claims[0].description,
        "Insurance claim:  (Amount: -$123.45)"
    );
}

#[tokio::test]
async fn test_sub_cent_and_large_amounts_are_accepted() {
    for store in [
        Arc::new(MemoryStore::new()) as Arc<dyn InsuranceStore>,
        Arc::new(SqliteStore::open_in_memory().unwrap()) as Arc<dyn InsuranceStore>,
    ] {
        let (service, car) = service_with_yearly_policy(store).await;

        for (day, raw) in [(1, "1.234"), (2, "0.005"), (3, "1e16")] {
            let claim = NewClaim {
                claim_date: date(2024, 4, day),
                description: "Scratch".to_string(),
                amount: raw.parse().unwrap(),
            };
            service.register_claim(car, &claim).await.unwrap();
        }

        let history = service.car_history(car).await.unwrap();
        let descriptions: Vec<_> = history.claims.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(
            descriptions,
            [
                "Insurance claim: Scratch (Amount: $1.23)",
                "Insurance claim: Scratch (Amount: $0.01)",
                "Insurance claim: Scratch (Amount: $10,000,000,000,000,000.00)",
            ]
        );
    }
}

#[tokio::test]
async fn test_history_policy_descriptions() {
    let store = Arc::new(MemoryStore::new());
    let car = add_car(store.as_ref(), "VIN12345").await;
    add_policy(store.as_ref(), car, None, date(2023, 1, 1), date(2023, 12, 31)).await;
    add_policy(store.as_ref(), car, Some("Allianz"), date(2024, 1, 1), date(2024, 12, 31)).await;
    let service = RecordService::new(store);

    let history = service.car_history(car).await.unwrap();
    assert_eq!(history.car_id, car);
    assert_eq!(history.vin, "VIN12345");
    assert_eq!(history.policies[0].provider, "Unknown Provider");
    assert_eq!(
        history.policies[0].description,
        "Insurance policy with Unknown Provider (valid until 2023-12-31)"
    );
    assert_eq!(history.policies[1].provider, "Allianz");
    assert_eq!(
        history.policies[1].description,
        "Insurance policy with Allianz (valid until 2024-12-31)"
    );
}

#[tokio::test]
async fn test_history_is_sorted_whatever_storage_returns() {
    let memory = MemoryStore::new();
    let car = add_car(&memory, "VINSORT").await;
    add_policy(&memory, car, Some("C"), date(2025, 1, 1), date(2025, 12, 31)).await;
    add_policy(&memory, car, Some("A"), date(2023, 1, 1), date(2023, 12, 31)).await;
    add_policy(&memory, car, Some("B"), date(2024, 1, 1), date(2024, 12, 31)).await;

    let store = ScriptedStore::reversed(memory);
    let service = RecordService::new(store);
    for (day, text) in [(20, "late"), (5, "early"), (12, "middle")] {
        service
            .register_claim(car, &claim(date(2024, 5, day), text, 100))
            .await
            .unwrap();
    }

    let history = service.car_history(car).await.unwrap();

    let starts: Vec<_> = history.policies.iter().map(|p| p.start_date).collect();
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    let providers: Vec<_> = history.policies.iter().map(|p| p.provider.as_str()).collect();
    assert_eq!(providers, ["A", "B", "C"]);

    let claim_dates: Vec<_> = history.claims.iter().map(|c| c.claim_date).collect();
    assert_eq!(claim_dates, [date(2024, 5, 5), date(2024, 5, 12), date(2024, 5, 20)]);
}

#[tokio::test]
async fn test_list_cars_joins_owner() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let first = add_car(store.as_ref(), "VIN1").await;
    let second = add_car(store.as_ref(), "VIN2").await;
    let service = RecordService::new(store);

    let cars = service.list_cars().await.unwrap();
    assert_eq!(cars.len(), 2);
    assert_eq!(cars[0].id, first);
    assert_eq!(cars[1].id, second);
    assert_eq!(cars[0].owner_name, "Ana Pop");
    assert_eq!(cars[0].owner_email.as_deref(), Some("ana.pop@example.com"));
    assert_eq!(cars[0].make.as_deref(), Some("Dacia"));
    assert_eq!(cars[0].year, 2018);
}

#[tokio::test]
async fn test_list_cars_on_empty_store() {
    let service = RecordService::new(Arc::new(MemoryStore::new()));
    assert!(service.list_cars().await.unwrap().is_empty());
}
