//! SQLite-backed store.
//!
//! The connection sits behind a mutex and every query runs on the blocking
//! pool, so the async callers never stall the runtime on disk I/O.

use crate::domain::model::{
    Amount, Car, CarSummary, Claim, ExpiredPolicy, NewCar, NewClaim, NewPolicy, Policy,
};
use crate::domain::ports::InsuranceStore;
use crate::utils::error::{InsuranceError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS owners (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT
    );

    CREATE TABLE IF NOT EXISTS cars (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        vin TEXT NOT NULL,
        make TEXT,
        model TEXT,
        year_of_manufacture INTEGER NOT NULL,
        owner_id INTEGER NOT NULL REFERENCES owners(id)
    );

    CREATE TABLE IF NOT EXISTS policies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        car_id INTEGER NOT NULL REFERENCES cars(id),
        provider TEXT,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS claims (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        car_id INTEGER NOT NULL REFERENCES cars(id),
        claim_date TEXT NOT NULL,
        description TEXT NOT NULL,
        amount TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_policies_car ON policies(car_id);
    CREATE INDEX IF NOT EXISTS idx_policies_end ON policies(end_date);
    CREATE INDEX IF NOT EXISTS idx_claims_car ON claims(car_id);
";

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            InsuranceError::storage(format!(
                "failed to open database {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| InsuranceError::storage("sqlite connection lock poisoned"))?;
            op(&*guard)
        })
        .await
        .map_err(|e| InsuranceError::storage(format!("sqlite task failed: {}", e)))?
    }
}

fn car_exists(conn: &Connection, car_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM cars WHERE id = ?1", params![car_id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

// amounts are stored as decimal text
fn amount_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Amount> {
    let text: String = row.get(idx)?;
    text.parse::<Amount>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[async_trait]
impl InsuranceStore for SqliteStore {
    async fn list_cars(&self) -> Result<Vec<CarSummary>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.vin, c.make, c.model, c.year_of_manufacture,
                        o.id, o.name, o.email
                 FROM cars c JOIN owners o ON o.id = c.owner_id
                 ORDER BY c.id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(CarSummary {
                    id: row.get(0)?,
                    vin: row.get(1)?,
                    make: row.get(2)?,
                    model: row.get(3)?,
                    year: row.get(4)?,
                    owner_id: row.get(5)?,
                    owner_name: row.get(6)?,
                    owner_email: row.get(7)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn car_exists(&self, car_id: i64) -> Result<bool> {
        self.run(move |conn| car_exists(conn, car_id)).await
    }

    async fn find_car(&self, car_id: i64) -> Result<Option<Car>> {
        self.run(move |conn| {
            let car = conn
                .query_row(
                    "SELECT id, vin, make, model, year_of_manufacture, owner_id
                     FROM cars WHERE id = ?1",
                    params![car_id],
                    |row| {
                        Ok(Car {
                            id: row.get(0)?,
                            vin: row.get(1)?,
                            make: row.get(2)?,
                            model: row.get(3)?,
                            year_of_manufacture: row.get(4)?,
                            owner_id: row.get(5)?,
                        })
                    },
                )
                .optional()?;
            Ok(car)
        })
        .await
    }

    async fn has_policy_covering(&self, car_id: i64, date: NaiveDate) -> Result<bool> {
        self.run(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM policies
                     WHERE car_id = ?1 AND start_date <= ?2 AND end_date >= ?2
                     LIMIT 1",
                    params![car_id, date],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn policies_for_car(&self, car_id: i64) -> Result<Vec<Policy>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, car_id, provider, start_date, end_date
                 FROM policies WHERE car_id = ?1
                 ORDER BY start_date",
            )?;
            let rows = stmt.query_map(params![car_id], |row| {
                Ok(Policy {
                    id: row.get(0)?,
                    car_id: row.get(1)?,
                    provider: row.get(2)?,
                    start_date: row.get(3)?,
                    end_date: row.get(4)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn claims_for_car(&self, car_id: i64) -> Result<Vec<Claim>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, car_id, claim_date, description, amount
                 FROM claims WHERE car_id = ?1
                 ORDER BY claim_date",
            )?;
            let rows = stmt.query_map(params![car_id], |row| {
                Ok(Claim {
                    id: row.get(0)?,
                    car_id: row.get(1)?,
                    claim_date: row.get(2)?,
                    description: row.get(3)?,
                    amount: amount_column(row, 4)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn insert_claim(&self, car_id: i64, claim: &NewClaim) -> Result<i64> {
        let claim = claim.clone();
        self.run(move |conn| {
            if !car_exists(conn, car_id)? {
                return Err(InsuranceError::CarNotFound { car_id });
            }
            conn.execute(
                "INSERT INTO claims (car_id, claim_date, description, amount)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    car_id,
                    claim.claim_date,
                    claim.description,
                    claim.amount.to_string()
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn policies_ending_on(&self, date: NaiveDate) -> Result<Vec<ExpiredPolicy>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, c.id, c.vin, p.end_date
                 FROM policies p JOIN cars c ON c.id = p.car_id
                 WHERE p.end_date = ?1
                 ORDER BY p.id",
            )?;
            let rows = stmt.query_map(params![date], |row| {
                Ok(ExpiredPolicy {
                    policy_id: row.get(0)?,
                    car_id: row.get(1)?,
                    vin: row.get(2)?,
                    end_date: row.get(3)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn insert_owner(&self, name: &str, email: Option<&str>) -> Result<i64> {
        let name = name.to_string();
        let email = email.map(str::to_string);
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO owners (name, email) VALUES (?1, ?2)",
                params![name, email],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn insert_car(&self, car: &NewCar) -> Result<i64> {
        let car = car.clone();
        self.run(move |conn| {
            let owner: Option<i64> = conn
                .query_row(
                    "SELECT id FROM owners WHERE id = ?1",
                    params![car.owner_id],
                    |row| row.get(0),
                )
                .optional()?;
            if owner.is_none() {
                return Err(InsuranceError::invalid_input(
                    "owner_id",
                    format!("owner {} does not exist", car.owner_id),
                ));
            }
            conn.execute(
                "INSERT INTO cars (vin, make, model, year_of_manufacture, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![car.vin, car.make, car.model, car.year_of_manufacture, car.owner_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn insert_policy(&self, policy: &NewPolicy) -> Result<i64> {
        let policy = policy.clone();
        self.run(move |conn| {
            if !car_exists(conn, policy.car_id)? {
                return Err(InsuranceError::CarNotFound {
                    car_id: policy.car_id,
                });
            }
            conn.execute(
                "INSERT INTO policies (car_id, provider, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    policy.car_id,
                    policy.provider,
                    policy.start_date,
                    policy.end_date
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}
