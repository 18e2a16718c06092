use std::path::Path;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::LatencyProfile;
use crate::error::AppError;
use crate::models::{Activity, Contact, Deal, Profile, Task};
use crate::services::profile::ProfileStore;

/// An entity kept in a [`RecordStore`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Display name used in "not found" errors.
    const ENTITY: &'static str;

    fn id(&self) -> u64;
}

impl Record for Contact {
    const ENTITY: &'static str = "Contact";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Deal {
    const ENTITY: &'static str = "Deal";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Task {
    const ENTITY: &'static str = "Task";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Activity {
    const ENTITY: &'static str = "Activity";

    fn id(&self) -> u64 {
        self.id
    }
}

pub(crate) async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// In-memory collection for one entity type.
///
/// Identifiers are `max(existing) + 1`, computed and consumed under the same
/// write guard, so concurrent creates never share an id.
pub struct RecordStore<T> {
    records: RwLock<Vec<T>>,
    latency: LatencyProfile,
}

impl<T: Record> RecordStore<T> {
    pub fn new(latency: LatencyProfile) -> Self {
        Self::with_records(Vec::new(), latency)
    }

    pub fn with_records(records: Vec<T>, latency: LatencyProfile) -> Self {
        Self {
            records: RwLock::new(records),
            latency,
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub async fn get_all(&self) -> Vec<T> {
        simulate_latency(self.latency.list).await;
        self.records.read().clone()
    }

    pub async fn get_by_id(&self, id: u64) -> Result<T, AppError> {
        simulate_latency(self.latency.get).await;
        self.records
            .read()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(T::ENTITY, id))
    }

    /// `build` receives the identifier assigned to the new record.
    pub async fn create<F>(&self, build: F) -> T
    where
        F: FnOnce(u64) -> T,
    {
        simulate_latency(self.latency.create).await;
        let mut records = self.records.write();
        let record = build(next_id(&records));
        debug!("Created {} {}", T::ENTITY, record.id());
        records.push(record.clone());
        record
    }

    /// Creates records in input order under a single write guard.
    ///
    /// `build` sees the records that existed before the batch started, the
    /// identifier the item would receive, and the item. A rejected item does
    /// not consume an identifier and earlier successes are kept.
    pub async fn create_many<I, F, E>(&self, items: I, mut build: F) -> Vec<Result<T, E>>
    where
        I: IntoIterator,
        F: FnMut(&[T], u64, I::Item) -> Result<T, E>,
    {
        simulate_latency(self.latency.create).await;
        let mut records = self.records.write();
        let existing_len = records.len();
        let mut next = next_id(&records);

        let mut outcomes = Vec::new();
        for item in items {
            match build(&records[..existing_len], next, item) {
                Ok(record) => {
                    next = record.id() + 1;
                    records.push(record.clone());
                    outcomes.push(Ok(record));
                }
                Err(err) => outcomes.push(Err(err)),
            }
        }
        outcomes
    }

    /// Applies `apply` to the stored record in place. `apply` must leave the
    /// identifier untouched.
    pub async fn update<F>(&self, id: u64, apply: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut T),
    {
        simulate_latency(self.latency.update).await;
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| AppError::not_found(T::ENTITY, id))?;
        apply(record);
        debug_assert_eq!(record.id(), id, "updates must not change the identifier");
        Ok(record.clone())
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        simulate_latency(self.latency.delete).await;
        let mut records = self.records.write();
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| AppError::not_found(T::ENTITY, id))?;
        records.remove(index);
        debug!("Deleted {} {}", T::ENTITY, id);
        Ok(())
    }
}

fn next_id<T: Record>(records: &[T]) -> u64 {
    records.iter().map(Record::id).max().unwrap_or(0) + 1
}

/// Initial data loaded at startup.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl SeedData {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        info!("Loading seed data from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// Every store the service owns.
pub struct CrmStore {
    pub contacts: RecordStore<Contact>,
    pub deals: RecordStore<Deal>,
    pub tasks: RecordStore<Task>,
    pub activities: RecordStore<Activity>,
    pub profile: ProfileStore,
}

impl CrmStore {
    pub fn new(latency: LatencyProfile) -> Self {
        Self::from_seed(SeedData::default(), latency)
    }

    pub fn from_seed(seed: SeedData, latency: LatencyProfile) -> Self {
        if seed.profile.is_none() {
            warn!("No profile in seed data, using the default profile");
        }
        let store = Self {
            contacts: RecordStore::with_records(seed.contacts, latency),
            deals: RecordStore::with_records(seed.deals, latency),
            tasks: RecordStore::with_records(seed.tasks, latency),
            activities: RecordStore::with_records(seed.activities, latency),
            profile: ProfileStore::new(seed.profile.unwrap_or_default(), latency),
        };
        info!(
            "Store ready: {} contacts, {} deals, {} tasks, {} activities",
            store.contacts.len(),
            store.deals.len(),
            store.tasks.len(),
            store.activities.len()
        );
        store
    }
}
