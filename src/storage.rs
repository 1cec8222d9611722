//! Persistence of the workout collection in a string-keyed storage slot.
//!
//! The whole collection is written as one versioned JSON snapshot. Derived
//! metrics are stored with each record and trusted on load; they are not
//! recomputed, so a change to a formula only affects new records.
//!
//! Snapshots written by the first JavaScript release of the app (a bare
//! array under the `"workout"` key) are imported when no current snapshot
//! exists.

use crate::config::{LEGACY_STORAGE_KEY, SCHEMA_VERSION};
use crate::error::{Error, Result};
use crate::workout::{Coords, WorkoutDetails, WorkoutId, WorkoutRecord};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};

/// A durable string-keyed slot, e.g. `window.localStorage`.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// `window.localStorage`.
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn local() -> Result<Self> {
        let storage = gloo_utils::window()
            .local_storage()
            .map_err(storage_error)?
            .ok_or_else(|| Error::StorageUnavailable("localStorage is disabled".to_string()))?;
        Ok(BrowserStorage { storage })
    }
}

fn storage_error(err: JsValue) -> Error {
    match err.dyn_ref::<web_sys::DomException>() {
        Some(e) if e.name() == "QuotaExceededError" => Error::QuotaExceeded,
        Some(e) => Error::StorageUnavailable(e.message()),
        None => Error::StorageUnavailable(format!("{:?}", err)),
    }
}

impl KeyValueStore for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(storage_error)
    }
}

/// In-memory slots. Clones share the same slots, so a second store built
/// over a clone sees everything the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    workouts: &'a [WorkoutRecord],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    workouts: Vec<WorkoutRecord>,
}

pub fn encode(workouts: &[WorkoutRecord]) -> Result<String> {
    Ok(serde_json::to_string(&SnapshotRef {
        version: SCHEMA_VERSION,
        workouts,
    })?)
}

pub fn decode(raw: &str) -> Result<Vec<WorkoutRecord>> {
    let snapshot: Snapshot = serde_json::from_str(raw)?;
    if snapshot.version > SCHEMA_VERSION {
        return Err(Error::UnsupportedSchema(snapshot.version));
    }
    Ok(snapshot.workouts)
}

/// Record layout of the unversioned `"workout"` array.
#[derive(Deserialize)]
struct LegacyWorkout {
    id: String,
    date: DateTime<Utc>,
    distance: f64,
    duration: f64,
    coords: Coords,
    description: String,
    #[serde(flatten)]
    extra: LegacyExtra,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum LegacyExtra {
    Running {
        cadence: f64,
        pace: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        elevation_gain: f64,
        speed: f64,
    },
}

impl From<LegacyWorkout> for WorkoutRecord {
    fn from(legacy: LegacyWorkout) -> Self {
        let details = match legacy.extra {
            LegacyExtra::Running { cadence, pace } => WorkoutDetails::Running {
                cadence_spm: cadence.round().max(0.0) as u32,
                pace_min_per_km: pace,
            },
            LegacyExtra::Cycling {
                elevation_gain,
                speed,
            } => WorkoutDetails::Cycling {
                elevation_gain_m: elevation_gain,
                speed_km_per_h: speed,
            },
        };
        WorkoutRecord::from_parts(
            WorkoutId::from(legacy.id),
            legacy.date,
            legacy.distance,
            legacy.duration,
            legacy.coords,
            legacy.description,
            details,
        )
    }
}

pub fn decode_legacy(raw: &str) -> Result<Vec<WorkoutRecord>> {
    let legacy: Vec<LegacyWorkout> = serde_json::from_str(raw)?;
    Ok(legacy.into_iter().map(WorkoutRecord::from).collect())
}

/// Round-trips the workout collection through one fixed storage key.
pub struct WorkoutStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl WorkoutStore {
    pub fn new(backend: Box<dyn KeyValueStore>, key: &str) -> Self {
        WorkoutStore {
            backend,
            key: key.to_string(),
        }
    }

    /// Overwrites whatever was stored before.
    pub fn save(&self, workouts: &[WorkoutRecord]) -> Result<()> {
        let raw = encode(workouts)?;
        self.backend.write(&self.key, &raw)?;
        debug!("Saved {} workouts ({} bytes)", workouts.len(), raw.len());
        Ok(())
    }

    /// Returns an empty collection when nothing was ever saved.
    pub fn load(&self) -> Result<Vec<WorkoutRecord>> {
        if let Some(raw) = self.backend.read(&self.key)? {
            return decode(&raw);
        }
        match self.backend.read(LEGACY_STORAGE_KEY)? {
            Some(raw) => {
                let workouts = decode_legacy(&raw)?;
                info!("Imported {} workouts from legacy storage", workouts.len());
                Ok(workouts)
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.backend.remove(&self.key)?;
        self.backend.remove(LEGACY_STORAGE_KEY)
    }
}
