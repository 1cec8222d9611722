//! Workout records and their derived metrics.
//!
//! A record is built once from validated form input and never mutated.
//! Pace (running) or speed (cycling) is derived at construction time and
//! stored alongside the inputs.

use crate::error::{Error, InputProblem, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Correlation key between a list entry and its map marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Creation time in milliseconds plus 32 random bits, both hex.
    fn generate(created_at: DateTime<Utc>) -> Self {
        WorkoutId(format!(
            "{:x}-{:08x}",
            created_at.timestamp_millis(),
            rand::random::<u32>()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        WorkoutId(value.to_string())
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        WorkoutId(value)
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A map position, stored as a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coords { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Coords { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Lowercase name used for the form selector and CSS classes.
    pub fn name(self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♂️",
        }
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "running" => Ok(WorkoutKind::Running),
            "cycling" => Ok(WorkoutKind::Cycling),
            other => Err(format!("Unknown workout kind: {}", other)),
        }
    }
}

/// Kind-specific inputs and the metric derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkoutDetails {
    #[serde(rename_all = "camelCase")]
    Running {
        cadence_spm: u32,
        pace_min_per_km: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl WorkoutDetails {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    distance_km: f64,
    duration_min: f64,
    coordinates: Coords,
    description: String,
    #[serde(flatten)]
    details: WorkoutDetails,
}

impl WorkoutRecord {
    /// Assemble a record from already-trusted parts (stored or imported data).
    pub(crate) fn from_parts(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        distance_km: f64,
        duration_min: f64,
        coordinates: Coords,
        description: String,
        details: WorkoutDetails,
    ) -> Self {
        WorkoutRecord {
            id,
            created_at,
            distance_km,
            duration_min,
            coordinates,
            description,
            details,
        }
    }

    fn build(
        created_at: DateTime<Utc>,
        distance_km: f64,
        duration_min: f64,
        coordinates: Coords,
        details: WorkoutDetails,
    ) -> Self {
        let local_date = created_at.with_timezone(&Local).date_naive();
        WorkoutRecord {
            id: WorkoutId::generate(created_at),
            created_at,
            distance_km,
            duration_min,
            coordinates,
            description: describe(details.kind(), local_date),
            details,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn coordinates(&self) -> Coords {
        self.coordinates
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    pub fn details(&self) -> &WorkoutDetails {
        &self.details
    }
}

pub fn pace_min_per_km(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

pub fn speed_km_per_h(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

/// "Running on April 14"
pub fn describe(kind: WorkoutKind, date: NaiveDate) -> String {
    format!("{} on {} {}", kind.label(), MONTHS[date.month0() as usize], date.day())
}

fn check_finite(fields: &[(&'static str, f64)]) -> Result<()> {
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some(&(field, _)) => Err(Error::invalid(field, InputProblem::NotFinite)),
        None => Ok(()),
    }
}

fn check_positive(fields: &[(&'static str, f64)]) -> Result<()> {
    match fields.iter().find(|(_, v)| *v <= 0.0) {
        Some(&(field, _)) => Err(Error::invalid(field, InputProblem::NotPositive)),
        None => Ok(()),
    }
}

pub fn create_running(
    distance_km: f64,
    duration_min: f64,
    coords: Coords,
    cadence_spm: f64,
) -> Result<WorkoutRecord> {
    create_running_at(Utc::now(), distance_km, duration_min, coords, cadence_spm)
}

pub fn create_running_at(
    created_at: DateTime<Utc>,
    distance_km: f64,
    duration_min: f64,
    coords: Coords,
    cadence_spm: f64,
) -> Result<WorkoutRecord> {
    let fields = [
        ("distance", distance_km),
        ("duration", duration_min),
        ("cadence", cadence_spm),
    ];
    check_finite(&fields)?;
    check_positive(&fields)?;

    let cadence = cadence_spm.round();
    if cadence < 1.0 {
        return Err(Error::invalid("cadence", InputProblem::NotPositive));
    }
    if cadence > u32::MAX as f64 {
        return Err(Error::invalid("cadence", InputProblem::TooLarge));
    }

    Ok(WorkoutRecord::build(
        created_at,
        distance_km,
        duration_min,
        coords,
        WorkoutDetails::Running {
            cadence_spm: cadence as u32,
            pace_min_per_km: pace_min_per_km(distance_km, duration_min),
        },
    ))
}

pub fn create_cycling(
    distance_km: f64,
    duration_min: f64,
    coords: Coords,
    elevation_gain_m: f64,
) -> Result<WorkoutRecord> {
    create_cycling_at(Utc::now(), distance_km, duration_min, coords, elevation_gain_m)
}

/// Unlike running, the extra field only has to be non-negative: a flat
/// ride has zero elevation gain.
pub fn create_cycling_at(
    created_at: DateTime<Utc>,
    distance_km: f64,
    duration_min: f64,
    coords: Coords,
    elevation_gain_m: f64,
) -> Result<WorkoutRecord> {
    check_finite(&[
        ("distance", distance_km),
        ("duration", duration_min),
        ("elevation gain", elevation_gain_m),
    ])?;
    check_positive(&[("distance", distance_km), ("duration", duration_min)])?;
    if elevation_gain_m < 0.0 {
        return Err(Error::invalid("elevation gain", InputProblem::Negative));
    }

    Ok(WorkoutRecord::build(
        created_at,
        distance_km,
        duration_min,
        coords,
        WorkoutDetails::Cycling {
            elevation_gain_m,
            speed_km_per_h: speed_km_per_h(distance_km, duration_min),
        },
    ))
}
