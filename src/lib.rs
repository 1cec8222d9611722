//! Mapty: log running and cycling workouts by clicking on a map.
//!
//! The record model, persistence and controller are plain Rust and run
//! anywhere; `map`, `geolocation` and `components` bind them to Leaflet,
//! the browser and Yew.

pub mod components;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod map;
pub mod storage;
pub mod tracker;
pub mod utils;
pub mod view;
pub mod workout;

pub use error::{Error, InputProblem, Result};
pub use tracker::{EntryState, FormSubmission, Tracker};
pub use workout::{Coords, WorkoutDetails, WorkoutId, WorkoutKind, WorkoutRecord};
