//! The application controller.
//!
//! `Tracker` owns the workout collection and is the only component that
//! mutates it. It turns map clicks, form submissions and list clicks into
//! records, persistence writes and commands for the map and view.
//!
//! # Entry flow
//! - `Idle`: a map click remembers the position and reveals the form.
//! - `AwaitingFormSubmit`: a valid submission creates the record, draws it,
//!   saves the collection and goes back to `Idle`. An invalid one keeps the
//!   form open with an error.
//!
//! Until the browser reports a position there is no map, so map clicks are
//! ignored and the app only lists what was loaded from storage.

use crate::config::{FOCUS_ZOOM, MAP_ZOOM, PAN_DURATION_SECS};
use crate::error::{Error, Result};
use crate::map::MapSurface;
use crate::storage::WorkoutStore;
use crate::view::WorkoutView;
use crate::workout::{create_cycling, create_running, Coords, WorkoutId, WorkoutKind, WorkoutRecord};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryState {
    Idle,
    AwaitingFormSubmit { at: Coords },
}

/// Raw numbers from the entry form. `extra` is the cadence for running and
/// the elevation gain for cycling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormSubmission {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub extra: f64,
}

pub struct Tracker<M: MapSurface, V: WorkoutView> {
    store: WorkoutStore,
    map: M,
    view: V,
    workouts: Vec<WorkoutRecord>,
    state: EntryState,
    map_ready: bool,
}

impl<M: MapSurface, V: WorkoutView> Tracker<M, V> {
    /// Load persisted workouts and list them. Markers follow once the map
    /// exists (see [`Tracker::on_position`]).
    pub fn start(store: WorkoutStore, map: M, mut view: V) -> Self {
        let workouts = store.load().unwrap_or_else(|e| {
            warn!("Starting with no workouts: {}", e);
            Vec::new()
        });
        info!("Loaded {} workouts", workouts.len());

        for workout in &workouts {
            view.render_entry(workout);
        }

        Tracker {
            store,
            map,
            view,
            workouts,
            state: EntryState::Idle,
            map_ready: false,
        }
    }

    pub fn on_position(&mut self, position: Result<Coords>) {
        match position {
            Ok(center) => {
                debug!("Showing map at {:?}", center);
                self.map.show(center, MAP_ZOOM);
                self.map_ready = true;
                for workout in &self.workouts {
                    self.map.add_marker(workout);
                }
            }
            Err(e) => {
                warn!("{}", e);
                self.view.show_error(&e.to_string());
            }
        }
    }

    pub fn on_map_click(&mut self, at: Coords) {
        if !self.map_ready {
            debug!("Ignoring map click before the map exists");
            return;
        }
        self.state = EntryState::AwaitingFormSubmit { at };
        self.view.show_form();
    }

    pub fn on_kind_changed(&mut self, kind: WorkoutKind) {
        if let EntryState::AwaitingFormSubmit { .. } = self.state {
            self.view.toggle_extra_field(kind);
        }
    }

    pub fn on_submit(&mut self, form: FormSubmission) -> Result<WorkoutId> {
        let EntryState::AwaitingFormSubmit { at } = self.state else {
            return Err(Error::NoPendingLocation);
        };

        let created = match form.kind {
            WorkoutKind::Running => create_running(form.distance_km, form.duration_min, at, form.extra),
            WorkoutKind::Cycling => create_cycling(form.distance_km, form.duration_min, at, form.extra),
        };
        let workout = match created {
            Ok(workout) => workout,
            Err(e) => {
                self.view.show_error(&e.to_string());
                return Err(e);
            }
        };

        let id = workout.id().clone();
        self.map.add_marker(&workout);
        self.view.render_entry(&workout);
        self.view.hide_form();
        self.workouts.push(workout);
        self.persist();
        self.state = EntryState::Idle;

        info!("Recorded workout {}", id);
        Ok(id)
    }

    /// Center the map on the workout behind a list entry.
    pub fn on_entry_click(&mut self, id: &WorkoutId) -> Result<()> {
        let at = self
            .workouts
            .iter()
            .find(|w| w.id() == id)
            .map(|w| w.coordinates())
            .ok_or_else(|| Error::RecordNotFound(id.clone()))?;

        if self.map_ready {
            self.map.recenter(at, FOCUS_ZOOM, PAN_DURATION_SECS);
        }
        Ok(())
    }

    /// Forget every workout, persisted ones included.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.workouts.clear();
        self.view.clear_entries();
        self.map.clear_markers();
        if let EntryState::AwaitingFormSubmit { .. } = self.state {
            self.view.hide_form();
        }
        self.state = EntryState::Idle;
        info!("Cleared all workouts");
        Ok(())
    }

    /// Write failures are not fatal: the collection stays usable in memory
    /// for the rest of the session.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.workouts) {
            warn!("Workouts will not survive a reload: {}", e);
        }
    }

    pub fn workouts(&self) -> &[WorkoutRecord] {
        &self.workouts
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn map_ready(&self) -> bool {
        self.map_ready
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputProblem;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::view::ViewModel;

    #[derive(Debug, Clone, PartialEq)]
    enum MapCommand {
        Show(Coords, u8),
        Marker(WorkoutId),
        Recenter(Coords, u8),
        Clear,
    }

    #[derive(Default)]
    struct RecordingMap {
        commands: Vec<MapCommand>,
    }

    impl MapSurface for RecordingMap {
        fn show(&mut self, center: Coords, zoom: u8) {
            self.commands.push(MapCommand::Show(center, zoom));
        }
        fn add_marker(&mut self, record: &WorkoutRecord) {
            self.commands.push(MapCommand::Marker(record.id().clone()));
        }
        fn recenter(&mut self, at: Coords, zoom: u8, _pan_duration_secs: f64) {
            self.commands.push(MapCommand::Recenter(at, zoom));
        }
        fn clear_markers(&mut self) {
            self.commands.push(MapCommand::Clear);
        }
    }

    /// Accepts reads but refuses every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn write(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::QuotaExceeded)
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    const KEY: &str = "workouts";
    const HOME: Coords = Coords {
        lat: 51.5,
        lng: -0.09,
    };

    fn tracker_over(slots: &MemoryStore) -> Tracker<RecordingMap, ViewModel> {
        Tracker::start(
            WorkoutStore::new(Box::new(slots.clone()), KEY),
            RecordingMap::default(),
            ViewModel::default(),
        )
    }

    fn running(distance_km: f64, duration_min: f64, cadence: f64) -> FormSubmission {
        FormSubmission {
            kind: WorkoutKind::Running,
            distance_km,
            duration_min,
            extra: cadence,
        }
    }

    fn cycling(distance_km: f64, duration_min: f64, elevation: f64) -> FormSubmission {
        FormSubmission {
            kind: WorkoutKind::Cycling,
            distance_km,
            duration_min,
            extra: elevation,
        }
    }

    #[test]
    fn test_full_entry_flow() {
        let slots = MemoryStore::default();
        let mut tracker = tracker_over(&slots);
        tracker.on_position(Ok(HOME));

        let spot = Coords::new(51.51, -0.1);
        tracker.on_map_click(spot);
        assert_eq!(tracker.state(), EntryState::AwaitingFormSubmit { at: spot });
        assert!(tracker.view().form().visible);

        let id = tracker.on_submit(running(5.0, 30.0, 150.0)).unwrap();

        assert_eq!(tracker.state(), EntryState::Idle);
        assert!(!tracker.view().form().visible);
        assert_eq!(tracker.workouts().len(), 1);
        assert_eq!(tracker.workouts()[0].coordinates(), spot);
        assert_eq!(tracker.view().entry_count(), 1);
        assert_eq!(
            tracker.map().commands,
            vec![MapCommand::Show(HOME, MAP_ZOOM), MapCommand::Marker(id)]
        );

        let persisted = WorkoutStore::new(Box::new(slots), KEY).load().unwrap();
        assert_eq!(persisted, tracker.workouts().to_vec());
    }

    #[test]
    fn test_invalid_submission_keeps_form_open() {
        let mut tracker = tracker_over(&MemoryStore::default());
        tracker.on_position(Ok(HOME));
        tracker.on_map_click(HOME);

        let err = tracker.on_submit(running(5.0, -30.0, 150.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput {
                field: "duration",
                problem: InputProblem::NotPositive
            }
        ));
        assert_eq!(tracker.state(), EntryState::AwaitingFormSubmit { at: HOME });
        assert!(tracker.view().form().visible);
        assert_eq!(tracker.view().error(), Some("Invalid duration: must be positive"));
        assert!(tracker.workouts().is_empty());

        tracker.on_submit(running(5.0, 30.0, 150.0)).unwrap();
        assert_eq!(tracker.workouts().len(), 1);
        assert!(!tracker.view().form().visible);
        assert_eq!(tracker.view().error(), None);
    }

    #[test]
    fn test_cycling_with_flat_route() {
        let mut tracker = tracker_over(&MemoryStore::default());
        tracker.on_position(Ok(HOME));
        tracker.on_map_click(HOME);
        tracker.on_submit(cycling(20.0, 60.0, 0.0)).unwrap();
        assert_eq!(tracker.workouts()[0].kind(), WorkoutKind::Cycling);
    }

    #[test]
    fn test_submit_without_map_click() {
        let mut tracker = tracker_over(&MemoryStore::default());
        tracker.on_position(Ok(HOME));
        assert!(matches!(
            tracker.on_submit(running(5.0, 30.0, 150.0)),
            Err(Error::NoPendingLocation)
        ));
        assert!(tracker.workouts().is_empty());
    }

    #[test]
    fn test_kind_change_only_while_form_open() {
        let mut tracker = tracker_over(&MemoryStore::default());
        tracker.on_position(Ok(HOME));

        tracker.on_kind_changed(WorkoutKind::Cycling);
        assert_eq!(tracker.view().form().extra_field, WorkoutKind::Running);

        tracker.on_map_click(HOME);
        tracker.on_kind_changed(WorkoutKind::Cycling);
        assert_eq!(tracker.view().form().extra_field, WorkoutKind::Cycling);
        assert_eq!(tracker.state(), EntryState::AwaitingFormSubmit { at: HOME });
    }

    #[test]
    fn test_unknown_entry_click_is_a_no_op() {
        let mut tracker = tracker_over(&MemoryStore::default());
        tracker.on_position(Ok(HOME));
        tracker.on_map_click(HOME);
        tracker.on_submit(running(5.0, 30.0, 150.0)).unwrap();
        let commands_before = tracker.map().commands.clone();

        let result = tracker.on_entry_click(&WorkoutId::from("does-not-exist"));

        assert!(matches!(result, Err(Error::RecordNotFound(_))));
        assert_eq!(tracker.map().commands, commands_before);
        assert_eq!(tracker.state(), EntryState::Idle);
        assert_eq!(tracker.workouts().len(), 1);
    }

    #[test]
    fn test_entry_click_recenters_map() {
        let mut tracker = tracker_over(&MemoryStore::default());
        tracker.on_position(Ok(HOME));
        let spot = Coords::new(40.0, 3.0);
        tracker.on_map_click(spot);
        let id = tracker.on_submit(cycling(12.0, 40.0, 80.0)).unwrap();

        tracker.on_entry_click(&id).unwrap();
        assert_eq!(
            tracker.map().commands.last(),
            Some(&MapCommand::Recenter(spot, FOCUS_ZOOM))
        );
    }

    #[test]
    fn test_restart_restores_list_then_markers() {
        let slots = MemoryStore::default();
        let recorded = {
            let mut tracker = tracker_over(&slots);
            tracker.on_position(Ok(HOME));
            tracker.on_map_click(HOME);
            tracker.on_submit(running(5.0, 30.0, 150.0)).unwrap();
            tracker.on_map_click(HOME);
            tracker.on_submit(cycling(20.0, 60.0, 10.0)).unwrap();
            tracker.workouts().to_vec()
        };

        let mut tracker = tracker_over(&slots);
        assert_eq!(tracker.workouts(), recorded.as_slice());
        assert_eq!(tracker.view().entry_count(), 2);
        assert!(tracker.map().commands.is_empty());

        tracker.on_position(Ok(HOME));
        let markers: Vec<_> = tracker
            .map()
            .commands
            .iter()
            .filter(|c| matches!(c, MapCommand::Marker(_)))
            .cloned()
            .collect();
        assert_eq!(
            markers,
            recorded
                .iter()
                .map(|w| MapCommand::Marker(w.id().clone()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_geolocation_denied_is_list_only() {
        let mut tracker = tracker_over(&MemoryStore::default());
        tracker.on_position(Err(Error::GeolocationDenied("User denied Geolocation".into())));

        assert!(!tracker.map_ready());
        assert!(tracker.view().error().is_some());

        tracker.on_map_click(HOME);
        assert_eq!(tracker.state(), EntryState::Idle);
        assert!(!tracker.view().form().visible);
        assert!(tracker.map().commands.is_empty());
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let mut tracker = Tracker::start(
            WorkoutStore::new(Box::new(ReadOnlyStore), KEY),
            RecordingMap::default(),
            ViewModel::default(),
        );
        tracker.on_position(Ok(HOME));
        tracker.on_map_click(HOME);

        assert!(tracker.on_submit(running(5.0, 30.0, 150.0)).is_ok());
        assert_eq!(tracker.workouts().len(), 1);
        assert_eq!(tracker.state(), EntryState::Idle);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let slots = MemoryStore::default();
        slots.write(KEY, "[[[").unwrap();
        let tracker = tracker_over(&slots);
        assert!(tracker.workouts().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let slots = MemoryStore::default();
        let mut tracker = tracker_over(&slots);
        tracker.on_position(Ok(HOME));
        tracker.on_map_click(HOME);
        tracker.on_submit(running(5.0, 30.0, 150.0)).unwrap();
        tracker.on_map_click(HOME);

        tracker.reset().unwrap();

        assert!(tracker.workouts().is_empty());
        assert_eq!(tracker.view().entry_count(), 0);
        assert_eq!(tracker.state(), EntryState::Idle);
        assert!(!tracker.view().form().visible);
        assert_eq!(tracker.map().commands.last(), Some(&MapCommand::Clear));
        assert_eq!(slots.read(KEY).unwrap(), None);
    }
}
