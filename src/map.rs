//! Map surface used by the controller, and its Leaflet implementation.
//! The Leaflet calls live in map_helpers.js; this module only binds them.

use crate::config::{POPUP_MAX_WIDTH, POPUP_MIN_WIDTH, TILE_ATTRIBUTION, TILE_URL};
use crate::workout::{Coords, WorkoutRecord};
use log::warn;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/map_helpers.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map(container_id: &str, lat: f64, lng: f64, zoom: u8, tile_url: &str, attribution: &str);

    #[wasm_bindgen(js_name = addWorkoutMarker)]
    fn add_workout_marker(lat: f64, lng: f64, popup_text: &str, popup_options: JsValue);

    #[wasm_bindgen(js_name = setMapView)]
    fn set_map_view(lat: f64, lng: f64, zoom: u8, pan_duration_secs: f64);

    #[wasm_bindgen(js_name = clearWorkoutMarkers)]
    fn clear_workout_markers();

    /// Forward every click on the map as `(lat, lng)`. The closure must
    /// outlive the map.
    #[wasm_bindgen(js_name = onMapClick)]
    pub fn on_map_click(callback: &Closure<dyn FnMut(f64, f64)>);
}

/// Commands the controller sends to the map widget.
pub trait MapSurface {
    fn show(&mut self, center: Coords, zoom: u8);
    fn add_marker(&mut self, record: &WorkoutRecord);
    fn recenter(&mut self, at: Coords, zoom: u8, pan_duration_secs: f64);
    fn clear_markers(&mut self);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupOptions {
    max_width: u32,
    min_width: u32,
    auto_close: bool,
    close_on_click: bool,
    class_name: String,
}

/// Popup label for a workout marker.
pub fn popup_text(record: &WorkoutRecord) -> String {
    format!("{} {}", record.kind().icon(), record.description())
}

pub struct LeafletMap {
    container_id: String,
}

impl LeafletMap {
    pub fn new(container_id: &str) -> Self {
        LeafletMap {
            container_id: container_id.to_string(),
        }
    }
}

impl MapSurface for LeafletMap {
    fn show(&mut self, center: Coords, zoom: u8) {
        init_map(&self.container_id, center.lat, center.lng, zoom, TILE_URL, TILE_ATTRIBUTION);
    }

    fn add_marker(&mut self, record: &WorkoutRecord) {
        let options = PopupOptions {
            max_width: POPUP_MAX_WIDTH,
            min_width: POPUP_MIN_WIDTH,
            auto_close: false,
            close_on_click: false,
            class_name: format!("{}-popup", record.kind().name()),
        };
        match serde_wasm_bindgen::to_value(&options) {
            Ok(options) => {
                let at = record.coordinates();
                add_workout_marker(at.lat, at.lng, &popup_text(record), options);
            }
            Err(e) => warn!("Skipping marker for {}: {}", record.id(), e),
        }
    }

    fn recenter(&mut self, at: Coords, zoom: u8, pan_duration_secs: f64) {
        set_map_view(at.lat, at.lng, zoom, pan_duration_secs);
    }

    fn clear_markers(&mut self) {
        clear_workout_markers();
    }
}
