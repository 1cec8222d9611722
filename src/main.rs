//! Entry point for the Mapty web app.
//! Builds the one `Tracker` for the page and wires DOM, map and geolocation
//! events into it.

use gloo_timers::callback::Timeout;
use log::{info, warn};
use mapty::{
    components::{render_workouts, WorkoutForm},
    config::{FORM_REVEAL_DELAY_MS, GEOLOCATION_TIMEOUT_MS, MAP_CONTAINER_ID, STORAGE_KEY},
    geolocation::current_position,
    map::{self, LeafletMap},
    storage::{BrowserStorage, KeyValueStore, MemoryStore, WorkoutStore},
    view::ViewModel,
    Coords, FormSubmission, Tracker, WorkoutId, WorkoutKind,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use yew::functional::UseForceUpdateHandle;
use yew::prelude::*;

type AppTracker = Tracker<LeafletMap, ViewModel>;

/// Local storage when the browser allows it, otherwise a session-only store.
fn open_store() -> WorkoutStore {
    let backend: Box<dyn KeyValueStore> = match BrowserStorage::local() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!("{}; workouts will only last for this session", e);
            Box::new(MemoryStore::default())
        }
    };
    WorkoutStore::new(backend, STORAGE_KEY)
}

/// Once the map exists, forward its clicks to the tracker for the rest of
/// the page lifetime.
fn listen_for_map_clicks(tracker: Rc<RefCell<AppTracker>>, redraw: UseForceUpdateHandle) {
    let on_click = Closure::<dyn FnMut(f64, f64)>::new(move |lat: f64, lng: f64| {
        tracker.borrow_mut().on_map_click(Coords::new(lat, lng));
        redraw.force_update();
    });
    map::on_map_click(&on_click);
    on_click.forget();
}

#[function_component(App)]
fn app() -> Html {
    let tracker = use_mut_ref(|| {
        Tracker::start(open_store(), LeafletMap::new(MAP_CONTAINER_ID), ViewModel::default())
    });
    let redraw = use_force_update();

    // Ask for the position once, after the map container is in the DOM.
    {
        let tracker = tracker.clone();
        let redraw = redraw.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                let position = current_position(GEOLOCATION_TIMEOUT_MS).await;
                let located = position.is_ok();
                tracker.borrow_mut().on_position(position);
                if located {
                    listen_for_map_clicks(tracker, redraw.clone());
                }
                redraw.force_update();
            });
            || ()
        });
    }

    let on_submit = {
        let tracker = tracker.clone();
        let redraw = redraw.clone();
        Callback::from(move |form: FormSubmission| {
            let recorded = tracker.borrow_mut().on_submit(form);
            if recorded.is_ok() {
                let tracker = tracker.clone();
                let redraw = redraw.clone();
                Timeout::new(FORM_REVEAL_DELAY_MS, move || {
                    tracker.borrow_mut().view_mut().restore_form_transition();
                    redraw.force_update();
                })
                .forget();
            }
            redraw.force_update();
        })
    };

    let on_kind_change = {
        let tracker = tracker.clone();
        let redraw = redraw.clone();
        Callback::from(move |kind: WorkoutKind| {
            tracker.borrow_mut().on_kind_changed(kind);
            redraw.force_update();
        })
    };

    let on_select = {
        let tracker = tracker.clone();
        Callback::from(move |id: WorkoutId| {
            if let Err(e) = tracker.borrow_mut().on_entry_click(&id) {
                warn!("{}", e);
            }
        })
    };

    let on_reset = {
        let tracker = tracker.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            if let Err(e) = tracker.borrow_mut().reset() {
                warn!("Reset failed: {}", e);
            }
            redraw.force_update();
        })
    };

    let on_dismiss = {
        let tracker = tracker.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            tracker.borrow_mut().view_mut().dismiss_error();
            redraw.force_update();
        })
    };

    let tracker = tracker.borrow();
    let view = tracker.view();

    html! {
        <>
            <div class="sidebar">
                <ul class="workouts">
                    <WorkoutForm form={view.form().clone()} {on_submit} {on_kind_change} />
                    { render_workouts(view.entries(), &on_select) }
                </ul>
                if let Some(message) = view.error() {
                    <div class="error" onclick={on_dismiss}>{ message.to_string() }</div>
                }
                if view.entry_count() > 0 {
                    <button class="btn-reset" onclick={on_reset}>{ "Reset workouts" }</button>
                }
            </div>
            <div id={MAP_CONTAINER_ID}></div>
        </>
    }
}

/// Entry point: logging, panic reporting, then the Yew renderer.
fn main() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    console_error_panic_hook::set_once();
    info!("Starting Mapty");
    yew::Renderer::<App>::new().render();
}
