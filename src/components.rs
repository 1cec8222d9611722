//! Yew view components for the workout form and list.
//!
//! Components render from `ViewModel` data and report user actions through
//! callbacks; none of them talk to the controller directly.

use crate::tracker::FormSubmission;
use crate::utils::{format_metric, format_quantity, parse_form_number};
use crate::view::FormState;
use crate::workout::{WorkoutDetails, WorkoutId, WorkoutKind, WorkoutRecord};
use log::warn;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

fn input_value(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

fn selected_kind(node: &NodeRef) -> Option<WorkoutKind> {
    let value = node.cast::<HtmlSelectElement>()?.value();
    match value.parse() {
        Ok(kind) => Some(kind),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct WorkoutFormProps {
    pub form: FormState,
    pub on_submit: Callback<FormSubmission>,
    pub on_kind_change: Callback<WorkoutKind>,
}

#[function_component(WorkoutForm)]
pub fn workout_form(props: &WorkoutFormProps) -> Html {
    let kind_ref = use_node_ref();
    let distance_ref = use_node_ref();
    let duration_ref = use_node_ref();
    let cadence_ref = use_node_ref();
    let elevation_ref = use_node_ref();

    // Empty the inputs whenever the form is shown or hidden, and put the
    // cursor in the distance field when it opens.
    {
        let refs = [
            distance_ref.clone(),
            duration_ref.clone(),
            cadence_ref.clone(),
            elevation_ref.clone(),
        ];
        let distance_ref = distance_ref.clone();
        let visible = props.form.visible;
        use_effect_with(props.form.generation, move |_| {
            for node in &refs {
                if let Some(input) = node.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
            }
            if visible {
                if let Some(input) = distance_ref.cast::<HtmlInputElement>() {
                    let _ = input.focus();
                }
            }
            || ()
        });
    }

    let onsubmit = {
        let on_submit = props.on_submit.clone();
        let kind_ref = kind_ref.clone();
        let distance_ref = distance_ref.clone();
        let duration_ref = duration_ref.clone();
        let cadence_ref = cadence_ref.clone();
        let elevation_ref = elevation_ref.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(kind) = selected_kind(&kind_ref) else {
                return;
            };
            let extra = match kind {
                WorkoutKind::Running => input_value(&cadence_ref),
                WorkoutKind::Cycling => input_value(&elevation_ref),
            };
            on_submit.emit(FormSubmission {
                kind,
                distance_km: parse_form_number(&input_value(&distance_ref)),
                duration_min: parse_form_number(&input_value(&duration_ref)),
                extra: parse_form_number(&extra),
            });
        })
    };

    let onchange = {
        let on_kind_change = props.on_kind_change.clone();
        let kind_ref = kind_ref.clone();
        Callback::from(move |_: Event| {
            if let Some(kind) = selected_kind(&kind_ref) {
                on_kind_change.emit(kind);
            }
        })
    };

    let form = &props.form;
    let row_class = |kind: WorkoutKind| {
        classes!(
            "form__row",
            (form.extra_field != kind).then_some("form__row--hidden")
        )
    };
    let style = if form.transition_suppressed {
        "display: none"
    } else {
        ""
    };

    html! {
        <form class={classes!("form", (!form.visible).then_some("hidden"))} {style} {onsubmit}>
            <div class="form__row">
                <label class="form__label">{ "Type" }</label>
                <select class="form__input form__input--type" ref={kind_ref} {onchange}>
                    <option value="running">{ "Running" }</option>
                    <option value="cycling">{ "Cycling" }</option>
                </select>
            </div>
            <div class="form__row">
                <label class="form__label">{ "Distance" }</label>
                <input class="form__input form__input--distance" placeholder="km" ref={distance_ref} />
            </div>
            <div class="form__row">
                <label class="form__label">{ "Duration" }</label>
                <input class="form__input form__input--duration" placeholder="min" ref={duration_ref} />
            </div>
            <div class={row_class(WorkoutKind::Running)}>
                <label class="form__label">{ "Cadence" }</label>
                <input class="form__input form__input--cadence" placeholder="step/min" ref={cadence_ref} />
            </div>
            <div class={row_class(WorkoutKind::Cycling)}>
                <label class="form__label">{ "Elev Gain" }</label>
                <input class="form__input form__input--elevation" placeholder="meters" ref={elevation_ref} />
            </div>
            <button class="form__btn">{ "OK" }</button>
        </form>
    }
}

fn render_detail(icon: &str, value: String, unit: &str) -> Html {
    html! {
        <div class="workout__details">
            <span class="workout__icon">{ icon.to_string() }</span>
            <span class="workout__value">{ value }</span>
            <span class="workout__unit">{ unit.to_string() }</span>
        </div>
    }
}

/// One list entry. Clicking it reports the workout id.
pub fn render_workout(workout: &WorkoutRecord, on_select: &Callback<WorkoutId>) -> Html {
    let kind = workout.kind();
    let onclick = {
        let on_select = on_select.clone();
        let id = workout.id().clone();
        Callback::from(move |_: MouseEvent| on_select.emit(id.clone()))
    };

    let metrics = match workout.details() {
        WorkoutDetails::Running {
            cadence_spm,
            pace_min_per_km,
        } => html! {
            <>
                { render_detail("⚡️", format_metric(*pace_min_per_km), "min/km") }
                { render_detail("🦶🏼", cadence_spm.to_string(), "spm") }
            </>
        },
        WorkoutDetails::Cycling {
            elevation_gain_m,
            speed_km_per_h,
        } => html! {
            <>
                { render_detail("⚡️", format_metric(*speed_km_per_h), "km/h") }
                { render_detail("⛰", format_quantity(*elevation_gain_m), "m") }
            </>
        },
    };

    html! {
        <li class={classes!("workout", format!("workout--{}", kind.name()))}
            data-id={workout.id().to_string()}
            {onclick}>
            <h2 class="workout__title">{ workout.description() }</h2>
            { render_detail(kind.icon(), format_quantity(workout.distance_km()), "km") }
            { render_detail("⏱", format_quantity(workout.duration_min()), "min") }
            { metrics }
        </li>
    }
}

/// All entries, newest first.
pub fn render_workouts<'a>(
    workouts: impl Iterator<Item = &'a WorkoutRecord>,
    on_select: &Callback<WorkoutId>,
) -> Html {
    workouts
        .map(|workout| render_workout(workout, on_select))
        .collect::<Html>()
}
