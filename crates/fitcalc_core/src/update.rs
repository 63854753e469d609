use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::dispatch::dispatch;
use crate::{AppState, Effect, Msg, StreamEvent};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FittingChanged(text) => {
            state.set_fitting(text);
            Vec::new()
        }
        Msg::IncludeHullToggled(include_hull) => {
            state.set_include_hull(include_hull);
            Vec::new()
        }
        Msg::Submitted => {
            if state.form().fitting.trim().is_empty() {
                engine_warn!("Ignoring submission with an empty fitting");
                return (state, Vec::new());
            }
            let superseded = state.begin_submission();
            let generation = state.generation();
            engine_info!(
                "Submission {} started (fitting_len={} include_hull={})",
                generation,
                state.form().fitting.len(),
                state.form().include_hull
            );
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = superseded {
                engine_info!("Submission {} superseded by {}", previous, generation);
                effects.push(Effect::CancelStream {
                    generation: previous,
                });
            }
            effects.push(Effect::StartStream {
                generation,
                form: state.form().clone(),
            });
            effects
        }
        Msg::Stream { generation, event } => {
            if !state.is_live(generation) {
                engine_debug!(
                    "Dropping stale event for submission {} (current {})",
                    generation,
                    state.generation()
                );
                return (state, Vec::new());
            }
            apply_stream_event(&mut state, event);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn apply_stream_event(state: &mut AppState, event: StreamEvent) {
    match event {
        StreamEvent::Opened => {
            engine_info!("Stream opened for submission {}", state.generation());
        }
        StreamEvent::Message(message) => {
            state.count_message();
            if dispatch(state.regions_mut(), message) {
                state.mark_dirty();
            }
        }
        StreamEvent::Malformed { reason } => {
            engine_warn!("Skipping malformed stream line: {}", reason);
            state.regions_mut().progress.malformed();
            state.mark_dirty();
        }
        StreamEvent::TransportFailed { message } => {
            engine_error!("Stream for submission {} failed: {}", state.generation(), message);
            state.fail_submission(message);
        }
        StreamEvent::Ended => {
            engine_info!(
                "Stream for submission {} ended after {} message(s)",
                state.generation(),
                state.messages_received()
            );
            state.end_submission();
        }
    }
}
