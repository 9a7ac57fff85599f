use std::sync::Arc;

use shared::{
    protocol::{Action, ActionKind, SelectionHint},
    state::{State, StateSnapshot, SystemState},
};
use tracing::debug;

use super::{audio, interaction, markers, regions, system, view};

/// Composes the slice reducers, enforces marker/region selection exclusivity
/// and stamps `system.last_action`. A missing `state` starts from defaults.
pub fn root_reducer(state: Option<&State>, action: &Action) -> State {
    let defaults;
    let previous = match state {
        Some(state) => state,
        None => {
            defaults = State::default();
            &defaults
        }
    };

    if let ActionKind::StateRehydrated(snapshot) = &action.kind {
        return rehydrate(snapshot, action);
    }

    let next = State {
        view: view::reduce(&previous.view, action),
        interaction: interaction::reduce(&previous.interaction, action),
        markers: markers::reduce(&previous.markers, action),
        regions: regions::reduce(&previous.regions, action),
        audio: audio::reduce(&previous.audio, action),
        system: system::reduce(&previous.system, action),
    };
    let next = resolve_selection(previous, next, action.selection_hint);
    stamp_last_action(next, action)
}

fn rehydrate(snapshot: &StateSnapshot, action: &Action) -> State {
    let mut view = snapshot.view.clone().unwrap_or_default();
    view::refresh_effective_offsets(&mut view);

    let next = State {
        view: Arc::new(view),
        interaction: Arc::new(snapshot.interaction.clone().unwrap_or_default()),
        markers: Arc::new(snapshot.markers.clone().unwrap_or_default().reconciled()),
        regions: Arc::new(snapshot.regions.clone().unwrap_or_default().reconciled()),
        audio: Arc::new(snapshot.audio.clone().unwrap_or_default()),
        system: Arc::new(SystemState {
            initialized: true,
            last_action: None,
        }),
    };
    debug!(
        markers = next.markers.len(),
        regions = next.regions.len(),
        "state rehydrated"
    );
    let next = resolve_selection(&State::default(), next, action.selection_hint);
    stamp_last_action(next, action)
}

/// Leaves at most one of marker/region selected. The side named by `hint`
/// wins; without a hint the side whose selection changed in this transition
/// wins, and region wins otherwise.
pub fn resolve_selection(
    previous: &State,
    mut next: State,
    hint: Option<SelectionHint>,
) -> State {
    let marker_selected = next.markers.selected_id;
    let region_selected = next.regions.selected_id;
    if marker_selected.is_none() || region_selected.is_none() {
        return next;
    }

    let marker_changed = marker_selected != previous.markers.selected_id;
    let region_changed = region_selected != previous.regions.selected_id;
    let preferred = hint.unwrap_or(if marker_changed && !region_changed {
        SelectionHint::Marker
    } else {
        SelectionHint::Region
    });

    match preferred {
        SelectionHint::Marker => {
            let regions = Arc::make_mut(&mut next.regions);
            regions.selected_id = None;
            regions.is_merge_mode_active = false;
        }
        SelectionHint::Region => {
            Arc::make_mut(&mut next.markers).selected_id = None;
        }
    }
    next
}

fn stamp_last_action(mut next: State, action: &Action) -> State {
    next.system = Arc::new(SystemState {
        initialized: next.system.initialized,
        last_action: Some(Arc::new(action.clone())),
    });
    next
}

#[cfg(test)]
#[path = "../tests/root_tests.rs"]
mod tests;
