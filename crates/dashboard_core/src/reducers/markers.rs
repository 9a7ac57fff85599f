use std::sync::Arc;

use shared::{
    domain::{metrics_eq, Marker, MarkerId},
    protocol::{Action, ActionKind},
    state::MarkersState,
};

use tracing::warn;

use super::update_slice;

pub fn reduce(state: &Arc<MarkersState>, action: &Action) -> Arc<MarkersState> {
    match &action.kind {
        ActionKind::MarkerAdded {
            timestamp,
            position_id,
            note,
            color,
        } if timestamp.is_finite() && !position_id.is_empty() => {
            let Some(counter) = state.counter.checked_add(1) else {
                warn!(counter = state.counter, "marker id space exhausted");
                return Arc::clone(state);
            };
            update_slice(state, |markers| {
                let id = MarkerId(counter);
                markers.counter = counter;
                markers.by_id.insert(
                    id,
                    Marker {
                        id,
                        timestamp: *timestamp,
                        position_id: position_id.clone(),
                        note: note.clone().unwrap_or_default(),
                        color: color.clone(),
                        metrics: None,
                    },
                );
                markers.all_ids.push(id);
            })
        }
        ActionKind::MarkerUpdated { id, changes } if state.by_id.contains_key(id) => {
            update_slice(state, |markers| {
                let Some(marker) = markers.by_id.get_mut(id) else {
                    return;
                };
                if let Some(timestamp) = changes.timestamp.filter(|value| value.is_finite()) {
                    marker.timestamp = timestamp;
                }
                if let Some(note) = &changes.note {
                    marker.note = note.clone();
                }
                if let Some(color) = &changes.color {
                    marker.color = Some(color.clone());
                }
            })
        }
        ActionKind::MarkerRemoved { id } => remove(state, *id),
        ActionKind::MarkerRemovedNear {
            timestamp,
            tolerance_ms,
        } => match nearest_within(state, *timestamp, *tolerance_ms) {
            Some(id) => remove(state, id),
            None => Arc::clone(state),
        },
        ActionKind::MarkerSelected { id } if state.by_id.contains_key(id) => {
            update_slice(state, |markers| markers.selected_id = Some(*id))
        }
        ActionKind::MarkerSelectionCleared => {
            update_slice(state, |markers| markers.selected_id = None)
        }
        ActionKind::MarkerMetricsSet { id, metrics } if state.by_id.contains_key(id) => {
            let unchanged = state
                .get(*id)
                .and_then(|marker| marker.metrics.as_ref())
                .is_some_and(|current| metrics_eq(current, metrics));
            if unchanged {
                return Arc::clone(state);
            }
            update_slice(state, |markers| {
                if let Some(marker) = markers.by_id.get_mut(id) {
                    marker.metrics = Some(metrics.clone());
                }
            })
        }
        _ => Arc::clone(state),
    }
}

fn remove(state: &Arc<MarkersState>, id: MarkerId) -> Arc<MarkersState> {
    if !state.by_id.contains_key(&id) {
        return Arc::clone(state);
    }
    update_slice(state, |markers| {
        markers.by_id.remove(&id);
        markers.all_ids.retain(|existing| *existing != id);
        if markers.selected_id == Some(id) {
            markers.selected_id = None;
        }
    })
}

/// Closest marker to `timestamp` no further than `tolerance_ms` away; the
/// earlier-added marker wins an exact tie.
pub fn nearest_within(
    markers: &MarkersState,
    timestamp: f64,
    tolerance_ms: f64,
) -> Option<MarkerId> {
    if !timestamp.is_finite() || tolerance_ms.is_nan() || tolerance_ms < 0.0 {
        return None;
    }
    markers
        .iter()
        .map(|marker| (marker.id, (marker.timestamp - timestamp).abs()))
        .filter(|(_, distance)| *distance <= tolerance_ms)
        .fold(None, |best: Option<(MarkerId, f64)>, candidate| match best {
            Some(current) if current.1 <= candidate.1 => Some(current),
            _ => Some(candidate),
        })
        .map(|(id, _)| id)
}

#[cfg(test)]
#[path = "../tests/markers_tests.rs"]
mod tests;
