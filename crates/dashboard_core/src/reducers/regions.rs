use std::sync::Arc;

use shared::{
    domain::{metrics_eq, normalize_areas, Area, PositionId, Region, RegionId},
    protocol::{Action, ActionKind, RegionChanges},
    state::RegionsState,
};

use tracing::warn;

use super::update_slice;

pub fn reduce(state: &Arc<RegionsState>, action: &Action) -> Arc<RegionsState> {
    match &action.kind {
        ActionKind::RegionAdded {
            position_id,
            start,
            end,
            note,
            color,
        } => {
            let area = Area::new(*start, *end);
            if !area.is_valid() || position_id.is_empty() {
                return Arc::clone(state);
            }
            // Ids are never reused, so an exhausted counter refuses new regions.
            let Some(counter) = state.counter.checked_add(1) else {
                warn!(counter = state.counter, "region id space exhausted");
                return Arc::clone(state);
            };
            update_slice(state, |regions| {
                regions.counter = counter;
                let id = RegionId(counter);
                regions.by_id.insert(
                    id,
                    Region {
                        id,
                        position_id: position_id.clone(),
                        areas: vec![area],
                        note: note.clone().unwrap_or_default(),
                        color: color.clone(),
                        metrics: None,
                    },
                );
                regions.all_ids.push(id);
                regions.selected_id = Some(id);
            })
        }
        ActionKind::RegionUpdated { id, changes } if state.by_id.contains_key(id) => {
            update_slice(state, |regions| {
                if let Some(region) = regions.by_id.get_mut(id) {
                    apply_changes(region, changes);
                }
            })
        }
        ActionKind::RegionRemoved { id } => remove(state, *id),
        ActionKind::RegionSelected { id } if state.by_id.contains_key(id) => {
            update_slice(state, |regions| regions.selected_id = Some(*id))
        }
        ActionKind::RegionSelectionCleared => update_slice(state, |regions| {
            regions.selected_id = None;
            regions.is_merge_mode_active = false;
        }),
        ActionKind::RegionMetricsSet { id, metrics } if state.by_id.contains_key(id) => {
            let unchanged = state
                .get(*id)
                .and_then(|region| region.metrics.as_ref())
                .is_some_and(|current| metrics_eq(current, metrics));
            if unchanged {
                return Arc::clone(state);
            }
            update_slice(state, |regions| {
                if let Some(region) = regions.by_id.get_mut(id) {
                    region.metrics = Some(metrics.clone());
                }
            })
        }
        ActionKind::RegionAreaAdded { id, start, end } => {
            let area = Area::new(*start, *end);
            if !area.is_valid() || !state.by_id.contains_key(id) {
                return Arc::clone(state);
            }
            update_slice(state, |regions| {
                if let Some(region) = regions.by_id.get_mut(id) {
                    let mut areas = std::mem::take(&mut region.areas);
                    areas.push(area);
                    region.areas = normalize_areas(areas);
                }
            })
        }
        ActionKind::RegionAreaRemoved { id, index } => {
            let Some(region) = state.by_id.get(id) else {
                return Arc::clone(state);
            };
            if *index >= region.areas.len() {
                return Arc::clone(state);
            }
            if region.areas.len() == 1 {
                return remove(state, *id);
            }
            update_slice(state, |regions| {
                if let Some(region) = regions.by_id.get_mut(id) {
                    region.areas.remove(*index);
                }
            })
        }
        ActionKind::RegionAddAreaModeSet { target_id } => match target_id {
            Some(id) if !state.by_id.contains_key(id) => Arc::clone(state),
            _ => update_slice(state, |regions| regions.add_area_target_id = *target_id),
        },
        ActionKind::RegionMergeModeSet { active } => update_slice(state, |regions| {
            regions.is_merge_mode_active = *active && regions.selected_id.is_some();
        }),
        ActionKind::RegionsMerged {
            target_id,
            source_id,
        } => merge(state, *target_id, *source_id),
        _ => Arc::clone(state),
    }
}

/// Start/end edits move the earliest start and the latest end; an edit that
/// would invert its area is ignored.
fn apply_changes(region: &mut Region, changes: &RegionChanges) {
    let mut areas = region.areas.clone();
    if let (Some(start), Some(first)) = (changes.start, areas.first_mut()) {
        if start.is_finite() && start < first.end {
            first.start = start;
        }
    }
    if let (Some(end), Some(last)) = (changes.end, areas.last_mut()) {
        if end.is_finite() && end > last.start {
            last.end = end;
        }
    }
    let areas = normalize_areas(areas);
    if !areas.is_empty() {
        region.areas = areas;
    }
    if let Some(note) = &changes.note {
        region.note = note.clone();
    }
    if let Some(color) = &changes.color {
        region.color = Some(color.clone());
    }
}

fn remove(state: &Arc<RegionsState>, id: RegionId) -> Arc<RegionsState> {
    if !state.by_id.contains_key(&id) {
        return Arc::clone(state);
    }
    update_slice(state, |regions| {
        regions.by_id.remove(&id);
        regions.all_ids.retain(|existing| *existing != id);
        if regions.selected_id == Some(id) {
            regions.selected_id = None;
            regions.is_merge_mode_active = false;
        }
        if regions.add_area_target_id == Some(id) {
            regions.add_area_target_id = None;
        }
    })
}

fn merge(
    state: &Arc<RegionsState>,
    target_id: RegionId,
    source_id: RegionId,
) -> Arc<RegionsState> {
    let (Some(target), Some(source)) = (state.by_id.get(&target_id), state.by_id.get(&source_id))
    else {
        return Arc::clone(state);
    };
    if target_id == source_id || target.position_id != source.position_id {
        return Arc::clone(state);
    }
    let merged_areas = normalize_areas(target.areas.iter().chain(source.areas.iter()).copied());

    update_slice(state, |regions| {
        if let Some(target) = regions.by_id.get_mut(&target_id) {
            target.areas = merged_areas;
        }
        regions.by_id.remove(&source_id);
        regions.all_ids.retain(|existing| *existing != source_id);
        regions.selected_id = Some(target_id);
        regions.is_merge_mode_active = false;
        if regions.add_area_target_id == Some(source_id) {
            regions.add_area_target_id = None;
        }
    })
}

/// Most recently added region of `position_id` containing `timestamp`.
pub fn hit_test<'a>(
    regions: &'a RegionsState,
    position_id: &PositionId,
    timestamp: f64,
) -> Option<&'a Region> {
    regions
        .iter()
        .rev()
        .find(|region| region.position_id == *position_id && region.contains(timestamp))
}

#[cfg(test)]
#[path = "../tests/regions_tests.rs"]
mod tests;
