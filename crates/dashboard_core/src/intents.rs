//! User intents that need the current state to decide what to dispatch.
//!
//! `Intent::plan` is pure: it reads a snapshot and returns the actions to
//! dispatch, or the reason it declined. `Store::run` is the thin adapter that
//! dispatches the planned list.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Area, PositionId, RegionId},
    protocol::{Action, NavDirection, RegionChanges},
    state::{State, ViewMode},
};
use tracing::debug;

use crate::{
    actions,
    error::IntentDeclined,
    reducers::{audio::is_valid_rate, interaction::step_size, regions::hit_test},
    MARKER_HIT_FALLBACK_MS, MARKER_HIT_FRACTION, MIN_REGION_WIDTH_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "intent",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Intent {
    HandleTap {
        timestamp: f64,
        position_id: PositionId,
        chart_name: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    CreateRegion {
        position_id: PositionId,
        start: f64,
        end: f64,
    },
    AddRegionArea {
        position_id: PositionId,
        start: f64,
        end: f64,
    },
    ResizeSelectedRegion {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    NudgeTapLine {
        key: String,
    },
    AddMarkerAtTap,
    MergeRegions {
        target_id: RegionId,
        source_id: RegionId,
    },
    EnterComparisonMode,
    ExitComparisonMode,
    UpdateIncludedPositions {
        included_positions: Vec<PositionId>,
    },
    UpdateComparisonSlice {
        start: f64,
        end: f64,
    },
    CreateRegionsFromComparison,
    TogglePlayPause {
        position_id: PositionId,
        is_active: bool,
    },
    ChangePlaybackRate {
        playback_rate: f64,
    },
    ToggleVolumeBoost {
        is_boosted: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegionEdge {
    Start,
    End,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HandleTap { .. } => "handle_tap",
            Self::CreateRegion { .. } => "create_region",
            Self::AddRegionArea { .. } => "add_region_area",
            Self::ResizeSelectedRegion { .. } => "resize_selected_region",
            Self::NudgeTapLine { .. } => "nudge_tap_line",
            Self::AddMarkerAtTap => "add_marker_at_tap",
            Self::MergeRegions { .. } => "merge_regions",
            Self::EnterComparisonMode => "enter_comparison_mode",
            Self::ExitComparisonMode => "exit_comparison_mode",
            Self::UpdateIncludedPositions { .. } => "update_included_positions",
            Self::UpdateComparisonSlice { .. } => "update_comparison_slice",
            Self::CreateRegionsFromComparison => "create_regions_from_comparison",
            Self::TogglePlayPause { .. } => "toggle_play_pause",
            Self::ChangePlaybackRate { .. } => "change_playback_rate",
            Self::ToggleVolumeBoost { .. } => "toggle_volume_boost",
        }
    }

    /// Actions implied by this intent against `state`; a decline is not an error
    /// for callers and is only logged.
    pub fn execute(&self, state: &State) -> Vec<Action> {
        match self.plan(state) {
            Ok(actions) => actions,
            Err(reason) => {
                debug!(intent = self.name(), %reason, "intent declined");
                Vec::new()
            }
        }
    }

    pub fn plan(&self, state: &State) -> Result<Vec<Action>, IntentDeclined> {
        match self {
            Self::HandleTap {
                timestamp,
                position_id,
                chart_name,
                modifiers,
            } => plan_tap(state, *timestamp, position_id, chart_name, *modifiers),
            Self::CreateRegion {
                position_id,
                start,
                end,
            } => {
                let area = checked_area(position_id, *start, *end)?;
                Ok(vec![actions::region_add(
                    position_id.clone(),
                    area.start,
                    area.end,
                )])
            }
            Self::AddRegionArea {
                position_id,
                start,
                end,
            } => {
                let target_id = state
                    .regions
                    .add_area_target_id
                    .ok_or(IntentDeclined::NoAddAreaTarget)?;
                let target = state
                    .regions
                    .get(target_id)
                    .ok_or(IntentDeclined::UnknownRegion(target_id))?;
                if target.position_id != *position_id {
                    return Err(IntentDeclined::PositionMismatch {
                        expected: target.position_id.clone(),
                        actual: position_id.clone(),
                    });
                }
                let area = checked_area(position_id, *start, *end)?;
                Ok(vec![actions::region_area_add(target_id, area.start, area.end)])
            }
            Self::ResizeSelectedRegion { key, modifiers } => plan_resize(state, key, *modifiers),
            Self::NudgeTapLine { key } => {
                let direction = arrow_direction(key)?;
                Ok(vec![actions::key_nav(direction)])
            }
            Self::AddMarkerAtTap => {
                let tap = &state.interaction.tap;
                match (tap.is_active, tap.timestamp, &tap.position_id) {
                    (true, Some(timestamp), Some(position_id)) if timestamp.is_finite() => {
                        Ok(vec![actions::marker_add(timestamp, position_id.clone())])
                    }
                    _ => Err(IntentDeclined::NoActiveTap),
                }
            }
            Self::MergeRegions {
                target_id,
                source_id,
            } => {
                let merge = merge_action(state, *target_id, *source_id)?;
                Ok(vec![merge])
            }
            Self::EnterComparisonMode => {
                if state.view.mode == ViewMode::Comparison {
                    return Err(IntentDeclined::AlreadyInComparisonMode);
                }
                Ok(vec![actions::comparison_mode_entered()])
            }
            Self::ExitComparisonMode => {
                require_comparison(state)?;
                Ok(vec![actions::comparison_mode_exited()])
            }
            Self::UpdateIncludedPositions { included_positions } => {
                require_comparison(state)?;
                let available = &state.view.available_positions;
                let included = included_positions
                    .iter()
                    .filter(|position| available.is_empty() || available.contains(position))
                    .cloned()
                    .collect();
                Ok(vec![actions::comparison_positions_updated(included)])
            }
            Self::UpdateComparisonSlice { start, end } => {
                require_comparison(state)?;
                if !start.is_finite() || !end.is_finite() {
                    return Err(IntentDeclined::NonFiniteTimestamp);
                }
                let (low, high) = (start.min(*end), start.max(*end));
                let action = if low == high {
                    actions::comparison_slice_updated(None, None)
                } else {
                    actions::comparison_slice_updated(Some(low), Some(high))
                };
                Ok(vec![action])
            }
            Self::CreateRegionsFromComparison => {
                require_comparison(state)?;
                let comparison = &state.view.comparison;
                let (Some(start), Some(end)) = (comparison.start, comparison.end) else {
                    return Err(IntentDeclined::NoComparisonSlice);
                };
                if comparison.included_positions.is_empty() {
                    return Err(IntentDeclined::NoIncludedPositions);
                }
                comparison
                    .included_positions
                    .iter()
                    .map(|position_id| -> Result<Action, IntentDeclined> {
                        let area = checked_area(position_id, start, end)?;
                        Ok(actions::region_add(position_id.clone(), area.start, area.end))
                    })
                    .collect()
            }
            Self::TogglePlayPause {
                position_id,
                is_active,
            } => {
                if position_id.is_empty() {
                    return Err(IntentDeclined::MissingPosition);
                }
                Ok(vec![actions::audio_play_pause_toggle(
                    position_id.clone(),
                    *is_active,
                )])
            }
            Self::ChangePlaybackRate { playback_rate } => {
                if !is_valid_rate(*playback_rate) {
                    return Err(IntentDeclined::InvalidPlaybackRate(*playback_rate));
                }
                Ok(vec![actions::audio_rate_change_request(*playback_rate)])
            }
            Self::ToggleVolumeBoost { is_boosted } => {
                Ok(vec![actions::audio_boost_toggle_request(*is_boosted)])
            }
        }
    }
}

fn plan_tap(
    state: &State,
    timestamp: f64,
    position_id: &PositionId,
    chart_name: &str,
    modifiers: Modifiers,
) -> Result<Vec<Action>, IntentDeclined> {
    if !timestamp.is_finite() {
        return Err(IntentDeclined::NonFiniteTimestamp);
    }
    if position_id.is_empty() {
        return Err(IntentDeclined::MissingPosition);
    }

    let regions = &state.regions;
    let hit = hit_test(regions, position_id, timestamp).map(|region| region.id);
    let mut planned = Vec::with_capacity(2);

    match hit {
        Some(id) if modifiers.ctrl => return Ok(vec![actions::region_remove(id)]),
        Some(id) => match regions.selected_id {
            Some(selected) if regions.is_merge_mode_active && selected != id => {
                planned.push(
                    merge_action(state, selected, id)
                        .unwrap_or_else(|_| actions::region_select(id)),
                );
            }
            _ => planned.push(actions::region_select(id)),
        },
        None => planned.push(actions::region_clear_selection()),
    }

    if modifiers.ctrl {
        planned.push(actions::marker_remove_near(
            timestamp,
            marker_hit_tolerance(state),
        ));
        return Ok(planned);
    }

    planned.push(actions::tap(timestamp, position_id.clone(), chart_name));
    Ok(planned)
}

fn plan_resize(
    state: &State,
    key: &str,
    modifiers: Modifiers,
) -> Result<Vec<Action>, IntentDeclined> {
    let region = state
        .regions
        .selected()
        .ok_or(IntentDeclined::NoRegionSelected)?;
    let edge = match (modifiers.shift, modifiers.alt) {
        (true, false) => RegionEdge::End,
        (false, true) => RegionEdge::Start,
        _ => return Err(IntentDeclined::ModifierNotApplicable),
    };
    let direction = arrow_direction(key)?;
    let (Some(first), Some(last)) = (region.areas.first(), region.areas.last()) else {
        return Err(IntentDeclined::UnknownRegion(region.id));
    };

    let delta = direction.sign() * step_size(&state.interaction);
    let viewport = state.view.viewport;
    let (lower, upper) = if viewport.is_set() {
        (viewport.min, viewport.max)
    } else {
        (f64::NEG_INFINITY, f64::INFINITY)
    };

    let changes = match edge {
        RegionEdge::Start => {
            let next = (first.start + delta)
                .max(lower)
                .min(first.end - MIN_REGION_WIDTH_MS);
            if next == first.start {
                return Ok(Vec::new());
            }
            RegionChanges {
                start: Some(next),
                ..RegionChanges::default()
            }
        }
        RegionEdge::End => {
            let next = (last.end + delta)
                .min(upper)
                .max(last.start + MIN_REGION_WIDTH_MS);
            if next == last.end {
                return Ok(Vec::new());
            }
            RegionChanges {
                end: Some(next),
                ..RegionChanges::default()
            }
        }
    };
    Ok(vec![actions::region_update(region.id, changes)])
}

fn merge_action(
    state: &State,
    target_id: RegionId,
    source_id: RegionId,
) -> Result<Action, IntentDeclined> {
    if target_id == source_id {
        return Err(IntentDeclined::SameRegion(target_id));
    }
    let target = state
        .regions
        .get(target_id)
        .ok_or(IntentDeclined::UnknownRegion(target_id))?;
    let source = state
        .regions
        .get(source_id)
        .ok_or(IntentDeclined::UnknownRegion(source_id))?;
    if target.position_id != source.position_id {
        return Err(IntentDeclined::PositionMismatch {
            expected: target.position_id.clone(),
            actual: source.position_id.clone(),
        });
    }
    Ok(actions::regions_merge(target_id, source_id))
}

fn checked_area(position_id: &PositionId, start: f64, end: f64) -> Result<Area, IntentDeclined> {
    if position_id.is_empty() {
        return Err(IntentDeclined::MissingPosition);
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(IntentDeclined::NonFiniteTimestamp);
    }
    let area = Area::new(start, end);
    if area.width() < MIN_REGION_WIDTH_MS {
        return Err(IntentDeclined::BelowMinimumWidth {
            width: area.width(),
        });
    }
    Ok(area)
}

fn require_comparison(state: &State) -> Result<(), IntentDeclined> {
    if state.view.mode == ViewMode::Comparison {
        Ok(())
    } else {
        Err(IntentDeclined::NotInComparisonMode)
    }
}

fn arrow_direction(key: &str) -> Result<NavDirection, IntentDeclined> {
    match key {
        "ArrowLeft" => Ok(NavDirection::Left),
        "ArrowRight" => Ok(NavDirection::Right),
        other => Err(IntentDeclined::UnknownKey(other.to_string())),
    }
}

fn marker_hit_tolerance(state: &State) -> f64 {
    let viewport = state.view.viewport;
    if viewport.is_set() {
        viewport.span() * MARKER_HIT_FRACTION
    } else {
        MARKER_HIT_FALLBACK_MS
    }
}

#[cfg(test)]
#[path = "tests/intents_tests.rs"]
mod tests;
