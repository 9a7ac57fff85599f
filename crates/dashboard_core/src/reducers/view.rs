use std::sync::Arc;

use shared::{
    domain::PositionId,
    protocol::{Action, ActionKind},
    state::{ComparisonState, ViewMode, ViewState, Viewport},
};

use super::update_slice;

pub fn reduce(state: &Arc<ViewState>, action: &Action) -> Arc<ViewState> {
    match &action.kind {
        ActionKind::InitializeState {
            available_positions,
            selected_parameter,
            viewport,
            chart_visibility,
        } => update_slice(state, |view| {
            view.available_positions = dedup_positions(available_positions);
            if let Some(parameter) = selected_parameter {
                view.selected_parameter = parameter.clone();
            }
            if let Some(viewport) = viewport.filter(Viewport::is_set) {
                view.viewport = viewport;
            }
            view.chart_visibility
                .extend(chart_visibility.iter().map(|(name, visible)| (name.clone(), *visible)));
        }),
        ActionKind::ViewportChanged { min, max } => {
            if !min.is_finite() || !max.is_finite() {
                return Arc::clone(state);
            }
            update_slice(state, |view| view.viewport = Viewport::new(*min, *max))
        }
        ActionKind::ParameterChanged { parameter } => {
            update_slice(state, |view| view.selected_parameter = parameter.clone())
        }
        ActionKind::ViewToggled { view_type } => {
            update_slice(state, |view| view.global_view_type = *view_type)
        }
        ActionKind::VisibilityChanged {
            chart_name,
            is_visible,
        } => update_slice(state, |view| {
            view.chart_visibility.insert(chart_name.clone(), *is_visible);
        }),
        ActionKind::PositionChartOffsetSet {
            position_id,
            offset_ms,
        } if offset_ms.is_finite() => update_slice(state, |view| {
            view.position_chart_offsets
                .insert(position_id.clone(), *offset_ms);
            refresh_effective_offset(view, position_id);
        }),
        ActionKind::PositionAudioOffsetSet {
            position_id,
            offset_ms,
        } if offset_ms.is_finite() => update_slice(state, |view| {
            view.position_audio_offsets
                .insert(position_id.clone(), *offset_ms);
            refresh_effective_offset(view, position_id);
        }),
        ActionKind::PositionDisplayTitleSet { position_id, title } => {
            update_slice(state, |view| {
                if title.trim().is_empty() {
                    view.position_display_titles.remove(position_id);
                } else {
                    view.position_display_titles
                        .insert(position_id.clone(), title.clone());
                }
            })
        }
        ActionKind::SidePanelTabChanged { tab } => {
            update_slice(state, |view| view.active_side_panel_tab = *tab)
        }
        ActionKind::ComparisonModeEntered => update_slice(state, |view| {
            view.mode = ViewMode::Comparison;
            view.comparison = ComparisonState {
                is_active: true,
                included_positions: view.available_positions.clone(),
                start: None,
                end: None,
            };
        }),
        ActionKind::ComparisonModeExited => update_slice(state, |view| {
            view.mode = ViewMode::Normal;
            view.comparison = ComparisonState::default();
        }),
        ActionKind::ComparisonPositionsUpdated { included_positions }
            if state.mode == ViewMode::Comparison =>
        {
            update_slice(state, |view| {
                view.comparison.included_positions = dedup_positions(included_positions);
            })
        }
        ActionKind::ComparisonSliceUpdated { start, end } if state.mode == ViewMode::Comparison => {
            update_slice(state, |view| {
                view.comparison.start = *start;
                view.comparison.end = *end;
            })
        }
        _ => Arc::clone(state),
    }
}

/// Recomputes effective offsets for every position that has a chart or audio
/// offset, leaving standalone effective entries untouched.
pub fn refresh_effective_offsets(view: &mut ViewState) {
    let positions: Vec<PositionId> = view
        .position_chart_offsets
        .keys()
        .chain(view.position_audio_offsets.keys())
        .cloned()
        .collect();
    for position_id in positions {
        refresh_effective_offset(view, &position_id);
    }
}

fn refresh_effective_offset(view: &mut ViewState, position_id: &PositionId) {
    let chart = view
        .position_chart_offsets
        .get(position_id)
        .copied()
        .unwrap_or(0.0);
    let audio = view
        .position_audio_offsets
        .get(position_id)
        .copied()
        .unwrap_or(0.0);
    view.position_effective_offsets
        .insert(position_id.clone(), chart + audio);
}

fn dedup_positions(positions: &[PositionId]) -> Vec<PositionId> {
    let mut unique: Vec<PositionId> = Vec::with_capacity(positions.len());
    for position in positions {
        if !position.is_empty() && !unique.contains(position) {
            unique.push(position.clone());
        }
    }
    unique
}

#[cfg(test)]
#[path = "../tests/view_tests.rs"]
mod tests;
