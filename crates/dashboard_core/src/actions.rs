//! Action creators. Selecting actions carry their `SelectionHint` here so the
//! root reducer never needs a separate list of "selecting" action types.

use std::collections::BTreeMap;

use shared::{
    domain::{MarkerId, Metrics, PositionId, RegionId},
    protocol::{Action, ActionKind, MarkerChanges, NavDirection, RegionChanges, SelectionHint},
    state::{DragTool, GlobalViewType, StateSnapshot, Viewport},
};

pub fn initialize_state(
    available_positions: Vec<PositionId>,
    selected_parameter: Option<String>,
    viewport: Option<Viewport>,
    chart_visibility: BTreeMap<String, bool>,
) -> Action {
    Action::new(ActionKind::InitializeState {
        available_positions,
        selected_parameter,
        viewport,
        chart_visibility,
    })
}

pub fn rehydrate(snapshot: StateSnapshot) -> Action {
    Action::new(ActionKind::StateRehydrated(Box::new(snapshot)))
}

pub fn viewport_changed(min: f64, max: f64) -> Action {
    Action::new(ActionKind::ViewportChanged { min, max })
}

pub fn parameter_changed(parameter: impl Into<String>) -> Action {
    Action::new(ActionKind::ParameterChanged {
        parameter: parameter.into(),
    })
}

pub fn view_toggled(view_type: GlobalViewType) -> Action {
    Action::new(ActionKind::ViewToggled { view_type })
}

pub fn visibility_changed(chart_name: impl Into<String>, is_visible: bool) -> Action {
    Action::new(ActionKind::VisibilityChanged {
        chart_name: chart_name.into(),
        is_visible,
    })
}

pub fn position_chart_offset_set(position_id: PositionId, offset_ms: f64) -> Action {
    Action::new(ActionKind::PositionChartOffsetSet {
        position_id,
        offset_ms,
    })
}

pub fn position_audio_offset_set(position_id: PositionId, offset_ms: f64) -> Action {
    Action::new(ActionKind::PositionAudioOffsetSet {
        position_id,
        offset_ms,
    })
}

pub fn position_display_title_set(position_id: PositionId, title: impl Into<String>) -> Action {
    Action::new(ActionKind::PositionDisplayTitleSet {
        position_id,
        title: title.into(),
    })
}

pub fn side_panel_tab_changed(tab: usize) -> Action {
    Action::new(ActionKind::SidePanelTabChanged { tab })
}

pub fn comparison_mode_entered() -> Action {
    Action::new(ActionKind::ComparisonModeEntered)
}

pub fn comparison_mode_exited() -> Action {
    Action::new(ActionKind::ComparisonModeExited)
}

pub fn comparison_positions_updated(included_positions: Vec<PositionId>) -> Action {
    Action::new(ActionKind::ComparisonPositionsUpdated { included_positions })
}

pub fn comparison_slice_updated(start: Option<f64>, end: Option<f64>) -> Action {
    Action::new(ActionKind::ComparisonSliceUpdated { start, end })
}

pub fn tap(timestamp: f64, position_id: PositionId, chart_name: impl Into<String>) -> Action {
    Action::new(ActionKind::Tap {
        timestamp,
        position_id,
        chart_name: chart_name.into(),
    })
}

pub fn tap_cleared() -> Action {
    Action::new(ActionKind::TapCleared)
}

pub fn hover(
    timestamp: f64,
    position_id: PositionId,
    source_chart_name: impl Into<String>,
    spec_y: Option<f64>,
) -> Action {
    Action::new(ActionKind::HoverChanged {
        is_active: true,
        timestamp: Some(timestamp),
        position_id: Some(position_id),
        source_chart_name: Some(source_chart_name.into()),
        spec_y,
    })
}

pub fn hover_cleared() -> Action {
    Action::new(ActionKind::HoverChanged {
        is_active: false,
        timestamp: None,
        position_id: None,
        source_chart_name: None,
        spec_y: None,
    })
}

pub fn key_nav(direction: NavDirection) -> Action {
    Action::new(ActionKind::KeyNav { direction })
}

pub fn step_size_calculated(step_size_ms: f64) -> Action {
    Action::new(ActionKind::StepSizeCalculated { step_size_ms })
}

pub fn keyboard_enabled_set(enabled: bool) -> Action {
    Action::new(ActionKind::KeyboardEnabledSet { enabled })
}

pub fn drag_tool_changed(tool: DragTool) -> Action {
    Action::new(ActionKind::DragToolChanged { tool })
}

pub fn marker_add(timestamp: f64, position_id: PositionId) -> Action {
    Action::new(ActionKind::MarkerAdded {
        timestamp,
        position_id,
        note: None,
        color: None,
    })
}

pub fn marker_update(id: MarkerId, changes: MarkerChanges) -> Action {
    Action::new(ActionKind::MarkerUpdated { id, changes })
}

pub fn marker_remove(id: MarkerId) -> Action {
    Action::new(ActionKind::MarkerRemoved { id })
}

pub fn marker_remove_near(timestamp: f64, tolerance_ms: f64) -> Action {
    Action::new(ActionKind::MarkerRemovedNear {
        timestamp,
        tolerance_ms,
    })
}

pub fn marker_select(id: MarkerId) -> Action {
    Action::with_hint(ActionKind::MarkerSelected { id }, SelectionHint::Marker)
}

pub fn marker_clear_selection() -> Action {
    Action::new(ActionKind::MarkerSelectionCleared)
}

pub fn marker_set_metrics(id: MarkerId, metrics: Metrics) -> Action {
    Action::new(ActionKind::MarkerMetricsSet { id, metrics })
}

/// New regions become the selection, so the add carries the region hint.
pub fn region_add(position_id: PositionId, start: f64, end: f64) -> Action {
    Action::with_hint(
        ActionKind::RegionAdded {
            position_id,
            start,
            end,
            note: None,
            color: None,
        },
        SelectionHint::Region,
    )
}

pub fn region_update(id: RegionId, changes: RegionChanges) -> Action {
    Action::new(ActionKind::RegionUpdated { id, changes })
}

pub fn region_remove(id: RegionId) -> Action {
    Action::new(ActionKind::RegionRemoved { id })
}

pub fn region_select(id: RegionId) -> Action {
    Action::with_hint(ActionKind::RegionSelected { id }, SelectionHint::Region)
}

pub fn region_clear_selection() -> Action {
    Action::new(ActionKind::RegionSelectionCleared)
}

pub fn region_set_metrics(id: RegionId, metrics: Metrics) -> Action {
    Action::new(ActionKind::RegionMetricsSet { id, metrics })
}

pub fn region_area_add(id: RegionId, start: f64, end: f64) -> Action {
    Action::new(ActionKind::RegionAreaAdded { id, start, end })
}

pub fn region_area_remove(id: RegionId, index: usize) -> Action {
    Action::new(ActionKind::RegionAreaRemoved { id, index })
}

pub fn region_add_area_mode_set(target_id: Option<RegionId>) -> Action {
    Action::new(ActionKind::RegionAddAreaModeSet { target_id })
}

pub fn region_merge_mode_set(active: bool) -> Action {
    Action::new(ActionKind::RegionMergeModeSet { active })
}

/// The merged target ends up selected.
pub fn regions_merge(target_id: RegionId, source_id: RegionId) -> Action {
    Action::with_hint(
        ActionKind::RegionsMerged {
            target_id,
            source_id,
        },
        SelectionHint::Region,
    )
}

pub fn audio_play_pause_toggle(position_id: PositionId, is_active: bool) -> Action {
    Action::new(ActionKind::AudioPlayPauseToggle {
        position_id,
        is_active,
    })
}

pub fn audio_status_update(
    is_playing: bool,
    active_position_id: Option<PositionId>,
    playback_rate: f64,
    volume_boost: bool,
) -> Action {
    Action::new(ActionKind::AudioStatusUpdate {
        is_playing,
        active_position_id,
        playback_rate,
        volume_boost,
    })
}

pub fn audio_rate_change_request(playback_rate: f64) -> Action {
    Action::new(ActionKind::AudioRateChangeRequest { playback_rate })
}

pub fn audio_boost_toggle_request(is_boosted: bool) -> Action {
    Action::new(ActionKind::AudioBoostToggleRequest { is_boosted })
}
