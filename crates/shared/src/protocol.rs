//! Action and audio-command wire shapes. The `type` strings and payload field
//! names are the contract event handlers target and must stay stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{MarkerId, Metrics, PositionId, RegionId},
    error::ProtocolError,
    state::{DragTool, GlobalViewType, StateSnapshot, Viewport},
};

/// Which annotation kind an action means to select. Used by the root reducer
/// to decide which selection survives when both sides change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionHint {
    Marker,
    Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavDirection {
    Left,
    Right,
}

impl NavDirection {
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ActionKind {
    InitializeState {
        available_positions: Vec<PositionId>,
        #[serde(default)]
        selected_parameter: Option<String>,
        #[serde(default)]
        viewport: Option<Viewport>,
        #[serde(default)]
        chart_visibility: BTreeMap<String, bool>,
    },
    StateRehydrated(Box<StateSnapshot>),

    ViewportChanged {
        min: f64,
        max: f64,
    },
    ParameterChanged {
        parameter: String,
    },
    ViewToggled {
        view_type: GlobalViewType,
    },
    VisibilityChanged {
        chart_name: String,
        is_visible: bool,
    },
    PositionChartOffsetSet {
        position_id: PositionId,
        offset_ms: f64,
    },
    PositionAudioOffsetSet {
        position_id: PositionId,
        offset_ms: f64,
    },
    PositionDisplayTitleSet {
        position_id: PositionId,
        title: String,
    },
    SidePanelTabChanged {
        tab: usize,
    },
    ComparisonModeEntered,
    ComparisonModeExited,
    ComparisonPositionsUpdated {
        included_positions: Vec<PositionId>,
    },
    ComparisonSliceUpdated {
        start: Option<f64>,
        end: Option<f64>,
    },

    Tap {
        timestamp: f64,
        position_id: PositionId,
        chart_name: String,
    },
    TapCleared,
    HoverChanged {
        is_active: bool,
        #[serde(default)]
        timestamp: Option<f64>,
        #[serde(default)]
        position_id: Option<PositionId>,
        #[serde(default)]
        source_chart_name: Option<String>,
        #[serde(default)]
        spec_y: Option<f64>,
    },
    KeyNav {
        direction: NavDirection,
    },
    StepSizeCalculated {
        step_size_ms: f64,
    },
    KeyboardEnabledSet {
        enabled: bool,
    },
    DragToolChanged {
        tool: DragTool,
    },

    MarkerAdded {
        timestamp: f64,
        position_id: PositionId,
        #[serde(default)]
        note: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
    MarkerUpdated {
        id: MarkerId,
        changes: MarkerChanges,
    },
    MarkerRemoved {
        id: MarkerId,
    },
    MarkerRemovedNear {
        timestamp: f64,
        tolerance_ms: f64,
    },
    MarkerSelected {
        id: MarkerId,
    },
    MarkerSelectionCleared,
    MarkerMetricsSet {
        id: MarkerId,
        metrics: Metrics,
    },

    RegionAdded {
        position_id: PositionId,
        start: f64,
        end: f64,
        #[serde(default)]
        note: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
    RegionUpdated {
        id: RegionId,
        changes: RegionChanges,
    },
    RegionRemoved {
        id: RegionId,
    },
    RegionSelected {
        id: RegionId,
    },
    RegionSelectionCleared,
    RegionMetricsSet {
        id: RegionId,
        metrics: Metrics,
    },
    RegionAreaAdded {
        id: RegionId,
        start: f64,
        end: f64,
    },
    RegionAreaRemoved {
        id: RegionId,
        index: usize,
    },
    RegionAddAreaModeSet {
        target_id: Option<RegionId>,
    },
    RegionMergeModeSet {
        active: bool,
    },
    RegionsMerged {
        target_id: RegionId,
        source_id: RegionId,
    },

    AudioPlayPauseToggle {
        position_id: PositionId,
        is_active: bool,
    },
    AudioStatusUpdate {
        is_playing: bool,
        #[serde(default)]
        active_position_id: Option<PositionId>,
        playback_rate: f64,
        volume_boost: bool,
    },
    AudioRateChangeRequest {
        playback_rate: f64,
    },
    AudioBoostToggleRequest {
        is_boosted: bool,
    },
}

impl ActionKind {
    /// The wire `type` string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::InitializeState { .. } => "INITIALIZE_STATE",
            Self::StateRehydrated(_) => "STATE_REHYDRATED",
            Self::ViewportChanged { .. } => "VIEWPORT_CHANGED",
            Self::ParameterChanged { .. } => "PARAMETER_CHANGED",
            Self::ViewToggled { .. } => "VIEW_TOGGLED",
            Self::VisibilityChanged { .. } => "VISIBILITY_CHANGED",
            Self::PositionChartOffsetSet { .. } => "POSITION_CHART_OFFSET_SET",
            Self::PositionAudioOffsetSet { .. } => "POSITION_AUDIO_OFFSET_SET",
            Self::PositionDisplayTitleSet { .. } => "POSITION_DISPLAY_TITLE_SET",
            Self::SidePanelTabChanged { .. } => "SIDE_PANEL_TAB_CHANGED",
            Self::ComparisonModeEntered => "COMPARISON_MODE_ENTERED",
            Self::ComparisonModeExited => "COMPARISON_MODE_EXITED",
            Self::ComparisonPositionsUpdated { .. } => "COMPARISON_POSITIONS_UPDATED",
            Self::ComparisonSliceUpdated { .. } => "COMPARISON_SLICE_UPDATED",
            Self::Tap { .. } => "TAP",
            Self::TapCleared => "TAP_CLEARED",
            Self::HoverChanged { .. } => "HOVER_CHANGED",
            Self::KeyNav { .. } => "KEY_NAV",
            Self::StepSizeCalculated { .. } => "STEP_SIZE_CALCULATED",
            Self::KeyboardEnabledSet { .. } => "KEYBOARD_ENABLED_SET",
            Self::DragToolChanged { .. } => "DRAG_TOOL_CHANGED",
            Self::MarkerAdded { .. } => "MARKER_ADDED",
            Self::MarkerUpdated { .. } => "MARKER_UPDATED",
            Self::MarkerRemoved { .. } => "MARKER_REMOVED",
            Self::MarkerRemovedNear { .. } => "MARKER_REMOVED_NEAR",
            Self::MarkerSelected { .. } => "MARKER_SELECTED",
            Self::MarkerSelectionCleared => "MARKER_SELECTION_CLEARED",
            Self::MarkerMetricsSet { .. } => "MARKER_METRICS_SET",
            Self::RegionAdded { .. } => "REGION_ADDED",
            Self::RegionUpdated { .. } => "REGION_UPDATED",
            Self::RegionRemoved { .. } => "REGION_REMOVED",
            Self::RegionSelected { .. } => "REGION_SELECTED",
            Self::RegionSelectionCleared => "REGION_SELECTION_CLEARED",
            Self::RegionMetricsSet { .. } => "REGION_METRICS_SET",
            Self::RegionAreaAdded { .. } => "REGION_AREA_ADDED",
            Self::RegionAreaRemoved { .. } => "REGION_AREA_REMOVED",
            Self::RegionAddAreaModeSet { .. } => "REGION_ADD_AREA_MODE_SET",
            Self::RegionMergeModeSet { .. } => "REGION_MERGE_MODE_SET",
            Self::RegionsMerged { .. } => "REGIONS_MERGED",
            Self::AudioPlayPauseToggle { .. } => "AUDIO_PLAY_PAUSE_TOGGLE",
            Self::AudioStatusUpdate { .. } => "AUDIO_STATUS_UPDATE",
            Self::AudioRateChangeRequest { .. } => "AUDIO_RATE_CHANGE_REQUEST",
            Self::AudioBoostToggleRequest { .. } => "AUDIO_BOOST_TOGGLE_REQUEST",
        }
    }
}

/// A plain, serializable request for a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_hint: Option<SelectionHint>,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            selection_hint: None,
        }
    }

    pub fn with_hint(kind: ActionKind, hint: SelectionHint) -> Self {
        Self {
            kind,
            selection_hint: Some(hint),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::MalformedAction)
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Self::new(kind)
    }
}

/// A command for the external audio engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    Play {
        position_id: PositionId,
        timestamp: f64,
    },
    Pause {
        position_id: PositionId,
    },
    SetRate {
        position_id: Option<PositionId>,
        rate: f64,
    },
    SetVolumeBoost {
        position_id: Option<PositionId>,
        boost: bool,
    },
}

impl AudioCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::Pause { .. } => "pause",
            Self::SetRate { .. } => "set_rate",
            Self::SetVolumeBoost { .. } => "set_volume_boost",
        }
    }

    pub fn to_record(&self) -> AudioCommandRecord {
        let (position_id, value) = match self {
            Self::Play {
                position_id,
                timestamp,
            } => (Some(position_id.clone()), Value::from(*timestamp)),
            Self::Pause { position_id } => (Some(position_id.clone()), Value::Null),
            Self::SetRate { position_id, rate } => (position_id.clone(), Value::from(*rate)),
            Self::SetVolumeBoost { position_id, boost } => {
                (position_id.clone(), Value::Bool(*boost))
            }
        };

        AudioCommandRecord {
            command: vec![self.name().to_string()],
            position_id: vec![position_id],
            value: vec![value],
        }
    }
}

/// Columnar record assigned to the audio engine's command model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioCommandRecord {
    pub command: Vec<String>,
    pub position_id: Vec<Option<PositionId>>,
    pub value: Vec<Value>,
}
