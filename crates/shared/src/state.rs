//! The dashboard state tree. Each slice is owned by one reducer and shared
//! between snapshots through `Arc`, so an untouched slice keeps its pointer.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Marker, MarkerId, PositionId, Region, RegionId},
    error::ProtocolError,
    protocol::Action,
};

pub const DEFAULT_PARAMETER: &str = "LZeq";
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub min: f64,
    pub max: f64,
}

impl Viewport {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// False until a real chart range has been reported.
    pub fn is_set(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalViewType {
    Log,
    #[default]
    Overview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Normal,
    Comparison,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonState {
    pub is_active: bool,
    pub included_positions: Vec<PositionId>,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    pub available_positions: Vec<PositionId>,
    pub viewport: Viewport,
    pub selected_parameter: String,
    pub global_view_type: GlobalViewType,
    pub chart_visibility: BTreeMap<String, bool>,
    pub position_chart_offsets: BTreeMap<PositionId, f64>,
    pub position_audio_offsets: BTreeMap<PositionId, f64>,
    pub position_effective_offsets: BTreeMap<PositionId, f64>,
    pub position_display_titles: BTreeMap<PositionId, String>,
    pub active_side_panel_tab: usize,
    pub mode: ViewMode,
    pub comparison: ComparisonState,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            available_positions: Vec::new(),
            viewport: Viewport::default(),
            selected_parameter: DEFAULT_PARAMETER.to_string(),
            global_view_type: GlobalViewType::default(),
            chart_visibility: BTreeMap::new(),
            position_chart_offsets: BTreeMap::new(),
            position_audio_offsets: BTreeMap::new(),
            position_effective_offsets: BTreeMap::new(),
            position_display_titles: BTreeMap::new(),
            active_side_panel_tab: 0,
            mode: ViewMode::default(),
            comparison: ComparisonState::default(),
        }
    }
}

impl ViewState {
    pub fn effective_offset(&self, position_id: &PositionId) -> f64 {
        self.position_effective_offsets
            .get(position_id)
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TapState {
    pub is_active: bool,
    pub timestamp: Option<f64>,
    pub position_id: Option<PositionId>,
    pub source_chart_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoverState {
    pub is_active: bool,
    pub timestamp: Option<f64>,
    pub position: Option<PositionId>,
    pub source_chart_name: Option<String>,
    #[serde(rename = "spec_y")]
    pub spec_y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyboardState {
    pub enabled: bool,
    pub step_size_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragTool {
    #[default]
    Pan,
    BoxSelect,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionState {
    pub tap: TapState,
    pub hover: HoverState,
    pub keyboard: KeyboardState,
    pub active_drag_tool: DragTool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkersState {
    pub by_id: BTreeMap<MarkerId, Marker>,
    pub all_ids: Vec<MarkerId>,
    pub selected_id: Option<MarkerId>,
    pub counter: u64,
}

impl MarkersState {
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.by_id.get(&id)
    }

    /// Markers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.all_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    /// Repairs a snapshot so `all_ids` mirrors `by_id`, the selection points at
    /// a live marker and the counter is ahead of every id.
    pub fn reconciled(mut self) -> Self {
        let (all_ids, counter) = reconcile_ids(&self.by_id, self.all_ids, self.counter, |id| id.0);
        self.all_ids = all_ids;
        self.counter = counter;
        if self.selected_id.is_some_and(|id| !self.by_id.contains_key(&id)) {
            self.selected_id = None;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionsState {
    pub by_id: BTreeMap<RegionId, Region>,
    pub all_ids: Vec<RegionId>,
    pub selected_id: Option<RegionId>,
    pub counter: u64,
    pub add_area_target_id: Option<RegionId>,
    pub is_merge_mode_active: bool,
}

impl RegionsState {
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.by_id.get(&id)
    }

    /// Regions in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Region> {
        self.all_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    pub fn selected(&self) -> Option<&Region> {
        self.selected_id.and_then(|id| self.by_id.get(&id))
    }

    pub fn reconciled(mut self) -> Self {
        self.by_id.retain(|_, region| !region.areas.is_empty());
        let (all_ids, counter) = reconcile_ids(&self.by_id, self.all_ids, self.counter, |id| id.0);
        self.all_ids = all_ids;
        self.counter = counter;
        if self.selected_id.is_some_and(|id| !self.by_id.contains_key(&id)) {
            self.selected_id = None;
            self.is_merge_mode_active = false;
        }
        if self
            .add_area_target_id
            .is_some_and(|id| !self.by_id.contains_key(&id))
        {
            self.add_area_target_id = None;
        }
        self
    }
}

fn reconcile_ids<K: Copy + Ord, V>(
    by_id: &BTreeMap<K, V>,
    all_ids: Vec<K>,
    counter: u64,
    raw: impl Fn(&K) -> u64,
) -> (Vec<K>, u64) {
    let mut seen = std::collections::BTreeSet::new();
    let mut ordered: Vec<K> = all_ids
        .into_iter()
        .filter(|id| by_id.contains_key(id) && seen.insert(*id))
        .collect();
    ordered.extend(by_id.keys().filter(|id| !seen.contains(*id)).copied());
    let counter = by_id.keys().map(&raw).fold(counter, u64::max);
    (ordered, counter)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioState {
    pub is_playing: bool,
    pub active_position_id: Option<PositionId>,
    pub playback_rate: f64,
    pub volume_boost: bool,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            is_playing: false,
            active_position_id: None,
            playback_rate: DEFAULT_PLAYBACK_RATE,
            volume_boost: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemState {
    pub initialized: bool,
    pub last_action: Option<Arc<Action>>,
}

/// One immutable snapshot of the whole dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub view: Arc<ViewState>,
    pub interaction: Arc<InteractionState>,
    pub markers: Arc<MarkersState>,
    pub regions: Arc<RegionsState>,
    pub audio: Arc<AudioState>,
    pub system: Arc<SystemState>,
}

impl State {
    pub fn last_action(&self) -> Option<&Action> {
        self.system.last_action.as_deref()
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string_pretty(self).map_err(ProtocolError::Encode)
    }
}

/// A full or partial state tree used for rehydration. Missing slices fall
/// back to defaults; missing fields inside a slice do too.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<MarkersState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<RegionsState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioState>,
}

impl StateSnapshot {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::MalformedSnapshot)
    }
}

impl From<&State> for StateSnapshot {
    fn from(state: &State) -> Self {
        Self {
            view: Some((*state.view).clone()),
            interaction: Some((*state.interaction).clone()),
            markers: Some((*state.markers).clone()),
            regions: Some((*state.regions).clone()),
            audio: Some((*state.audio).clone()),
        }
    }
}
