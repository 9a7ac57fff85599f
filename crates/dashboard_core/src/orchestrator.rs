//! Post-dispatch update cycle. Each committed state is diffed against the
//! last one the orchestrator saw; the diff decides between a heavy update
//! (reprocess data, redraw primary charts) and a light one (overlays only).

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{metrics_eq, Metrics, RegionId},
    protocol::Action,
    state::{State, ViewState},
};
use tracing::{debug, error, info};

use crate::{
    actions,
    audio_sync::{synchronize_audio, AudioSink},
    store::StoreListener,
};

/// Opaque extra details produced by the data layer for the chart host.
pub type DataDetails = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetricsUpdate {
    pub id: RegionId,
    pub metrics: Metrics,
}

/// The plotting host. Every call reflects `state` on screen and returns no
/// data to the core.
pub trait ChartHost {
    fn render_primary_charts(&mut self, state: &State, details: &DataDetails) -> Result<()>;
    fn render_frequency_bar(&mut self, state: &State) -> Result<()>;
    /// Tap and hover lines with their labels.
    fn render_overlays(&mut self, state: &State) -> Result<()>;
    fn render_control_widgets(&mut self, state: &State, details: Option<&DataDetails>)
        -> Result<()>;
    fn render_side_panel(&mut self, state: &State) -> Result<()>;
    fn render_markers(&mut self, state: &State) -> Result<()>;
    fn render_regions(&mut self, state: &State) -> Result<()>;
    fn render_active_tool(&mut self, state: &State) -> Result<()>;
}

/// Data cache owner. Reprocesses chart sources for the current view.
pub trait DataProcessor {
    fn update_active_data(&mut self, view: &ViewState) -> Result<DataDetails>;
    /// Keyboard step derived from the active data, if it can be determined.
    fn calculate_step_size(&mut self, state: &State) -> Result<Option<f64>>;
    fn update_active_freq_bar_data(&mut self, state: &State) -> Result<()>;
    fn prepare_region_metrics(&mut self, state: &State) -> Result<Vec<RegionMetricsUpdate>>;
}

/// Which watched parts of the state differ between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub initial_load: bool,
    pub viewport: bool,
    pub parameter: bool,
    pub view_toggle: bool,
    pub visibility: bool,
    pub chart_offsets: bool,
    pub display_titles: bool,
    pub markers: bool,
    pub regions: bool,
    pub drag_tool: bool,
    pub side_panel_tab: bool,
}

impl ChangeSet {
    /// `None` for `previous` means nothing has been rendered yet.
    pub fn between(previous: Option<&State>, current: &State) -> Self {
        let Some(previous) = previous else {
            return Self {
                initial_load: true,
                ..Self::default()
            };
        };

        let view_touched = !Arc::ptr_eq(&previous.view, &current.view);
        let (before, after) = (&previous.view, &current.view);
        let view_field = |changed: bool| view_touched && changed;

        Self {
            initial_load: false,
            viewport: view_field(before.viewport != after.viewport),
            parameter: view_field(before.selected_parameter != after.selected_parameter),
            view_toggle: view_field(before.global_view_type != after.global_view_type),
            visibility: view_field(before.chart_visibility != after.chart_visibility),
            chart_offsets: view_field(before.position_chart_offsets != after.position_chart_offsets),
            display_titles: view_field(
                before.position_display_titles != after.position_display_titles,
            ),
            markers: !Arc::ptr_eq(&previous.markers, &current.markers),
            regions: !Arc::ptr_eq(&previous.regions, &current.regions),
            drag_tool: !Arc::ptr_eq(&previous.interaction, &current.interaction)
                && previous.interaction.active_drag_tool != current.interaction.active_drag_tool,
            side_panel_tab: view_field(before.active_side_panel_tab != after.active_side_panel_tab),
        }
    }

    pub fn is_heavy(&self) -> bool {
        self.initial_load
            || self.viewport
            || self.parameter
            || self.view_toggle
            || self.visibility
            || self.chart_offsets
            || self.display_titles
    }

    fn side_panel_dirty(&self) -> bool {
        self.initial_load || self.markers || self.regions || self.side_panel_tab
    }
}

/// Owns the only orchestrator-local state: the snapshot seen last cycle.
pub struct UpdateOrchestrator<H, P, S> {
    host: H,
    processor: P,
    audio_sink: S,
    previous: Option<State>,
}

impl<H, P, S> UpdateOrchestrator<H, P, S>
where
    H: ChartHost,
    P: DataProcessor,
    S: AudioSink,
{
    pub fn new(host: H, processor: P, audio_sink: S) -> Self {
        Self {
            host,
            processor,
            audio_sink,
            previous: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn audio_sink(&self) -> &S {
        &self.audio_sink
    }

    pub fn previous_state(&self) -> Option<&State> {
        self.previous.as_ref()
    }

    /// Runs one update cycle for `state` and returns the follow-up actions
    /// (step size, region metrics) the caller should dispatch afterwards.
    /// A failing host or processor call is logged and skipped.
    pub fn run_cycle(&mut self, state: &State) -> Vec<Action> {
        let changes = ChangeSet::between(self.previous.as_ref(), state);
        debug!(
            action = state.last_action().map(Action::type_name),
            heavy = changes.is_heavy(),
            ?changes,
            "update cycle"
        );
        let mut follow_ups = Vec::new();

        let details = if changes.is_heavy() {
            info!(initial_load = changes.initial_load, "heavy update");
            let details = guarded(
                "update_active_data",
                self.processor.update_active_data(&state.view),
            )
            .unwrap_or_default();

            let step = guarded(
                "calculate_step_size",
                self.processor.calculate_step_size(state),
            )
            .flatten();
            if let Some(step) = step {
                let stored = state.interaction.keyboard.step_size_ms;
                if step.is_finite() && step > 0.0 && stored != Some(step) {
                    follow_ups.push(actions::step_size_calculated(step));
                }
            }

            guarded(
                "render_primary_charts",
                self.host.render_primary_charts(state, &details),
            );
            Some(details)
        } else {
            None
        };

        guarded(
            "update_active_freq_bar_data",
            self.processor.update_active_freq_bar_data(state),
        );
        guarded("render_frequency_bar", self.host.render_frequency_bar(state));
        guarded("render_overlays", self.host.render_overlays(state));
        guarded(
            "render_control_widgets",
            self.host.render_control_widgets(state, details.as_ref()),
        );

        if changes.side_panel_dirty() {
            guarded("render_side_panel", self.host.render_side_panel(state));
        }
        if changes.initial_load || changes.markers {
            guarded("render_markers", self.host.render_markers(state));
        }
        if changes.initial_load || changes.regions {
            guarded("render_regions", self.host.render_regions(state));
            let updates = guarded(
                "prepare_region_metrics",
                self.processor.prepare_region_metrics(state),
            )
            .unwrap_or_default();
            follow_ups.extend(metric_follow_ups(state, updates));
        }
        if changes.initial_load || changes.drag_tool {
            guarded("render_active_tool", self.host.render_active_tool(state));
        }

        match &self.previous {
            Some(previous) => synchronize_audio(state, previous, &mut self.audio_sink),
            None => synchronize_audio(state, &State::default(), &mut self.audio_sink),
        }
        self.previous = Some(state.clone());
        follow_ups
    }
}

impl<H, P, S> StoreListener for UpdateOrchestrator<H, P, S>
where
    H: ChartHost,
    P: DataProcessor,
    S: AudioSink,
{
    fn on_state_change(&mut self, state: &State) -> Vec<Action> {
        self.run_cycle(state)
    }
}

/// Only regions whose stored metrics actually differ get an update, so the
/// regions change caused by the update itself settles on the next cycle.
fn metric_follow_ups(state: &State, updates: Vec<RegionMetricsUpdate>) -> Vec<Action> {
    updates
        .into_iter()
        .filter(|update| {
            state
                .regions
                .get(update.id)
                .is_some_and(|region| {
                    !region
                        .metrics
                        .as_ref()
                        .is_some_and(|current| metrics_eq(current, &update.metrics))
                })
        })
        .map(|update| actions::region_set_metrics(update.id, update.metrics))
        .collect()
}

fn guarded<T>(renderer: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!(renderer, error = %format!("{err:#}"), "update step failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
