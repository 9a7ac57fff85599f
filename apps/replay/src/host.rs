use std::io::Write;

use anyhow::Result;
use dashboard_core::{AudioSink, ChartHost, DataDetails, DataProcessor, RegionMetricsUpdate};
use serde_json::json;
use shared::{
    protocol::AudioCommand,
    state::{State, ViewState},
};
use tracing::{debug, error, info};

/// Stand-in for the plotting host: every render becomes a log line.
#[derive(Debug, Default)]
pub struct LoggingHost;

impl LoggingHost {
    fn rendered(&mut self, renderer: &'static str) -> Result<()> {
        debug!(renderer, "render");
        Ok(())
    }
}

impl ChartHost for LoggingHost {
    fn render_primary_charts(&mut self, state: &State, details: &DataDetails) -> Result<()> {
        info!(
            parameter = %state.view.selected_parameter,
            min = state.view.viewport.min,
            max = state.view.viewport.max,
            %details,
            "render primary charts"
        );
        self.rendered("primary_charts")
    }

    fn render_frequency_bar(&mut self, _state: &State) -> Result<()> {
        self.rendered("frequency_bar")
    }

    fn render_overlays(&mut self, state: &State) -> Result<()> {
        let tap = &state.interaction.tap;
        debug!(
            tap_active = tap.is_active,
            tap_timestamp = tap.timestamp,
            hover_active = state.interaction.hover.is_active,
            "overlays"
        );
        self.rendered("overlays")
    }

    fn render_control_widgets(
        &mut self,
        _state: &State,
        _details: Option<&DataDetails>,
    ) -> Result<()> {
        self.rendered("control_widgets")
    }

    fn render_side_panel(&mut self, state: &State) -> Result<()> {
        debug!(
            tab = state.view.active_side_panel_tab,
            markers = state.markers.len(),
            regions = state.regions.len(),
            "side panel"
        );
        self.rendered("side_panel")
    }

    fn render_markers(&mut self, _state: &State) -> Result<()> {
        self.rendered("markers")
    }

    fn render_regions(&mut self, _state: &State) -> Result<()> {
        self.rendered("regions")
    }

    fn render_active_tool(&mut self, state: &State) -> Result<()> {
        debug!(tool = ?state.interaction.active_drag_tool, "active tool");
        self.rendered("active_tool")
    }
}

/// Deterministic data layer: one sample per second over the viewport.
#[derive(Debug, Default)]
pub struct SyntheticProcessor;

const SAMPLE_INTERVAL_MS: f64 = 1000.0;

impl DataProcessor for SyntheticProcessor {
    fn update_active_data(&mut self, view: &ViewState) -> Result<DataDetails> {
        let samples = if view.viewport.is_set() {
            (view.viewport.span() / SAMPLE_INTERVAL_MS).ceil() as u64
        } else {
            0
        };
        Ok(json!({
            "parameter": view.selected_parameter,
            "positions": view.available_positions,
            "samples": samples,
        }))
    }

    fn calculate_step_size(&mut self, state: &State) -> Result<Option<f64>> {
        let viewport = state.view.viewport;
        if !viewport.is_set() {
            return Ok(None);
        }
        // Coarsest whole-second step that still gives ~100 presses across the view.
        let step = (viewport.span() / 100.0 / SAMPLE_INTERVAL_MS).round() * SAMPLE_INTERVAL_MS;
        Ok(Some(step.max(SAMPLE_INTERVAL_MS)))
    }

    fn update_active_freq_bar_data(&mut self, _state: &State) -> Result<()> {
        Ok(())
    }

    fn prepare_region_metrics(&mut self, state: &State) -> Result<Vec<RegionMetricsUpdate>> {
        Ok(state
            .regions
            .iter()
            .map(|region| RegionMetricsUpdate {
                id: region.id,
                metrics: [
                    ("durationMs".to_string(), region.total_duration()),
                    ("areaCount".to_string(), region.areas.len() as f64),
                ]
                .into_iter()
                .collect(),
            })
            .collect())
    }
}

/// Writes each command record as one JSON line.
pub struct JsonLineSink<W> {
    out: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_record(&mut self, command: &AudioCommand) -> Result<()> {
        serde_json::to_writer(&mut self.out, &command.to_record())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> AudioSink for JsonLineSink<W> {
    fn submit(&mut self, command: AudioCommand) {
        if let Err(err) = self.write_record(&command) {
            error!(command = command.name(), error = %err, "failed to write audio command");
        }
    }
}
