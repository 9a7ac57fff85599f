use std::{cell::RefCell, collections::BTreeSet, rc::Rc, sync::Arc};

use anyhow::Result;
use dashboard_core::{
    actions, AudioSink, ChartHost, DataDetails, DataProcessor, Intent, Modifiers,
    RegionMetricsUpdate, Store, UpdateOrchestrator, MIN_REGION_WIDTH_MS,
};
use shared::{
    domain::{MarkerId, PositionId, RegionId},
    protocol::{Action, AudioCommand},
    state::{State, StateSnapshot, ViewState},
};

#[derive(Clone, Default)]
struct SharedLog(Rc<RefCell<Vec<String>>>);

impl SharedLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.as_str() == entry).count()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

struct Host(SharedLog);

impl ChartHost for Host {
    fn render_primary_charts(&mut self, _: &State, _: &DataDetails) -> Result<()> {
        self.0.push("primary");
        Ok(())
    }

    fn render_frequency_bar(&mut self, _: &State) -> Result<()> {
        self.0.push("frequency_bar");
        Ok(())
    }

    fn render_overlays(&mut self, _: &State) -> Result<()> {
        self.0.push("overlays");
        Ok(())
    }

    fn render_control_widgets(&mut self, _: &State, _: Option<&DataDetails>) -> Result<()> {
        self.0.push("controls");
        Ok(())
    }

    fn render_side_panel(&mut self, _: &State) -> Result<()> {
        self.0.push("side_panel");
        Ok(())
    }

    fn render_markers(&mut self, _: &State) -> Result<()> {
        self.0.push("markers");
        Ok(())
    }

    fn render_regions(&mut self, _: &State) -> Result<()> {
        self.0.push("regions");
        Ok(())
    }

    fn render_active_tool(&mut self, _: &State) -> Result<()> {
        self.0.push("active_tool");
        Ok(())
    }
}

/// Step size is a fixed fraction of the viewport; region metrics are the
/// total covered duration.
struct Processor;

impl DataProcessor for Processor {
    fn update_active_data(&mut self, view: &ViewState) -> Result<DataDetails> {
        Ok(serde_json::json!({ "parameter": view.selected_parameter }))
    }

    fn calculate_step_size(&mut self, state: &State) -> Result<Option<f64>> {
        let viewport = state.view.viewport;
        Ok(viewport.is_set().then(|| viewport.span() / 100.0))
    }

    fn update_active_freq_bar_data(&mut self, _: &State) -> Result<()> {
        Ok(())
    }

    fn prepare_region_metrics(&mut self, state: &State) -> Result<Vec<RegionMetricsUpdate>> {
        Ok(state
            .regions
            .iter()
            .map(|region| RegionMetricsUpdate {
                id: region.id,
                metrics: [("durationMs".to_string(), region.total_duration())]
                    .into_iter()
                    .collect(),
            })
            .collect())
    }
}

#[derive(Clone, Default)]
struct Commands(Rc<RefCell<Vec<AudioCommand>>>);

impl AudioSink for Commands {
    fn submit(&mut self, command: AudioCommand) {
        self.0.borrow_mut().push(command);
    }
}

struct Harness {
    store: Store,
    renders: SharedLog,
    commands: Commands,
}

impl Harness {
    fn new() -> Self {
        let renders = SharedLog::default();
        let commands = Commands::default();
        let mut store = Store::new();
        store.subscribe(UpdateOrchestrator::new(
            Host(renders.clone()),
            Processor,
            commands.clone(),
        ));
        store.subscribe(|state: &State| -> Vec<Action> {
            assert_invariants(state);
            Vec::new()
        });
        Self {
            store,
            renders,
            commands,
        }
    }

    fn run(&mut self, intent: Intent) -> usize {
        self.store.run(&intent)
    }

    fn state(&self) -> State {
        self.store.get_state()
    }
}

fn assert_invariants(state: &State) {
    assert!(
        state.markers.selected_id.is_none() || state.regions.selected_id.is_none(),
        "marker and region selected at once"
    );
    let marker_keys: BTreeSet<_> = state.markers.by_id.keys().copied().collect();
    let marker_ids: BTreeSet<_> = state.markers.all_ids.iter().copied().collect();
    assert_eq!(marker_keys, marker_ids);
    assert_eq!(marker_ids.len(), state.markers.all_ids.len());

    let region_keys: BTreeSet<_> = state.regions.by_id.keys().copied().collect();
    let region_ids: BTreeSet<_> = state.regions.all_ids.iter().copied().collect();
    assert_eq!(region_keys, region_ids);
    assert_eq!(region_ids.len(), state.regions.all_ids.len());
}

fn p(id: &str) -> PositionId {
    PositionId::from(id)
}

fn handle_tap(timestamp: f64, modifiers: Modifiers) -> Intent {
    Intent::HandleTap {
        timestamp,
        position_id: p("P1"),
        chart_name: "c".to_string(),
        modifiers,
    }
}

fn create_region(harness: &mut Harness) {
    harness.run(Intent::CreateRegion {
        position_id: p("P1"),
        start: 1_000.0,
        end: 2_000.0,
    });
}

#[test]
fn region_creation_and_selection() {
    let mut harness = Harness::new();
    create_region(&mut harness);

    let state = harness.state();
    assert_eq!(state.regions.all_ids, vec![RegionId(1)]);
    let region = state.regions.get(RegionId(1)).expect("region");
    assert_eq!(region.position_id, p("P1"));
    assert_eq!(region.areas.len(), 1);
    assert_eq!((region.areas[0].start, region.areas[0].end), (1_000.0, 2_000.0));
    assert_eq!(
        region
            .metrics
            .as_ref()
            .and_then(|metrics| metrics.get("durationMs")),
        Some(&1_000.0)
    );
}

#[test]
fn tap_hits_existing_region() {
    let mut harness = Harness::new();
    create_region(&mut harness);
    harness.store.dispatch(actions::region_clear_selection());

    harness.run(handle_tap(1_500.0, Modifiers::default()));

    let state = harness.state();
    assert_eq!(state.regions.selected_id, Some(RegionId(1)));
    assert_eq!(state.interaction.tap.timestamp, Some(1_500.0));
}

#[test]
fn ctrl_tap_on_region_removes_it() {
    let mut harness = Harness::new();
    create_region(&mut harness);

    harness.run(handle_tap(
        1_500.0,
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        },
    ));

    let state = harness.state();
    assert!(state.regions.all_ids.is_empty());
    assert_eq!(state.regions.counter, 1);
}

#[test]
fn region_resize_clamps_at_minimum_width() {
    let mut harness = Harness::new();
    harness.run(Intent::CreateRegion {
        position_id: p("P1"),
        start: 1_000.0,
        end: 5_000.0,
    });
    harness.store.dispatch(actions::step_size_calculated(1_000.0));

    let shrink = Intent::ResizeSelectedRegion {
        key: "ArrowRight".to_string(),
        modifiers: Modifiers {
            alt: true,
            ..Modifiers::default()
        },
    };
    let mut dispatched = Vec::new();
    for _ in 0..6 {
        dispatched.push(harness.run(shrink.clone()));
    }
    assert_eq!(dispatched, vec![1, 1, 1, 1, 0, 0]);

    let before = harness.state();
    harness.run(shrink);
    let after = harness.state();
    assert!(Arc::ptr_eq(&before.regions, &after.regions));

    let region = after.regions.get(RegionId(1)).expect("region");
    assert_eq!(region.end() - region.start(), MIN_REGION_WIDTH_MS);
}

#[test]
fn audio_play_command_uses_effective_offset() {
    let mut harness = Harness::new();
    harness
        .store
        .dispatch(actions::position_chart_offset_set(p("P1"), 300.0));
    harness
        .store
        .dispatch(actions::position_audio_offset_set(p("P1"), 200.0));
    harness.store.dispatch(actions::audio_status_update(
        true,
        Some(p("P1")),
        1.0,
        false,
    ));
    assert!(harness.commands.0.borrow().is_empty());

    harness.run(Intent::HandleTap {
        timestamp: 10_000.0,
        position_id: p("P1"),
        chart_name: "c".to_string(),
        modifiers: Modifiers::default(),
    });

    let commands = harness.commands.0.borrow();
    assert_eq!(commands.len(), 1);
    let record = commands[0].to_record();
    assert_eq!(record.command, vec!["play".to_string()]);
    assert_eq!(record.position_id, vec![Some(p("P1"))]);
    assert_eq!(record.value, vec![serde_json::json!(9_500.0)]);
}

#[test]
fn repeated_viewport_change_is_idempotent() {
    let mut harness = Harness::new();
    harness.store.dispatch(actions::viewport_changed(0.0, 60_000.0));
    let first = harness.state();
    assert_eq!(first.interaction.keyboard.step_size_ms, Some(600.0));

    harness.renders.clear();
    harness.store.dispatch(actions::viewport_changed(0.0, 60_000.0));
    let second = harness.state();

    assert!(Arc::ptr_eq(&first.view, &second.view));
    assert_eq!(harness.renders.count("primary"), 0);
    assert_eq!(harness.renders.count("overlays"), 1);
}

#[test]
fn rehydrating_a_snapshot_reproduces_state() {
    let mut harness = Harness::new();
    harness.store.dispatch(actions::initialize_state(
        vec![p("P1"), p("P2")],
        Some("LAeq".to_string()),
        None,
        Default::default(),
    ));
    harness.store.dispatch(actions::viewport_changed(0.0, 120_000.0));
    create_region(&mut harness);
    harness.store.dispatch(actions::marker_add(30_000.0, p("P2")));
    harness.store.dispatch(actions::marker_select(MarkerId(1)));
    harness
        .store
        .dispatch(actions::position_chart_offset_set(p("P2"), -250.0));
    let source = harness.state();

    let raw = serde_json::to_string(&StateSnapshot::from(&source)).expect("encode");
    let mut restored = Harness::new();
    restored.store.dispatch(actions::rehydrate(
        StateSnapshot::from_json(&raw).expect("decode"),
    ));
    let state = restored.state();

    assert_eq!(state.view, source.view);
    assert_eq!(state.interaction, source.interaction);
    assert_eq!(state.markers, source.markers);
    assert_eq!(state.regions, source.regions);
    assert_eq!(state.audio, source.audio);
    assert!(state.system.initialized);
}

#[test]
fn comparison_slice_becomes_regions() {
    let mut harness = Harness::new();
    harness.store.dispatch(actions::initialize_state(
        vec![p("P1"), p("P2"), p("P3")],
        None,
        None,
        Default::default(),
    ));
    harness.run(Intent::EnterComparisonMode);
    harness.run(Intent::UpdateIncludedPositions {
        included_positions: vec![p("P1"), p("P3")],
    });
    harness.run(Intent::UpdateComparisonSlice {
        start: 8_000.0,
        end: 2_000.0,
    });
    harness.run(Intent::CreateRegionsFromComparison);

    let state = harness.state();
    let positions: Vec<_> = state
        .regions
        .iter()
        .map(|region| region.position_id.clone())
        .collect();
    assert_eq!(positions, vec![p("P1"), p("P3")]);
    assert!(state.regions.iter().all(|region| region.metrics.is_some()));
}

#[test]
fn marker_then_region_selection_stays_exclusive() {
    let mut harness = Harness::new();
    harness.store.dispatch(actions::tap(500.0, p("P1"), "c"));
    harness.run(Intent::AddMarkerAtTap);
    create_region(&mut harness);
    harness.store.dispatch(actions::marker_select(MarkerId(1)));

    let state = harness.state();
    assert_eq!(state.markers.selected_id, Some(MarkerId(1)));
    assert_eq!(state.regions.selected_id, None);

    harness.run(handle_tap(1_500.0, Modifiers::default()));
    let state = harness.state();
    assert_eq!(state.markers.selected_id, None);
    assert_eq!(state.regions.selected_id, Some(RegionId(1)));
}
