use std::sync::Arc;

use shared::{
    protocol::{Action, ActionKind},
    state::{HoverState, InteractionState, TapState},
};

use super::update_slice;
use crate::DEFAULT_KEYBOARD_STEP_MS;

pub fn reduce(state: &Arc<InteractionState>, action: &Action) -> Arc<InteractionState> {
    match &action.kind {
        ActionKind::Tap {
            timestamp,
            position_id,
            chart_name,
        } if timestamp.is_finite() => update_slice(state, |interaction| {
            interaction.tap = TapState {
                is_active: true,
                timestamp: Some(*timestamp),
                position_id: Some(position_id.clone()),
                source_chart_name: Some(chart_name.clone()),
            };
        }),
        ActionKind::TapCleared => update_slice(state, |interaction| {
            interaction.tap = TapState::default();
        }),
        ActionKind::HoverChanged {
            is_active,
            timestamp,
            position_id,
            source_chart_name,
            spec_y,
        } => update_slice(state, |interaction| {
            interaction.hover = if *is_active {
                HoverState {
                    is_active: true,
                    timestamp: timestamp.filter(|value| value.is_finite()),
                    position: position_id.clone(),
                    source_chart_name: source_chart_name.clone(),
                    spec_y: *spec_y,
                }
            } else {
                HoverState::default()
            };
        }),
        ActionKind::KeyNav { direction } => {
            let tap = &state.tap;
            let Some(timestamp) = tap.timestamp.filter(|_| tap.is_active) else {
                return Arc::clone(state);
            };
            let step = step_size(state);
            update_slice(state, |interaction| {
                interaction.tap.timestamp = Some(timestamp + direction.sign() * step);
            })
        }
        ActionKind::StepSizeCalculated { step_size_ms }
            if step_size_ms.is_finite() && *step_size_ms > 0.0 =>
        {
            update_slice(state, |interaction| {
                interaction.keyboard.step_size_ms = Some(*step_size_ms);
            })
        }
        ActionKind::KeyboardEnabledSet { enabled } => update_slice(state, |interaction| {
            interaction.keyboard.enabled = *enabled;
        }),
        ActionKind::DragToolChanged { tool } => update_slice(state, |interaction| {
            interaction.active_drag_tool = *tool;
        }),
        _ => Arc::clone(state),
    }
}

/// Current keyboard step, falling back to the default until one is calculated.
pub fn step_size(interaction: &InteractionState) -> f64 {
    interaction
        .keyboard
        .step_size_ms
        .filter(|step| step.is_finite() && *step > 0.0)
        .unwrap_or(DEFAULT_KEYBOARD_STEP_MS)
}

#[cfg(test)]
#[path = "../tests/interaction_tests.rs"]
mod tests;
