use std::sync::Arc;

use shared::{
    protocol::{Action, ActionKind},
    state::AudioState,
};

use super::update_slice;

pub fn reduce(state: &Arc<AudioState>, action: &Action) -> Arc<AudioState> {
    match &action.kind {
        ActionKind::AudioPlayPauseToggle {
            position_id,
            is_active,
        } => update_slice(state, |audio| {
            audio.is_playing = *is_active;
            if *is_active {
                audio.active_position_id = Some(position_id.clone());
            }
        }),
        ActionKind::AudioStatusUpdate {
            is_playing,
            active_position_id,
            playback_rate,
            volume_boost,
        } => update_slice(state, |audio| {
            audio.is_playing = *is_playing;
            audio.active_position_id = active_position_id.clone();
            if is_valid_rate(*playback_rate) {
                audio.playback_rate = *playback_rate;
            }
            audio.volume_boost = *volume_boost;
        }),
        ActionKind::AudioRateChangeRequest { playback_rate } if is_valid_rate(*playback_rate) => {
            update_slice(state, |audio| audio.playback_rate = *playback_rate)
        }
        ActionKind::AudioBoostToggleRequest { is_boosted } => {
            update_slice(state, |audio| audio.volume_boost = *is_boosted)
        }
        _ => Arc::clone(state),
    }
}

pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}
