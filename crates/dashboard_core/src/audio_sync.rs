//! Turns one state transition into at most one audio-engine command.

use shared::{
    domain::PositionId,
    protocol::{ActionKind, AudioCommand},
    state::State,
};
use tracing::{info, warn};

use crate::error::AudioContextMissing;

/// Receiver of audio-engine commands (the engine's command model).
pub trait AudioSink {
    fn submit(&mut self, command: AudioCommand);
}

impl AudioSink for Vec<AudioCommand> {
    fn submit(&mut self, command: AudioCommand) {
        self.push(command);
    }
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn submit(&mut self, command: AudioCommand) {
        (**self).submit(command);
    }
}

/// Inspects `current.system.last_action` against `previous` and emits the
/// implied command, if any. A play intent short-circuits every other branch.
pub fn synchronize_audio(current: &State, previous: &State, sink: &mut impl AudioSink) {
    let Some(action) = current.last_action() else {
        return;
    };

    let play_position = match &action.kind {
        ActionKind::Tap { .. } | ActionKind::KeyNav { .. } if previous.audio.is_playing => {
            Some(None)
        }
        ActionKind::AudioPlayPauseToggle {
            position_id,
            is_active: true,
        } => Some(Some(position_id)),
        _ => None,
    };
    if let Some(explicit_position) = play_position {
        match play_command(current, previous, explicit_position) {
            Ok(command) => emit(sink, command),
            Err(reason) => warn!(
                action = action.type_name(),
                %reason,
                "audio play skipped"
            ),
        }
        return;
    }

    let command = match &action.kind {
        ActionKind::AudioPlayPauseToggle {
            position_id,
            is_active: false,
        } => Some(AudioCommand::Pause {
            position_id: position_id.clone(),
        }),
        ActionKind::AudioRateChangeRequest { .. }
            if current.audio.playback_rate != previous.audio.playback_rate =>
        {
            Some(AudioCommand::SetRate {
                position_id: current.audio.active_position_id.clone(),
                rate: current.audio.playback_rate,
            })
        }
        ActionKind::AudioBoostToggleRequest { .. }
            if current.audio.volume_boost != previous.audio.volume_boost =>
        {
            Some(AudioCommand::SetVolumeBoost {
                position_id: current.audio.active_position_id.clone(),
                boost: current.audio.volume_boost,
            })
        }
        _ => None,
    };
    if let Some(command) = command {
        emit(sink, command);
    }
}

fn play_command(
    current: &State,
    previous: &State,
    explicit_position: Option<&PositionId>,
) -> Result<AudioCommand, AudioContextMissing> {
    let position_id = explicit_position
        .or(current.interaction.tap.position_id.as_ref())
        .or(previous.interaction.tap.position_id.as_ref())
        .filter(|position| !position.is_empty())
        .ok_or(AudioContextMissing::NoPosition)?;

    let finite = |value: &f64| value.is_finite();
    let timestamp = current
        .interaction
        .tap
        .timestamp
        .filter(finite)
        .or(previous.interaction.tap.timestamp.filter(finite))
        .ok_or(AudioContextMissing::NoTimestamp)?;

    let adjusted = timestamp - current.view.effective_offset(position_id);
    if !adjusted.is_finite() {
        return Err(AudioContextMissing::NonFiniteAdjustedTimestamp {
            position_id: position_id.clone(),
        });
    }

    Ok(AudioCommand::Play {
        position_id: position_id.clone(),
        timestamp: adjusted,
    })
}

fn emit(sink: &mut impl AudioSink, command: AudioCommand) {
    info!(command = command.name(), ?command, "audio command");
    sink.submit(command);
}

#[cfg(test)]
#[path = "tests/audio_sync_tests.rs"]
mod tests;
