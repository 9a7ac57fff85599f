use std::sync::Arc;

use shared::{
    protocol::{Action, ActionKind},
    state::SystemState,
};

/// Tracks initialization. `last_action` is stamped by the root reducer after
/// every pass, not here.
pub fn reduce(state: &Arc<SystemState>, action: &Action) -> Arc<SystemState> {
    match &action.kind {
        ActionKind::InitializeState { .. } if !state.initialized => Arc::new(SystemState {
            initialized: true,
            last_action: state.last_action.clone(),
        }),
        _ => Arc::clone(state),
    }
}
