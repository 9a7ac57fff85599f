//! Data model shared by the dashboard core and its drivers: ids and
//! annotations, the state tree, and the action / audio-command protocol.

pub mod domain;
pub mod error;
pub mod protocol;
pub mod state;
