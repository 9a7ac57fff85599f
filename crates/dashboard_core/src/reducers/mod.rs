//! Slice reducers and the root reducer that composes them.
//!
//! Every slice reducer returns the same `Arc` it was given when an action does
//! not apply or leaves the slice value-equal, so `Arc::ptr_eq` is a reliable
//! "did this slice change" test downstream.

use std::sync::Arc;

pub mod audio;
pub mod interaction;
pub mod markers;
pub mod regions;
mod root;
pub mod system;
pub mod view;

pub use root::{resolve_selection, root_reducer};

/// Copy-on-write edit of a slice that hands back the same `Arc` when the
/// edit turns out to be a no-op.
pub(crate) fn update_slice<T, F>(slice: &Arc<T>, edit: F) -> Arc<T>
where
    T: Clone + PartialEq,
    F: FnOnce(&mut T),
{
    let mut next = T::clone(slice);
    edit(&mut next);
    if next == **slice {
        Arc::clone(slice)
    } else {
        Arc::new(next)
    }
}
