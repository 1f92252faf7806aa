//! The process-wide contrast adjuster.
//!
//! The host framework keeps at most one contrast adjuster for all open displays and consults it
//! whenever a composite recomputes its frame. An adjuster reacts by requesting another update of
//! the image it watches, so a recompute must run with the adjuster detached. The previous value
//! must be put back afterwards; the host leaks memory for every display opened while it is
//! missing.
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::SlotError;

/// The interactive contrast controls of the host.
pub trait ContrastAdjuster: Send + Sync {
    /// Called by a composite after it recomputed its frame.
    fn image_updated(&self, title: &str);
}

/// A shared handle to the installed adjuster.
pub type AdjusterHandle = Arc<dyn ContrastAdjuster>;

/// Holds the contrast adjuster instance, if any.
///
/// The host owns a single [`ContrastAdjusterSlot::global`]. Separate slots are useful to isolate
/// displays from each other, for instance in tests.
#[derive(Default)]
pub struct ContrastAdjusterSlot {
    instance: Mutex<Option<AdjusterHandle>>,
}

/// The adjuster taken out of its slot for the duration of a recompute.
///
/// Dropping the guard restores the saved value unconditionally, including while unwinding.
#[must_use = "the adjuster is restored as soon as the guard is dropped"]
pub struct DetachedAdjuster<'slot> {
    slot: &'slot ContrastAdjusterSlot,
    /// `None` when detaching failed and there is nothing to restore.
    saved: Option<Option<AdjusterHandle>>,
}

impl ContrastAdjusterSlot {
    pub fn new() -> Self {
        ContrastAdjusterSlot::default()
    }

    /// The slot shared by every display of the process.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<ContrastAdjusterSlot>> = OnceLock::new();
        GLOBAL.get_or_init(Default::default).clone()
    }

    /// The currently installed adjuster.
    pub fn get(&self) -> Result<Option<AdjusterHandle>, SlotError> {
        let instance = self.instance.lock().map_err(|_| SlotError::Poisoned)?;
        Ok(instance.clone())
    }

    /// Install an adjuster, or clear the slot, returning the previous value.
    pub fn set(&self, adjuster: Option<AdjusterHandle>) -> Result<Option<AdjusterHandle>, SlotError> {
        let mut instance = self.instance.lock().map_err(|_| SlotError::Poisoned)?;
        Ok(core::mem::replace(&mut *instance, adjuster))
    }

    /// Save and clear the installed adjuster until the guard is dropped.
    ///
    /// Failing to access the slot is logged; the caller proceeds with whatever value is installed.
    pub fn detach(&self) -> DetachedAdjuster<'_> {
        let saved = match self.set(None) {
            Ok(previous) => Some(previous),
            Err(err) => {
                log::error!("Failed to detach the contrast adjuster instance: {err}");
                None
            }
        };

        DetachedAdjuster { slot: self, saved }
    }
}

impl DetachedAdjuster<'_> {
    /// Whether the adjuster was actually taken out of the slot.
    pub fn is_detached(&self) -> bool {
        self.saved.is_some()
    }
}

impl Drop for DetachedAdjuster<'_> {
    fn drop(&mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };

        if let Err(err) = self.slot.set(saved) {
            log::error!("Couldn't restore the contrast adjuster instance: {err}");
        }
    }
}
