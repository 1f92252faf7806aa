use std::sync::atomic::{AtomicBool, Ordering};

/// The drawing surface of a display window.
pub trait Canvas: Send + Sync {
    /// Request the current rendered frame be painted.
    fn repaint(&self);

    /// Mark that a paint is outstanding.
    ///
    /// A canvas may skip repaints while one is pending. Setting this explicitly before drawing
    /// defeats that shortcut.
    fn set_paint_pending(&self, pending: bool);

    /// Mark that the image changed since the last paint.
    fn set_image_updated(&self);
}

/// The display that owns a composite.
pub trait DisplayOwner: Send + Sync {
    fn is_closed(&self) -> bool;
}

/// Observes changes to displayed pixels.
pub trait ImageListener: Send + Sync {
    fn image_updated(&self, title: &str);
}

/// A display owner that is open until closed.
#[derive(Debug, Default)]
pub struct OwnerFlag {
    closed: AtomicBool,
}

impl OwnerFlag {
    pub fn new() -> Self {
        OwnerFlag::default()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl DisplayOwner for OwnerFlag {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
