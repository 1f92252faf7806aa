//! Serializes composite display operations against the rendering thread.
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use mmdisplay_codec::{to_processor, CopyPolicy, Processor, Sample};
use mmdisplay_pixels::Image;

use crate::canvas::{Canvas, DisplayOwner, ImageListener};
use crate::composite::{CompositeHost, Dimensions};
use crate::config::DisplayConfig;
use crate::error::DisplayError;
use crate::executor::RenderExecutor;
use crate::lut::{CompositeMode, Lut};
use crate::singleton::ContrastAdjusterSlot;

/// What the controller is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Updating = 1,
    Drawing = 2,
}

/// The host framework facilities a display depends on.
#[derive(Clone)]
pub struct DisplayServices {
    pub owner: Arc<dyn DisplayOwner>,
    pub executor: Arc<dyn RenderExecutor>,
    pub adjuster: Arc<ContrastAdjusterSlot>,
}

/// Controls one composite image of an open display.
///
/// Cloning yields another handle to the same display. Every operation except [`reset`] expects to
/// be called on the rendering thread and logs a warning otherwise. Operations take a per-display
/// lock, so overlapping invocations never observe a half-applied update.
///
/// [`reset`]: CompositeDisplayController::reset
pub struct CompositeDisplayController<H> {
    shared: Arc<Shared<H>>,
}

struct Shared<H> {
    title: String,
    copy_policy: CopyPolicy,
    services: DisplayServices,
    state: Mutex<State<H>>,
    phase: AtomicU8,
    window: Mutex<Option<Arc<dyn Canvas>>>,
    listeners: Mutex<Vec<Arc<dyn ImageListener>>>,
}

struct State<H> {
    host: H,
    pixels_generation: u64,
}

/// Returns the controller to [`Phase::Idle`] when dropped.
struct PhaseGuard<'a>(&'a AtomicU8);

impl DisplayServices {
    /// Services using the process-wide contrast adjuster.
    pub fn new(owner: Arc<dyn DisplayOwner>, executor: Arc<dyn RenderExecutor>) -> Self {
        DisplayServices {
            owner,
            executor,
            adjuster: ContrastAdjusterSlot::global(),
        }
    }

    pub fn with_adjuster_slot(self, adjuster: Arc<ContrastAdjusterSlot>) -> Self {
        DisplayServices { adjuster, ..self }
    }
}

impl<H: CompositeHost> CompositeDisplayController<H> {
    pub fn new(
        title: impl Into<String>,
        host: H,
        services: DisplayServices,
        copy_policy: CopyPolicy,
    ) -> Self {
        CompositeDisplayController {
            shared: Arc::new(Shared {
                title: title.into(),
                copy_policy,
                services,
                state: Mutex::new(State {
                    host,
                    pixels_generation: 0,
                }),
                phase: AtomicU8::new(Phase::Idle as u8),
                window: Mutex::new(None),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A display set up from configuration.
    ///
    /// The host starts in the configured mode. Without a title the configured default is used.
    pub fn from_config(
        title: Option<&str>,
        mut host: H,
        services: DisplayServices,
        config: &DisplayConfig,
    ) -> Self {
        host.set_mode(config.composite.initial_mode);
        let title = title.unwrap_or(config.composite.title.as_str());
        Self::new(title, host, services, config.codec.copy_policy.into())
    }

    pub fn title(&self) -> &str {
        &self.shared.title
    }

    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    /// The number of completed recomputes.
    pub fn pixels_generation(&self) -> u64 {
        self.shared.lock().pixels_generation
    }

    /// Read the host image under the display lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&self.shared.lock().host)
    }

    pub fn mode(&self) -> CompositeMode {
        self.shared.lock().host.mode()
    }

    pub fn set_mode(&self, mode: CompositeMode) {
        self.shared.check_affinity("set_mode");
        self.shared.lock().host.set_mode(mode);
    }

    pub fn luts(&self) -> Vec<Lut> {
        self.shared.lock().host.luts().to_vec()
    }

    /// Install a look-up table for the active channel.
    pub fn set_channel_lut(&self, lut: Lut) {
        self.shared.check_affinity("set_channel_lut");
        self.shared.lock().host.set_channel_lut(lut);
    }

    pub fn set_active_channel(&self, channel: usize) -> Result<(), DisplayError> {
        self.shared.check_affinity("set_active_channel");
        self.shared.lock().host.set_active_channel(channel)
    }

    /// Replace the displayed plane of a channel.
    pub fn install_processor(
        &self,
        channel: usize,
        processor: Processor<'static>,
    ) -> Result<(), DisplayError> {
        self.shared.check_affinity("install_processor");
        self.shared.lock().host.set_channel_processor(channel, processor)
    }

    /// Convert an acquired image and show it as the plane of a channel.
    pub fn install_image(&self, channel: usize, image: &Image) -> Result<(), DisplayError> {
        let processor = to_processor(image, self.shared.copy_policy)?.into_owned();
        self.install_processor(channel, processor)
    }

    /// Recompute the rendered frame.
    ///
    /// The contrast adjuster is detached for the duration of the recompute and restored
    /// afterwards, also when the recompute panics.
    pub fn update_image(&self) {
        self.shared.check_affinity("update_image");
        self.shared.update_image();
    }

    /// Repaint the current frame without recomputing it.
    pub fn draw(&self) {
        self.shared.check_affinity("draw");
        self.shared.draw();
    }

    /// Recompute, then notify listeners and repaint on the rendering thread.
    ///
    /// The recompute happens before returning. Notification and repaint are queued; if they can
    /// not be queued the failure is logged.
    pub fn update_and_draw(&self) {
        self.shared.check_affinity("update_and_draw");
        self.shared.update_image();

        let weak = Arc::downgrade(&self.shared);
        let deferred = self.shared.services.executor.invoke_later(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.notify_listeners();
                shared.draw();
            }
        }));

        if let Err(err) = deferred {
            log::error!("Failed to schedule repaint of {}: {err}", self.shared.title);
        }
    }

    /// Repaint after a view-only change such as a new display range.
    ///
    /// Forces the canvas to consider the paint pending so it never skips it.
    pub fn draw_without_update(&self) {
        self.shared.check_affinity("draw_without_update");

        if let Some(canvas) = self.shared.window() {
            canvas.set_paint_pending(true);
            canvas.set_image_updated();
        }

        self.shared.draw();
    }

    /// The sample of each channel at a coordinate, indexed by channel.
    pub fn pixel_intensities(&self, x: u32, y: u32) -> Vec<Option<Sample>> {
        self.shared.lock().host.pixel(x, y)
    }

    /// The last rendered frame.
    pub fn rendered_frame(&self) -> Vec<u32> {
        self.shared.lock().host.rendered().to_vec()
    }

    /// Rebuild per-channel state from the current dimensions.
    ///
    /// May be called from any thread. Off the rendering thread the reset is queued. Either way
    /// it is skipped if the owning display has closed by the time it runs.
    pub fn reset(&self) {
        let executor = &self.shared.services.executor;
        if executor.is_render_thread() {
            self.shared.reset();
            return;
        }

        let weak: Weak<Shared<H>> = Arc::downgrade(&self.shared);
        let queued = executor.invoke_later(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.reset();
            }
        }));

        if let Err(err) = queued {
            log::error!("Failed to queue reset of {}: {err}", self.shared.title);
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.shared.lock().host.dimensions()
    }

    /// Set all counters, checking they describe a stack of the declared size.
    pub fn set_dimensions(&self, dims: Dimensions, stack_size: usize) -> Result<(), DisplayError> {
        if dims.checked_stack_size() != Some(stack_size) {
            return Err(DisplayError::DimensionMismatch {
                channels: dims.channels,
                slices: dims.slices,
                frames: dims.frames,
                stack_size,
            });
        }

        self.shared.check_affinity("set_dimensions");
        self.shared.lock().host.set_dimensions(dims);
        Ok(())
    }

    /// The number of planes, `channels × slices × frames`, saturating on overflow.
    pub fn image_stack_size(&self) -> usize {
        self.dimensions().stack_size()
    }

    pub fn stack_size(&self) -> usize {
        self.image_stack_size()
    }

    pub fn channels_unverified(&self) -> usize {
        self.dimensions().channels
    }

    pub fn slices_unverified(&self) -> usize {
        self.dimensions().slices
    }

    pub fn frames_unverified(&self) -> usize {
        self.dimensions().frames
    }

    pub fn set_channels_unverified(&self, channels: usize) {
        self.shared.check_affinity("set_channels_unverified");
        self.shared.modify_dimensions(|dims| dims.channels = channels);
    }

    pub fn set_slices_unverified(&self, slices: usize) {
        self.shared.check_affinity("set_slices_unverified");
        self.shared.modify_dimensions(|dims| dims.slices = slices);
    }

    pub fn set_frames_unverified(&self, frames: usize) {
        self.shared.check_affinity("set_frames_unverified");
        self.shared.modify_dimensions(|dims| dims.frames = frames);
    }

    pub fn attach_window(&self, canvas: Arc<dyn Canvas>) {
        if let Ok(mut window) = self.shared.window.lock() {
            *window = Some(canvas);
        }
    }

    pub fn detach_window(&self) {
        if let Ok(mut window) = self.shared.window.lock() {
            *window = None;
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn ImageListener>) {
        if let Ok(mut listeners) = self.shared.listeners.lock() {
            listeners.push(listener);
        }
    }
}

impl<H> Clone for CompositeDisplayController<H> {
    fn clone(&self) -> Self {
        CompositeDisplayController {
            shared: self.shared.clone(),
        }
    }
}

impl<H: CompositeHost> Shared<H> {
    /// Lock the display state, recovering from a panic in a previous operation.
    fn lock(&self) -> MutexGuard<'_, State<H>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn phase(&self) -> Phase {
        match self.phase.load(Ordering::Acquire) {
            1 => Phase::Updating,
            2 => Phase::Drawing,
            _ => Phase::Idle,
        }
    }

    fn enter(&self, phase: Phase) -> PhaseGuard<'_> {
        self.phase.store(phase as u8, Ordering::Release);
        PhaseGuard(&self.phase)
    }

    fn check_affinity(&self, operation: &str) {
        if !self.services.executor.is_render_thread() {
            log::warn!(
                "{operation} on {} called off the rendering thread",
                self.title
            );
        }
    }

    fn window(&self) -> Option<Arc<dyn Canvas>> {
        self.window.lock().ok().and_then(|window| window.clone())
    }

    fn update_image(&self) {
        let mut state = self.lock();
        let _phase = self.enter(Phase::Updating);
        let detached = self.services.adjuster.detach();

        state.host.update_image();
        state.pixels_generation += 1;

        drop(detached);
    }

    fn draw(&self) {
        let Some(canvas) = self.window() else {
            log::debug!("No window attached to {}, skipping draw", self.title);
            return;
        };

        let _phase = self.enter(Phase::Drawing);
        canvas.repaint();
    }

    fn reset(&self) {
        if self.services.owner.is_closed() {
            log::debug!("Display {} closed, abandoning reset", self.title);
            return;
        }

        let mut state = self.lock();
        state.host.reset();
        self.phase.store(Phase::Idle as u8, Ordering::Release);
    }

    fn modify_dimensions(&self, f: impl FnOnce(&mut Dimensions)) {
        let mut state = self.lock();
        let mut dims = state.host.dimensions();
        f(&mut dims);
        state.host.set_dimensions(dims);
    }

    fn notify_listeners(&self) {
        let listeners = match self.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };

        for listener in listeners {
            listener.image_updated(&self.title);
        }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.store(Phase::Idle as u8, Ordering::Release);
    }
}
