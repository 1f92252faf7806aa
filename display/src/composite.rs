//! The host framework's composite image.
use std::sync::Arc;

use mmdisplay_codec::{Processor, Sample};

use crate::error::DisplayError;
use crate::lut::{CompositeMode, Lut};
use crate::singleton::ContrastAdjusterSlot;

/// Channel, slice and frame counts of a composite stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub channels: usize,
    pub slices: usize,
    pub frames: usize,
}

impl Dimensions {
    pub const fn new(channels: usize, slices: usize, frames: usize) -> Self {
        Dimensions {
            channels,
            slices,
            frames,
        }
    }

    /// The number of planes, `channels × slices × frames`, saturating at `usize::MAX`.
    pub const fn stack_size(&self) -> usize {
        self.channels
            .saturating_mul(self.slices)
            .saturating_mul(self.frames)
    }

    /// The number of planes, or `None` if it overflows.
    pub fn checked_stack_size(&self) -> Option<usize> {
        self.channels
            .checked_mul(self.slices)?
            .checked_mul(self.frames)
    }
}

/// A composite image object provided by the host display framework.
///
/// None of these methods synchronize. They are only ever called by a
/// [`CompositeDisplayController`](crate::CompositeDisplayController) holding its lock.
pub trait CompositeHost: Send + 'static {
    fn mode(&self) -> CompositeMode;

    fn set_mode(&mut self, mode: CompositeMode);

    /// One look-up table per channel.
    fn luts(&self) -> &[Lut];

    /// Replace the look-up table of the active channel.
    fn set_channel_lut(&mut self, lut: Lut);

    fn active_channel(&self) -> usize;

    fn set_active_channel(&mut self, channel: usize) -> Result<(), DisplayError>;

    fn dimensions(&self) -> Dimensions;

    /// Overwrite the counters without adjusting any per-channel state.
    fn set_dimensions(&mut self, dims: Dimensions);

    /// Replace the displayed plane of a channel.
    fn set_channel_processor(
        &mut self,
        channel: usize,
        processor: Processor<'static>,
    ) -> Result<(), DisplayError>;

    /// Recompute the rendered frame from pixels, look-up tables and mode.
    fn update_image(&mut self);

    /// Rebuild per-channel state from the current dimensions.
    fn reset(&mut self);

    /// The sample of each channel at a coordinate, `None` where a channel has no plane or the
    /// coordinate is outside it.
    fn pixel(&self, x: u32, y: u32) -> Vec<Option<Sample>>;

    /// The last rendered frame, one `0x00RRGGBB` value per pixel.
    fn rendered(&self) -> &[u32];
}

/// The reference composite image.
///
/// Recomputing consults the installed contrast adjuster, like the host framework does.
pub struct CompositeImage {
    title: String,
    mode: CompositeMode,
    dims: Dimensions,
    active_channel: usize,
    luts: Vec<Lut>,
    planes: Vec<Option<Processor<'static>>>,
    /// Look-up table changes per channel since the last reset.
    lut_changes: Vec<u64>,
    width: u32,
    height: u32,
    rendered: Vec<u32>,
    adjuster: Arc<ContrastAdjusterSlot>,
}

impl CompositeImage {
    pub fn new(dims: Dimensions, mode: CompositeMode, adjuster: Arc<ContrastAdjusterSlot>) -> Self {
        let mut image = CompositeImage {
            title: String::new(),
            mode,
            dims,
            active_channel: 0,
            luts: Vec::new(),
            planes: Vec::new(),
            lut_changes: Vec::new(),
            width: 0,
            height: 0,
            rendered: Vec::new(),
            adjuster,
        };

        image.reset();
        image
    }

    /// The title reported to the contrast adjuster.
    pub fn with_title(self, title: impl Into<String>) -> Self {
        CompositeImage {
            title: title.into(),
            ..self
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Look-up table changes of each channel since the last reset.
    pub fn lut_changes(&self) -> &[u64] {
        &self.lut_changes
    }

    fn check_channel(&self, channel: usize) -> Result<(), DisplayError> {
        if channel < self.planes.len() {
            Ok(())
        } else {
            Err(DisplayError::ChannelOutOfRange {
                channel,
                channels: self.planes.len(),
            })
        }
    }

    fn render_into(&mut self) {
        let len = self.width as usize * self.height as usize;
        self.rendered.clear();
        self.rendered.resize(len, 0);

        let shown: Vec<(usize, Lut)> = match self.mode {
            CompositeMode::Composite => self.luts.iter().cloned().enumerate().collect(),
            CompositeMode::Color => vec![(self.active_channel, self.luts[self.active_channel].clone())],
            CompositeMode::Grayscale => {
                let (min, max) = self.luts[self.active_channel].display_range();
                vec![(self.active_channel, Lut::grays().with_display_range(min, max))]
            }
        };

        for (channel, lut) in shown {
            let Some(plane) = &self.planes[channel] else {
                continue;
            };

            for y in 0..self.height {
                for x in 0..self.width {
                    let Some(sample) = plane.sample(x, y) else {
                        continue;
                    };

                    let rgb = match sample {
                        Sample::Rgb(rgb) => rgb,
                        other => lut.map(other.intensity()),
                    };

                    let idx = y as usize * self.width as usize + x as usize;
                    self.rendered[idx] = add_saturating(self.rendered[idx], rgb);
                }
            }
        }
    }
}

impl CompositeHost for CompositeImage {
    fn mode(&self) -> CompositeMode {
        self.mode
    }

    fn set_mode(&mut self, mode: CompositeMode) {
        self.mode = mode;
    }

    fn luts(&self) -> &[Lut] {
        &self.luts
    }

    fn set_channel_lut(&mut self, lut: Lut) {
        if let Some(slot) = self.luts.get_mut(self.active_channel) {
            *slot = lut;
            self.lut_changes[self.active_channel] += 1;
        }
    }

    fn active_channel(&self) -> usize {
        self.active_channel
    }

    fn set_active_channel(&mut self, channel: usize) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        self.active_channel = channel;
        Ok(())
    }

    fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn set_dimensions(&mut self, dims: Dimensions) {
        self.dims = dims;
    }

    fn set_channel_processor(
        &mut self,
        channel: usize,
        processor: Processor<'static>,
    ) -> Result<(), DisplayError> {
        self.check_channel(channel)?;

        let installed = self
            .planes
            .iter()
            .enumerate()
            .any(|(c, plane)| c != channel && plane.is_some());
        if installed && (processor.width(), processor.height()) != (self.width, self.height) {
            return Err(DisplayError::FrameSize {
                width: self.width,
                height: self.height,
                actual_width: processor.width(),
                actual_height: processor.height(),
            });
        }

        self.width = processor.width();
        self.height = processor.height();
        self.planes[channel] = Some(processor);
        Ok(())
    }

    fn update_image(&mut self) {
        log::trace!("Recomputing {} in {:?} mode", self.title, self.mode);

        match self.adjuster.get() {
            Ok(Some(adjuster)) => adjuster.image_updated(&self.title),
            Ok(None) => {}
            Err(err) => log::warn!("Skipping contrast adjuster: {err}"),
        }

        self.render_into();
    }

    fn reset(&mut self) {
        let channels = self.dims.channels.max(1);

        self.luts.truncate(channels);
        while self.luts.len() < channels {
            self.luts.push(Lut::for_channel(self.luts.len()));
        }

        // Planes are re-delivered by the acquisition, possibly with a new frame size.
        self.planes.clear();
        self.planes.resize_with(channels, || None);
        self.lut_changes.clear();
        self.lut_changes.resize(channels, 0);
        self.active_channel = 0;
    }

    fn pixel(&self, x: u32, y: u32) -> Vec<Option<Sample>> {
        self.planes
            .iter()
            .map(|plane| plane.as_ref().and_then(|plane| plane.sample(x, y)))
            .collect()
    }

    fn rendered(&self) -> &[u32] {
        &self.rendered
    }
}

fn add_saturating(packed: u32, rgb: [u8; 3]) -> u32 {
    let [_, r, g, b] = packed.to_be_bytes();
    u32::from_be_bytes([
        0,
        r.saturating_add(rgb[0]),
        g.saturating_add(rgb[1]),
        b.saturating_add(rgb[2]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mmdisplay_codec::ProcessorPixels;

    use crate::singleton::{AdjusterHandle, ContrastAdjuster};

    fn mono8(values: &[u8]) -> Processor<'static> {
        Processor::new(
            values.len() as u32,
            1,
            ProcessorPixels::Mono8(Cow::Owned(values.to_vec())),
        )
        .unwrap()
    }

    fn two_channels() -> CompositeImage {
        let mut image = CompositeImage::new(
            Dimensions::new(2, 1, 1),
            CompositeMode::Composite,
            Arc::new(ContrastAdjusterSlot::new()),
        );
        image.set_channel_processor(0, mono8(&[255, 0])).unwrap();
        image.set_channel_processor(1, mono8(&[255, 255])).unwrap();
        image
    }

    #[test]
    fn composite_overlays_channels() {
        let mut image = two_channels();
        image.update_image();
        assert_eq!(image.rendered(), &[0x00ff_ff00, 0x0000_ff00]);
    }

    #[test]
    fn color_and_grayscale_show_active_channel() {
        let mut image = two_channels();

        image.set_mode(CompositeMode::Color);
        image.update_image();
        assert_eq!(image.rendered(), &[0x00ff_0000, 0]);

        image.set_mode(CompositeMode::Grayscale);
        image.set_active_channel(1).unwrap();
        image.update_image();
        assert_eq!(image.rendered(), &[0x00ff_ffff, 0x00ff_ffff]);
    }

    #[test]
    fn packed_color_bypasses_lut() {
        let mut image = CompositeImage::new(
            Dimensions::new(1, 1, 1),
            CompositeMode::Composite,
            Arc::new(ContrastAdjusterSlot::new()),
        );
        let color = Processor::new(1, 1, ProcessorPixels::PackedColor32(vec![0x0012_3456])).unwrap();
        image.set_channel_processor(0, color).unwrap();
        image.update_image();
        assert_eq!(image.rendered(), &[0x0012_3456]);
    }

    #[test]
    fn rejects_mismatched_planes() {
        let mut image = two_channels();
        assert!(matches!(
            image.set_channel_processor(1, mono8(&[1, 2, 3])),
            Err(DisplayError::FrameSize { .. })
        ));
        assert!(matches!(
            image.set_channel_processor(2, mono8(&[1, 2])),
            Err(DisplayError::ChannelOutOfRange {
                channel: 2,
                channels: 2
            })
        ));
    }

    #[test]
    fn replacing_the_only_plane_may_resize() {
        let mut image = CompositeImage::new(
            Dimensions::new(1, 1, 1),
            CompositeMode::Composite,
            Arc::new(ContrastAdjusterSlot::new()),
        );
        image.set_channel_processor(0, mono8(&[1, 2])).unwrap();
        image.set_channel_processor(0, mono8(&[1, 2, 3])).unwrap();
        assert_eq!((image.width(), image.height()), (3, 1));

        image.update_image();
        assert_eq!(image.rendered().len(), 3);
    }

    #[test]
    fn reset_accepts_new_frame_size() {
        let mut image = two_channels();
        assert!(image.set_channel_processor(0, mono8(&[1, 2, 3])).is_err());

        image.reset();
        assert_eq!(image.pixel(0, 0), vec![None, None]);
        image.set_channel_processor(0, mono8(&[1, 2, 3])).unwrap();
        image.set_channel_processor(1, mono8(&[4, 5, 6])).unwrap();
        assert_eq!((image.width(), image.height()), (3, 1));
    }

    #[test]
    fn stack_size_saturates() {
        let dims = Dimensions::new(usize::MAX, 2, 1);
        assert_eq!(dims.stack_size(), usize::MAX);
        assert_eq!(dims.checked_stack_size(), None);
        assert_eq!(Dimensions::new(2, 3, 4).checked_stack_size(), Some(24));
    }

    #[test]
    fn reset_clears_channel_counters() {
        let mut image = two_channels();
        image.set_active_channel(1).unwrap();
        image.set_channel_lut(Lut::grays());
        image.set_channel_lut(Lut::grays());
        assert_eq!(image.lut_changes(), &[0, 2]);

        image.set_dimensions(Dimensions::new(3, 1, 1));
        image.reset();
        assert_eq!(image.lut_changes(), &[0, 0, 0]);
        assert_eq!(image.luts().len(), 3);
        assert_eq!(image.active_channel(), 0);
    }

    #[test]
    fn pixel_reports_every_channel() {
        let mut image = CompositeImage::new(
            Dimensions::new(3, 1, 1),
            CompositeMode::Composite,
            Arc::new(ContrastAdjusterSlot::new()),
        );
        image.set_channel_processor(0, mono8(&[255, 0])).unwrap();
        image.set_channel_processor(2, mono8(&[7, 9])).unwrap();

        assert_eq!(image.pixel(1, 0), vec![Some(Sample::U8(0)), None, Some(Sample::U8(9))]);
        assert_eq!(image.pixel(5, 0), vec![None, None, None]);
    }

    struct Counting(AtomicUsize);

    impl ContrastAdjuster for Counting {
        fn image_updated(&self, _: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn recompute_consults_adjuster() {
        let slot = Arc::new(ContrastAdjusterSlot::new());
        let adjuster = Arc::new(Counting(AtomicUsize::new(0)));
        slot.set(Some(adjuster.clone() as AdjusterHandle)).unwrap();

        let mut image = CompositeImage::new(Dimensions::new(1, 1, 1), CompositeMode::Composite, slot);
        image.update_image();
        assert_eq!(adjuster.0.load(Ordering::SeqCst), 1);
    }
}
