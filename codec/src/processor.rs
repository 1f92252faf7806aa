use std::borrow::Cow;

use crate::error::CodecError;

/// The four pixel containers of the display engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessorVariant {
    /// 8-bit grayscale samples.
    Mono8,
    /// 16-bit grayscale samples.
    Mono16,
    /// IEEE-754 single precision grayscale samples.
    MonoFloat32,
    /// One `0x00RRGGBB` integer per pixel.
    PackedColor32,
}

/// A display-engine pixel container.
///
/// The lifetime ties a processor created with [`CopyPolicy::Alias`](crate::CopyPolicy::Alias) to
/// the image it borrows from. Use [`Processor::into_owned`] to detach it.
#[derive(Clone, Debug, PartialEq)]
pub struct Processor<'data> {
    width: u32,
    height: u32,
    pixels: ProcessorPixels<'data>,
}

/// The samples of a [`Processor`], one per pixel.
#[derive(Clone, Debug, PartialEq)]
pub enum ProcessorPixels<'data> {
    Mono8(Cow<'data, [u8]>),
    Mono16(Cow<'data, [u16]>),
    MonoFloat32(Cow<'data, [f32]>),
    /// Always owned, the color layout never matches the acquisition bytes.
    PackedColor32(Vec<u32>),
}

/// The value of a single pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    U8(u8),
    U16(u16),
    F32(f32),
    Rgb([u8; 3]),
}

impl ProcessorVariant {
    /// The processor an acquisition layout converts to, if any.
    pub fn for_layout(bytes_per_pixel: u8, num_components: u8) -> Option<Self> {
        match (bytes_per_pixel, num_components) {
            (1, 1) => Some(ProcessorVariant::Mono8),
            (2, 1) => Some(ProcessorVariant::Mono16),
            (4, 1) => Some(ProcessorVariant::MonoFloat32),
            (4, 3) => Some(ProcessorVariant::PackedColor32),
            _ => None,
        }
    }

    /// The acquisition layout as `(bytes_per_pixel, num_components)`.
    pub fn layout(self) -> (u8, u8) {
        match self {
            ProcessorVariant::Mono8 => (1, 1),
            ProcessorVariant::Mono16 => (2, 1),
            ProcessorVariant::MonoFloat32 => (4, 1),
            ProcessorVariant::PackedColor32 => (4, 3),
        }
    }
}

impl<'data> Processor<'data> {
    /// Wrap samples, checking there is exactly one per pixel.
    pub fn new(width: u32, height: u32, pixels: ProcessorPixels<'data>) -> Result<Self, CodecError> {
        let expected = (width as usize).checked_mul(height as usize);
        if expected != Some(pixels.len()) {
            return Err(CodecError::SampleCount {
                width,
                height,
                actual: pixels.len(),
            });
        }

        Ok(Processor {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn variant(&self) -> ProcessorVariant {
        self.pixels.variant()
    }

    pub fn pixels(&self) -> &ProcessorPixels<'data> {
        &self.pixels
    }

    /// Whether the samples are borrowed from an image.
    pub fn is_borrowed(&self) -> bool {
        match &self.pixels {
            ProcessorPixels::Mono8(cow) => matches!(cow, Cow::Borrowed(_)),
            ProcessorPixels::Mono16(cow) => matches!(cow, Cow::Borrowed(_)),
            ProcessorPixels::MonoFloat32(cow) => matches!(cow, Cow::Borrowed(_)),
            ProcessorPixels::PackedColor32(_) => false,
        }
    }

    /// Borrow this processor.
    ///
    /// Grayscale samples are not copied, packed colors are.
    pub fn view(&self) -> Processor<'_> {
        let pixels = match &self.pixels {
            ProcessorPixels::Mono8(px) => ProcessorPixels::Mono8(Cow::Borrowed(&**px)),
            ProcessorPixels::Mono16(px) => ProcessorPixels::Mono16(Cow::Borrowed(&**px)),
            ProcessorPixels::MonoFloat32(px) => ProcessorPixels::MonoFloat32(Cow::Borrowed(&**px)),
            ProcessorPixels::PackedColor32(px) => ProcessorPixels::PackedColor32(px.clone()),
        };

        Processor {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Copy any borrowed samples so the processor outlives its source image.
    pub fn into_owned(self) -> Processor<'static> {
        let pixels = match self.pixels {
            ProcessorPixels::Mono8(px) => ProcessorPixels::Mono8(Cow::Owned(px.into_owned())),
            ProcessorPixels::Mono16(px) => ProcessorPixels::Mono16(Cow::Owned(px.into_owned())),
            ProcessorPixels::MonoFloat32(px) => {
                ProcessorPixels::MonoFloat32(Cow::Owned(px.into_owned()))
            }
            ProcessorPixels::PackedColor32(px) => ProcessorPixels::PackedColor32(px),
        };

        Processor {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Read the pixel at a coordinate, `None` when outside the image.
    pub fn sample(&self, x: u32, y: u32) -> Option<Sample> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = y as usize * self.width as usize + x as usize;
        Some(match &self.pixels {
            ProcessorPixels::Mono8(px) => Sample::U8(px[idx]),
            ProcessorPixels::Mono16(px) => Sample::U16(px[idx]),
            ProcessorPixels::MonoFloat32(px) => Sample::F32(px[idx]),
            ProcessorPixels::PackedColor32(px) => {
                let [_, r, g, b] = px[idx].to_be_bytes();
                Sample::Rgb([r, g, b])
            }
        })
    }
}

impl ProcessorPixels<'_> {
    pub fn variant(&self) -> ProcessorVariant {
        match self {
            ProcessorPixels::Mono8(_) => ProcessorVariant::Mono8,
            ProcessorPixels::Mono16(_) => ProcessorVariant::Mono16,
            ProcessorPixels::MonoFloat32(_) => ProcessorVariant::MonoFloat32,
            ProcessorPixels::PackedColor32(_) => ProcessorVariant::PackedColor32,
        }
    }

    /// Number of samples, which is the number of pixels.
    pub fn len(&self) -> usize {
        match self {
            ProcessorPixels::Mono8(px) => px.len(),
            ProcessorPixels::Mono16(px) => px.len(),
            ProcessorPixels::MonoFloat32(px) => px.len(),
            ProcessorPixels::PackedColor32(px) => px.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sample {
    /// The sample as a single intensity.
    ///
    /// Colors report their mean channel value.
    pub fn intensity(self) -> f64 {
        match self {
            Sample::U8(v) => f64::from(v),
            Sample::U16(v) => f64::from(v),
            Sample::F32(v) => f64::from(v),
            Sample::Rgb([r, g, b]) => (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_table() {
        for variant in [
            ProcessorVariant::Mono8,
            ProcessorVariant::Mono16,
            ProcessorVariant::MonoFloat32,
            ProcessorVariant::PackedColor32,
        ] {
            let (bytes, components) = variant.layout();
            assert_eq!(ProcessorVariant::for_layout(bytes, components), Some(variant));
        }

        assert_eq!(ProcessorVariant::for_layout(2, 3), None);
        assert_eq!(ProcessorVariant::for_layout(1, 3), None);
    }

    #[test]
    fn sample_count_checked() {
        let err = Processor::new(2, 2, ProcessorPixels::Mono8(Cow::Owned(vec![0; 3])));
        assert_eq!(
            err,
            Err(CodecError::SampleCount {
                width: 2,
                height: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn samples_by_coordinate() {
        let packed = Processor::new(2, 1, ProcessorPixels::PackedColor32(vec![0x0010_2030, 0xff]))
            .unwrap();
        assert_eq!(packed.sample(0, 0), Some(Sample::Rgb([0x10, 0x20, 0x30])));
        assert_eq!(packed.sample(1, 0), Some(Sample::Rgb([0, 0, 0xff])));
        assert_eq!(packed.sample(2, 0), None);
        assert_eq!(packed.sample(0, 1), None);

        let data = [1u16, 2, 3, 4];
        let mono = Processor::new(2, 2, ProcessorPixels::Mono16(Cow::Borrowed(&data))).unwrap();
        assert_eq!(mono.sample(1, 1), Some(Sample::U16(4)));
        assert!(mono.is_borrowed());
        assert!(!mono.into_owned().is_borrowed());
    }
}
