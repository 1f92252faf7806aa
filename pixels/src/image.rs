// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `mmdisplay` developers
//! Images as handed out by the acquisition pipeline.
use std::collections::BTreeMap;
use std::fmt;

use crate::buf::Buffer;

/// Errors rejecting the construction of an [`Image`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("unsupported bytes per pixel: {0}")]
    UnsupportedBytesPerPixel(i32),

    #[error("unsupported number of components: {0}")]
    UnsupportedComponents(i32),

    #[error("invalid dimensions: {width}x{height}")]
    Dimensions { width: u32, height: u32 },

    #[error("buffer holds {actual} bytes, layout requires {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// A flat run of component-packed pixel bytes with its declared layout.
///
/// Every pixel occupies `bytes_per_pixel` bytes, regardless of the number of components packed
/// into it. Rows are not padded.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    bytes: Buffer,
    width: u32,
    height: u32,
    bytes_per_pixel: u8,
    num_components: u8,
}

/// A multi-dimensional index of an image within its dataset.
///
/// Opaque to the display side; it is carried through conversions unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coords {
    axes: BTreeMap<String, u32>,
}

/// Per-image acquisition metadata.
///
/// Opaque to the display side; it is carried through conversions unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

/// An immutable acquired frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pixels: PixelBuffer,
    coords: Coords,
    metadata: Metadata,
}

/// Construct an image from raw bytes, validating the declared layout.
///
/// This is the factory the acquisition engine uses. The bytes are copied into freshly allocated,
/// aligned storage that the image owns exclusively.
pub fn create_image(
    buffer: &[u8],
    width: u32,
    height: u32,
    bytes_per_pixel: i32,
    num_components: i32,
    coords: Coords,
    metadata: Metadata,
) -> Result<Image, ImageError> {
    let bytes_per_pixel = match bytes_per_pixel {
        1 | 2 | 4 => bytes_per_pixel as u8,
        other => return Err(ImageError::UnsupportedBytesPerPixel(other)),
    };

    let num_components = match num_components {
        1 | 3 => num_components as u8,
        other => return Err(ImageError::UnsupportedComponents(other)),
    };

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|count| count.checked_mul(usize::from(bytes_per_pixel)))
        .ok_or(ImageError::Dimensions { width, height })?;

    if buffer.len() != expected {
        return Err(ImageError::BufferLength {
            expected,
            actual: buffer.len(),
        });
    }

    Ok(Image {
        pixels: PixelBuffer {
            bytes: Buffer::with_bytes(buffer),
            width,
            height,
            bytes_per_pixel,
            num_components,
        },
        coords,
        metadata,
    })
}

impl PixelBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.bytes_per_pixel
    }

    pub fn num_components(&self) -> u8 {
        self.num_components
    }

    /// The number of pixels, `width × height`.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Borrow the bytes without copying.
    ///
    /// The slice is aligned for reinterpretation as `u16` or `f32` samples.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_bytes()
    }

    /// Copy the bytes into an independently owned vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.as_bytes().to_vec()
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes_per_pixel", &self.bytes_per_pixel)
            .field("num_components", &self.num_components)
            .finish()
    }
}

impl Image {
    pub fn width(&self) -> u32 {
        self.pixels.width
    }

    pub fn height(&self) -> u32 {
        self.pixels.height
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.pixels.bytes_per_pixel
    }

    pub fn num_components(&self) -> u8 {
        self.pixels.num_components
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// An aliased view of the pixel bytes, valid as long as the image is borrowed.
    pub fn buffer(&self) -> &[u8] {
        self.pixels.as_bytes()
    }

    /// A defensive copy of the pixel bytes, safe to mutate.
    pub fn buffer_copy(&self) -> Vec<u8> {
        self.pixels.to_vec()
    }

    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl Coords {
    pub fn new() -> Self {
        Coords::default()
    }

    /// Set the index along an axis, replacing any previous value.
    pub fn with(mut self, axis: &str, index: u32) -> Self {
        self.axes.insert(axis.to_owned(), index);
        self
    }

    pub fn index(&self, axis: &str) -> Option<u32> {
        self.axes.get(axis).copied()
    }

    pub fn axes(&self) -> impl Iterator<Item = (&str, u32)> {
        self.axes.iter().map(|(axis, &index)| (axis.as_str(), index))
    }
}

impl Metadata {
    pub fn new() -> Self {
        Metadata::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_owned(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
