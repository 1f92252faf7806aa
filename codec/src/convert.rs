//! The conversions between images and processors.
//!
//! All of these are pure functions over their arguments and may be called concurrently from any
//! number of acquisition threads.
use std::borrow::Cow;

use bytemuck::Pod;
use mmdisplay_pixels::{create_image, Coords, Image, Metadata};

use crate::error::CodecError;
use crate::processor::{Processor, ProcessorPixels, ProcessorVariant};
use crate::shift;

/// Whether a processor may borrow the pixels of its source image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CopyPolicy {
    /// Borrow the image's bytes where the layouts agree.
    Alias,
    /// Always copy into storage owned by the processor.
    #[default]
    Copy,
}

/// A processor handed over by the display engine.
///
/// The engine may hold containers this crate has no mapping for; those report `None`.
pub trait ProcessorSource {
    /// The engine's name for the container type, used in diagnostics.
    fn type_name(&self) -> &str;

    fn processor(&self) -> Option<Processor<'_>>;
}

/// The kind of buffer the acquisition side stores pixels in.
const BUFFER_KIND: &str = "u8";

/// Convert an image into the processor matching its layout.
///
/// Packed colors are always copied since their byte order differs. For the grayscale layouts
/// `policy` decides between borrowing the image's bytes and copying them.
pub fn to_processor(image: &Image, policy: CopyPolicy) -> Result<Processor<'_>, CodecError> {
    let variant = ProcessorVariant::for_layout(image.bytes_per_pixel(), image.num_components())
        .ok_or_else(|| unsupported(image))?;

    let bytes = image.buffer();
    let pixels = match variant {
        ProcessorVariant::Mono8 => ProcessorPixels::Mono8(match policy {
            CopyPolicy::Alias => Cow::Borrowed(bytes),
            CopyPolicy::Copy => Cow::Owned(image.buffer_copy()),
        }),
        ProcessorVariant::Mono16 => ProcessorPixels::Mono16(samples(bytes, policy)),
        ProcessorVariant::MonoFloat32 => ProcessorPixels::MonoFloat32(samples(bytes, policy)),
        ProcessorVariant::PackedColor32 => ProcessorPixels::PackedColor32(shift::pack_rgb32(bytes)),
    };

    Processor::new(image.width(), image.height(), pixels)
}

/// Convert an image into an independently owned processor.
///
/// The caller can never modify the image's pixels through the result.
pub fn to_processor_copied(image: &Image) -> Result<Processor<'static>, CodecError> {
    to_processor(image, CopyPolicy::Copy).map(Processor::into_owned)
}

/// Convert one color component of an image into an 8-bit processor.
///
/// Single component images convert as a whole and ignore `component`. Of the multi-component
/// layouts only 4-byte colors are supported, with `component` one of `0`, `1` or `2`, counted
/// within each pixel's bytes as stored by the acquisition side.
pub fn to_processor_single_component(
    image: &Image,
    component: usize,
) -> Result<Processor<'static>, CodecError> {
    if image.num_components() == 1 {
        return to_processor_copied(image);
    }

    if (image.bytes_per_pixel(), image.num_components()) != (4, 3) || component >= 3 {
        return Err(unsupported(image));
    }

    let pixels = shift::single_component(image.buffer(), component);
    Processor::new(
        image.width(),
        image.height(),
        ProcessorPixels::Mono8(Cow::Owned(pixels)),
    )
}

/// Convert a processor back into an image.
///
/// Grayscale samples pass through unchanged. Packed colors undergo the inverse byte shift, which
/// zeroes the final byte of the result.
pub fn from_processor(
    processor: &Processor<'_>,
    coords: Coords,
    metadata: Metadata,
) -> Result<Image, CodecError> {
    let (bytes_per_pixel, num_components) = processor.variant().layout();

    let unshifted;
    let bytes: &[u8] = match processor.pixels() {
        ProcessorPixels::Mono8(px) => &**px,
        ProcessorPixels::Mono16(px) => bytemuck::cast_slice(&**px),
        ProcessorPixels::MonoFloat32(px) => bytemuck::cast_slice(&**px),
        ProcessorPixels::PackedColor32(px) => {
            unshifted = shift::unpack_rgb32(px);
            &unshifted
        }
    };

    let image = create_image(
        bytes,
        processor.width(),
        processor.height(),
        bytes_per_pixel.into(),
        num_components.into(),
        coords,
        metadata,
    )?;

    Ok(image)
}

/// Convert an engine-provided processor back into an image.
///
/// Fails for container types without a known acquisition layout instead of building an image
/// with an invalid layout.
pub fn image_from_source(
    source: &dyn ProcessorSource,
    coords: Coords,
    metadata: Metadata,
) -> Result<Image, CodecError> {
    match source.processor() {
        Some(processor) => from_processor(&processor, coords, metadata),
        None => {
            let type_name = source.type_name().to_owned();
            log::error!("Unrecognized processor type {type_name}");
            Err(CodecError::UnrecognizedProcessorType(type_name))
        }
    }
}

impl ProcessorSource for Processor<'_> {
    fn type_name(&self) -> &str {
        match self.variant() {
            ProcessorVariant::Mono8 => "Mono8",
            ProcessorVariant::Mono16 => "Mono16",
            ProcessorVariant::MonoFloat32 => "MonoFloat32",
            ProcessorVariant::PackedColor32 => "PackedColor32",
        }
    }

    fn processor(&self) -> Option<Processor<'_>> {
        Some(self.view())
    }
}

/// Reinterpret native-endian bytes as samples.
///
/// Image storage is aligned for every sample type, so aliasing does not fall back to copying in
/// practice. It still does when handed an unaligned slice.
fn samples<T: Pod>(bytes: &[u8], policy: CopyPolicy) -> Cow<'_, [T]> {
    match policy {
        CopyPolicy::Alias => match bytemuck::try_cast_slice(bytes) {
            Ok(samples) => Cow::Borrowed(samples),
            Err(_) => Cow::Owned(bytemuck::pod_collect_to_vec(bytes)),
        },
        CopyPolicy::Copy => Cow::Owned(bytemuck::pod_collect_to_vec(bytes)),
    }
}

fn unsupported(image: &Image) -> CodecError {
    let err = CodecError::UnsupportedLayout {
        bytes_per_pixel: image.bytes_per_pixel(),
        num_components: image.num_components(),
        buffer_kind: BUFFER_KIND,
    };

    log::error!("{err}");
    err
}
