// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `mmdisplay` developers
//! # Codec
//!
//! Translates acquisition [`Image`]s into the display engine's native [`Processor`]s and back.
//!
//! Exactly four layouts are understood, identified by bytes per pixel and number of components:
//!
//! | bytes | components | processor |
//! |-------|------------|-----------|
//! | 1     | 1          | [`ProcessorVariant::Mono8`] |
//! | 2     | 1          | [`ProcessorVariant::Mono16`] |
//! | 4     | 1          | [`ProcessorVariant::MonoFloat32`] |
//! | 4     | 3          | [`ProcessorVariant::PackedColor32`] |
//!
//! Every other combination fails with [`CodecError::UnsupportedLayout`]. The color layout differs
//! between the two sides by a single byte: the acquisition buffer is shifted by one byte across the
//! whole buffer, then packed big-endian. That shift is lossy at the buffer boundary, the last byte
//! of the acquisition buffer does not survive a round trip.
//!
//! ## Usage
//!
//! ```
//! use mmdisplay_codec::{from_processor, to_processor, CopyPolicy, ProcessorVariant};
//! use mmdisplay_pixels::{create_image, Coords, Metadata};
//!
//! let image = create_image(&[1, 2, 3, 4], 2, 1, 2, 1, Coords::new(), Metadata::new())?;
//!
//! // No copy, the processor borrows from `image`.
//! let processor = to_processor(&image, CopyPolicy::Alias)?;
//! assert_eq!(processor.variant(), ProcessorVariant::Mono16);
//! assert!(processor.is_borrowed());
//!
//! let back = from_processor(&processor, image.coords().clone(), image.metadata().clone())?;
//! assert_eq!(back, image);
//! # Ok::<(), mmdisplay_codec::CodecError>(())
//! ```
#![deny(unsafe_code)]

mod convert;
mod error;
mod processor;
/// The byte-plane shift between acquisition and display color layouts.
mod shift;

pub use self::convert::{
    from_processor, image_from_source, to_processor, to_processor_copied,
    to_processor_single_component, CopyPolicy, ProcessorSource,
};
pub use self::error::CodecError;
pub use self::processor::{Processor, ProcessorPixels, ProcessorVariant, Sample};
