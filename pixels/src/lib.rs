// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `mmdisplay` developers
//! # Pixels
//!
//! The acquisition-side pixel model: component-packed byte buffers and the images that own them.
//!
//! An [`Image`] is produced by the acquisition pipeline and is immutable afterwards. Its pixels
//! are a flat run of bytes described by a width, a height, the number of bytes per pixel and the
//! number of color components packed into them. Only four combinations are understood by the
//! display side, but the acquisition side accepts every pairing of `{1, 2, 4}` bytes with
//! `{1, 3}` components.
//!
//! ## Usage
//!
//! ```
//! use mmdisplay_pixels::{create_image, Coords, Metadata};
//!
//! let pixels = [0u8, 1, 2, 3, 4, 5];
//! let image = create_image(&pixels, 3, 2, 1, 1, Coords::new().with("time", 4), Metadata::new())?;
//!
//! // Borrow the bytes without copying, or take an independent copy.
//! assert_eq!(image.buffer(), &pixels);
//! let mut copy = image.buffer_copy();
//! copy[0] = 0xff;
//! assert_eq!(image.buffer()[0], 0);
//! # Ok::<(), mmdisplay_pixels::ImageError>(())
//! ```
#![deny(unsafe_code)]

mod buf;
mod image;

pub use self::buf::Buffer;
pub use self::image::{create_image, Coords, Image, ImageError, Metadata, PixelBuffer};
