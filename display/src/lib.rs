// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `mmdisplay` developers
//! # Display
//!
//! Keeps a multi-channel composite image in sync with an acquisition that produces frames
//! concurrently.
//!
//! All mutations of displayed pixels, look-up tables and dimension counters happen on a single
//! rendering thread, see [`RenderThread`]. The [`CompositeDisplayController`] wraps a host composite
//! image and serializes its operations. It also detaches the process-wide
//! [`ContrastAdjusterSlot`] while frames are recomputed, since an installed contrast adjuster
//! would otherwise request another recompute from within the first one.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use mmdisplay::{
//!     CompositeDisplayController, CompositeImage, CompositeMode, DisplayConfig, DisplayServices,
//!     Dimensions, OwnerFlag, RenderThread,
//! };
//!
//! let config = DisplayConfig::default();
//! let render = Arc::new(RenderThread::spawn(&config.render.thread_name)?);
//! let owner = Arc::new(OwnerFlag::new());
//! let services = DisplayServices::new(owner.clone(), render.clone());
//!
//! let host = CompositeImage::new(Dimensions::new(2, 1, 1), CompositeMode::Composite, services.adjuster.clone());
//! let display = CompositeDisplayController::new("Snap", host, services, config.codec.copy_policy.into());
//!
//! let shown = display.clone();
//! render.run_and_wait(move || shown.update_and_draw())?;
//! assert_eq!(display.pixels_generation(), 1);
//!
//! owner.close();
//! # Ok::<(), mmdisplay::DisplayError>(())
//! ```
#![deny(unsafe_code)]

mod canvas;
mod composite;
pub mod config;
mod controller;
mod error;
mod executor;
mod lut;
mod singleton;

pub use self::canvas::{Canvas, DisplayOwner, ImageListener, OwnerFlag};
pub use self::composite::{CompositeHost, CompositeImage, Dimensions};
pub use self::config::{ConfigError, DisplayConfig};
pub use self::controller::{CompositeDisplayController, DisplayServices, Phase};
pub use self::error::{DisplayError, SlotError};
pub use self::executor::{RenderExecutor, RenderThread, Task};
pub use self::lut::{CompositeMode, Lut};
pub use self::singleton::{AdjusterHandle, ContrastAdjuster, ContrastAdjusterSlot, DetachedAdjuster};
