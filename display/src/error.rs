use mmdisplay_codec::CodecError;

use crate::config::ConfigError;

/// Errors of display operations.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// The rendering thread has shut down and accepts no more tasks.
    #[error("the rendering thread is no longer running")]
    RenderThreadGone,

    #[error("failed to spawn the rendering thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("channel {channel} out of range for {channels} channels")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("{channels} channels x {slices} slices x {frames} frames does not make a stack of {stack_size}")]
    DimensionMismatch {
        channels: usize,
        slices: usize,
        frames: usize,
        stack_size: usize,
    },

    #[error("processor is {actual_width}x{actual_height}, display is {width}x{height}")]
    FrameSize {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure to access the contrast adjuster instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("contrast adjuster instance is inaccessible, a previous access panicked")]
    Poisoned,
}
