use mmdisplay_pixels::ImageError;

/// Failures of a conversion.
///
/// Each of these is logged where it is detected; the caller treats it as "this frame can not be
/// shown" and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error(
        "unknown image format with {bytes_per_pixel} bytes per pixel, {num_components} components, and pixel type {buffer_kind}"
    )]
    UnsupportedLayout {
        bytes_per_pixel: u8,
        num_components: u8,
        buffer_kind: &'static str,
    },

    #[error("unrecognized processor type {0}")]
    UnrecognizedProcessorType(String),

    #[error("processor of {width}x{height} holds {actual} samples")]
    SampleCount {
        width: u32,
        height: u32,
        actual: usize,
    },

    #[error(transparent)]
    Image(#[from] ImageError),
}
