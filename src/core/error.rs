// Copyright @yucwang 2026

use crate::core::buffer::MemoryType;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Host heap or accelerator memory could not satisfy a buffer allocation.
    #[error("failed to allocate {bytes} bytes of {memory} memory for buffer '{name}'")]
    AllocationFailure {
        name: String,
        bytes: usize,
        memory: MemoryType,
    },

    #[error("buffer '{name}' needs {expected} source elements, got {actual}")]
    SourceSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("unsupported aperture shape: {0}")]
    UnsupportedApertureShape(String),

    #[error("invalid volume: {0}")]
    InvalidVolume(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("exr error: {0}")]
    Exr(#[from] exr::error::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
