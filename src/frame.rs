//! Camera frames as handed to the pipeline.

use std::sync::Arc;

use image::{GrayImage, Luma};
use nalgebra::Matrix3;
use thiserror::Error;

use crate::geometry::Orientation;

/// Errors raised while wrapping a raw pixel buffer into a [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("bytes per row {bytes_per_row} is smaller than width {width} x 4")]
    StrideTooSmall { width: usize, bytes_per_row: usize },
    #[error("pixel buffer holds {got} bytes, expected at least {expected}")]
    BufferTooShort { expected: usize, got: usize },
    #[error("frame dimensions {width}x{height} overflow the addressable buffer size")]
    DimensionsOverflow { width: usize, height: usize },
}

/// Pinhole camera intrinsics, passed through to detection engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics(pub Matrix3<f32>);

impl CameraIntrinsics {
    /// Build from a column-major 3x3 blob, the layout capture devices attach
    /// to their sample buffers.
    pub fn from_column_major(values: &[f32; 9]) -> Self {
        Self(Matrix3::from_column_slice(values))
    }

    pub fn fx(&self) -> f32 {
        self.0[(0, 0)]
    }

    pub fn fy(&self) -> f32 {
        self.0[(1, 1)]
    }

    pub fn cx(&self) -> f32 {
        self.0[(0, 2)]
    }

    pub fn cy(&self) -> f32 {
        self.0[(1, 2)]
    }
}

/// One frame from the camera: luma pixels plus the metadata captured with it.
///
/// The pixel buffer sits behind an `Arc` so a frame can be handed to a worker
/// thread without copying the image.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Arrival order, strictly increasing per source.
    pub sequence: u64,
    /// Luma image.
    pub luma: Arc<GrayImage>,
    /// Orientation at the moment the frame was handed over.
    pub orientation: Orientation,
    /// Optional camera intrinsics, opaque to the core.
    pub intrinsics: Option<CameraIntrinsics>,
}

impl Frame {
    pub fn new(sequence: u64, luma: GrayImage, orientation: Orientation) -> Self {
        Self {
            sequence,
            luma: Arc::new(luma),
            orientation,
            intrinsics: None,
        }
    }

    /// Wrap a tightly packed 32-bit BGRA buffer.
    pub fn from_bgra(
        sequence: u64,
        bytes: &[u8],
        width: usize,
        height: usize,
        orientation: Orientation,
    ) -> Result<Self, FrameError> {
        let bytes_per_row = width
            .checked_mul(4)
            .ok_or(FrameError::DimensionsOverflow { width, height })?;
        Self::from_bgra_with_stride(sequence, bytes, width, height, bytes_per_row, orientation)
    }

    /// Wrap a 32-bit BGRA buffer whose rows are `bytes_per_row` apart.
    ///
    /// Platform pixel buffers pad rows for alignment; the padding is ignored.
    pub fn from_bgra_with_stride(
        sequence: u64,
        bytes: &[u8],
        width: usize,
        height: usize,
        bytes_per_row: usize,
        orientation: Orientation,
    ) -> Result<Self, FrameError> {
        let overflow = FrameError::DimensionsOverflow { width, height };
        let row_bytes = width.checked_mul(4).ok_or(overflow.clone())?;
        if bytes_per_row < row_bytes {
            return Err(FrameError::StrideTooSmall {
                width,
                bytes_per_row,
            });
        }
        let expected = match height.checked_sub(1) {
            None => 0,
            Some(last_row) => bytes_per_row
                .checked_mul(last_row)
                .and_then(|offset| offset.checked_add(row_bytes))
                .ok_or(overflow.clone())?,
        };
        if bytes.len() < expected {
            return Err(FrameError::BufferTooShort {
                expected,
                got: bytes.len(),
            });
        }
        let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => return Err(overflow),
        };

        // Every offset below is at most `expected - 1`, checked above.
        let luma = GrayImage::from_fn(w, h, |col, row| {
            let offset = row as usize * bytes_per_row + col as usize * 4;
            Luma([bgra_to_luma(bytes[offset], bytes[offset + 1], bytes[offset + 2])])
        });
        Ok(Self::new(sequence, luma, orientation))
    }

    pub fn with_intrinsics(mut self, intrinsics: CameraIntrinsics) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.luma.width() as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.luma.height() as usize
    }

    /// True when the frame carries no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.luma.width() == 0 || self.luma.height() == 0
    }
}

/// BT.601 luma from 8-bit blue, green, red.
#[inline]
fn bgra_to_luma(b: u8, g: u8, r: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Source of frames, e.g. a camera session or a recorded sequence.
pub trait FrameSource {
    /// Next frame, or `None` when the source is exhausted.
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<I: Iterator<Item = Frame>> FrameSource for I {
    fn next_frame(&mut self) -> Option<Frame> {
        self.next()
    }
}
