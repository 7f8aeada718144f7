use std::sync::Arc;

use ndarray::ArrayView3;

/// EXIF-style orientation tag carried alongside the pixel data.
///
/// Detectors read pixels in buffer order and use the tag to know how the
/// buffer relates to the upright scene; no pixels are ever rotated here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    Left,
    LeftMirrored,
    Right,
    RightMirrored,
}

impl Orientation {
    pub fn is_mirrored(self) -> bool {
        matches!(
            self,
            Orientation::UpMirrored
                | Orientation::DownMirrored
                | Orientation::LeftMirrored
                | Orientation::RightMirrored
        )
    }

    /// Toggles horizontal mirroring while keeping the rotation.
    pub fn mirrored(self) -> Self {
        match self {
            Orientation::Up => Orientation::UpMirrored,
            Orientation::UpMirrored => Orientation::Up,
            Orientation::Down => Orientation::DownMirrored,
            Orientation::DownMirrored => Orientation::Down,
            Orientation::Left => Orientation::LeftMirrored,
            Orientation::LeftMirrored => Orientation::Left,
            Orientation::Right => Orientation::RightMirrored,
            Orientation::RightMirrored => Orientation::Right,
        }
    }
}

/// A single captured frame: immutable row-major pixel bytes plus metadata.
///
/// Pixel data sits behind an `Arc`, so re-tagging the orientation or handing
/// the frame to another thread never copies the buffer.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    orientation: Orientation,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        Self::from_shared(data.into(), width, height, channels, index)
    }

    /// Wraps a buffer that other frames may already share, without copying.
    pub fn from_shared(
        data: Arc<[u8]>,
        width: u32,
        height: u32,
        channels: u8,
        index: usize,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            orientation: Orientation::Up,
        }
    }

    /// Same pixels, new orientation tag.
    pub fn oriented(self, orientation: Orientation) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data[..])
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
