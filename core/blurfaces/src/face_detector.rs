/// Bounding box of a detected face, as reported by a [`FaceDetector`].
///
/// Coordinates are in image pixels with the origin at the **bottom-left**
/// corner of the (orientation-corrected) image, y growing upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    /// X coordinate of the left edge.
    pub x: f64,
    /// Y coordinate of the bottom edge.
    pub y: f64,
    /// Width of the box.
    pub width: f64,
    /// Height of the box.
    pub height: f64,
}

impl FaceBox {
    /// Create a box from its bottom-left corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert a top-left-origin box (as most detectors report) into the
    /// bottom-left convention for an image of `image_height` rows.
    pub fn from_top_left(x: f64, y: f64, width: f64, height: f64, image_height: f64) -> Self {
        Self::new(x, image_height - (y + height), width, height)
    }

    /// Left edge.
    pub fn min_x(&self) -> f64 {
        self.x
    }

    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn min_y(&self) -> f64 {
        self.y
    }

    /// Top edge.
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Grow (negative `dx`/`dy`) or shrink the box symmetrically.
    pub fn inset_by(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a face detector (rustface, a platform
/// detector bridged through FFI, an ONNX model, ...) and pass it to
/// [`crate::FaceBlurService::new`].
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    ///
    /// Returned boxes use the bottom-left origin described on [`FaceBox`].
    /// An empty vector means no faces were found.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBox>;
}
