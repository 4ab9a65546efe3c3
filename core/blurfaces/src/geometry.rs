use crate::face_detector::FaceBox;

/// Width and height of a destination rectangle (a view, a canvas, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    /// Width in destination units (points, pixels, ...).
    pub width: f64,
    /// Height in destination units.
    pub height: f64,
}

impl Size {
    /// Create a size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a view `width` wide whose height follows the aspect ratio of
    /// a `source_width` × `source_height` image.
    pub fn fit_width(width: f64, source_width: u32, source_height: u32) -> Self {
        if source_width == 0 || source_height == 0 {
            return Self::new(width, 0.0);
        }
        let ratio = source_width as f64 / source_height as f64;
        Self::new(width, width / ratio)
    }
}

/// A detected face expressed in a destination rectangle's coordinate space:
/// origin at the **top-left**, scaled to the destination size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedFaceBox {
    /// X coordinate of the left edge.
    pub x: f64,
    /// Y coordinate of the top edge.
    pub y: f64,
    /// Width of the box.
    pub width: f64,
    /// Height of the box.
    pub height: f64,
}

/// Re-express `face` (bottom-left origin, image pixels) in the top-left-origin
/// space of `destination`, for an image of `image_width` × `image_height`.
pub fn normalize_face_box(
    face: &FaceBox,
    image_width: u32,
    image_height: u32,
    destination: Size,
) -> NormalizedFaceBox {
    let scale_x = destination.width / image_width as f64;
    let scale_y = destination.height / image_height as f64;

    NormalizedFaceBox {
        x: face.min_x() * scale_x,
        y: destination.height - face.max_y() * scale_y,
        width: face.width * scale_x,
        height: face.height * scale_y,
    }
}

/// Integer pixel rectangle, top-left origin, used for crops and mask bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a rectangle from its top-left corner and size.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` × `height` image.
    pub fn extent(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// True if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if this rectangle lies entirely within `width` × `height`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }

    /// Pixel bounds touched by `face` in an image of `width` × `height`,
    /// clipped to the image. Returns `None` when nothing overlaps.
    pub fn covering(face: &FaceBox, width: u32, height: u32) -> Option<Self> {
        let (w, h) = (width as f64, height as f64);
        let left = face.min_x().floor().clamp(0.0, w);
        let right = face.max_x().ceil().clamp(0.0, w);
        // Flip to top-left rows
        let top = (h - face.max_y()).floor().clamp(0.0, h);
        let bottom = (h - face.min_y()).ceil().clamp(0.0, h);

        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}
