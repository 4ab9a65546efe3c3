use std::sync::{Arc, Mutex};

use log::warn;

uniffi::setup_scaffolding!();

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BlurFacesError {
    #[error("failed to decode image: {message}")]
    DecodeError { message: String },
    #[error("image dimensions are zero")]
    ZeroDimensions,
    #[error("failed to render composited image: {message}")]
    RenderError { message: String },
    #[error("failed to encode image: {message}")]
    EncodeError { message: String },
    #[error("invalid blur sigma")]
    InvalidSigma,
    #[error("invalid quality value")]
    InvalidQuality,
    #[error("failed to load face detection model: {message}")]
    Model { message: String },
}

impl From<blurfaces::BlurFacesError> for BlurFacesError {
    fn from(e: blurfaces::BlurFacesError) -> Self {
        match e {
            blurfaces::BlurFacesError::DecodeError(msg) => {
                BlurFacesError::DecodeError { message: msg }
            }
            blurfaces::BlurFacesError::ZeroDimensions => BlurFacesError::ZeroDimensions,
            blurfaces::BlurFacesError::RenderError(msg) => {
                BlurFacesError::RenderError { message: msg }
            }
            blurfaces::BlurFacesError::EncodeError(msg) => {
                BlurFacesError::EncodeError { message: msg }
            }
            blurfaces::BlurFacesError::InvalidSigma(_) => BlurFacesError::InvalidSigma,
            blurfaces::BlurFacesError::InvalidQuality(_) => BlurFacesError::InvalidQuality,
            blurfaces::BlurFacesError::Model(msg) => BlurFacesError::Model { message: msg },
        }
    }
}

/// A rectangle in points or pixels.
#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct FaceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<blurfaces::NormalizedFaceBox> for FaceRect {
    fn from(b: blurfaces::NormalizedFaceBox) -> Self {
        FaceRect {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }
}

/// Which corner the host detector measures `y` from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum CoordinateOrigin {
    /// Core Image / CIDetector convention.
    BottomLeft,
    /// Vision (after flipping), ML Kit and most Android detectors.
    TopLeft,
}

/// Face detector implemented by the host app (Kotlin or Swift).
#[uniffi::export(with_foreign)]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major 8-bit grayscale buffer, in image pixels.
    fn detect(&self, gray: Vec<u8>, width: u32, height: u32) -> Vec<FaceRect>;
}

struct ForeignDetector {
    inner: Arc<dyn FaceDetector>,
    origin: CoordinateOrigin,
}

impl blurfaces::FaceDetector for ForeignDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<blurfaces::FaceBox> {
        self.inner
            .detect(gray.to_vec(), width, height)
            .into_iter()
            .map(|r| match self.origin {
                CoordinateOrigin::BottomLeft => blurfaces::FaceBox::new(r.x, r.y, r.width, r.height),
                CoordinateOrigin::TopLeft => {
                    blurfaces::FaceBox::from_top_left(r.x, r.y, r.width, r.height, height as f64)
                }
            })
            .collect()
    }
}

fn build_service(
    detector: Arc<dyn FaceDetector>,
    origin: CoordinateOrigin,
    blur_sigma: Option<f32>,
) -> blurfaces::FaceBlurService {
    let service = blurfaces::FaceBlurService::new(Box::new(ForeignDetector {
        inner: detector,
        origin,
    }));
    match blur_sigma {
        Some(sigma) => service.blur_sigma(sigma),
        None => service,
    }
}

fn encode_png(image: &blurfaces::Image) -> Option<Vec<u8>> {
    image
        .encode(blurfaces::OutputFormat::Png, 1.0)
        .map_err(|e| warn!("encoding result failed: {e}"))
        .ok()
}

#[derive(uniffi::Object)]
pub struct FaceBlurService {
    inner: blurfaces::FaceBlurService,
}

#[uniffi::export]
impl FaceBlurService {
    /// `blur_sigma` of `None` keeps the default of 30.
    #[uniffi::constructor]
    pub fn new(
        detector: Arc<dyn FaceDetector>,
        origin: CoordinateOrigin,
        blur_sigma: Option<f32>,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: build_service(detector, origin, blur_sigma),
        })
    }

    /// Face rectangles normalized to a `dest_width` × `dest_height` view,
    /// top-left origin. Empty if the image cannot be read.
    pub fn get_face_rects(&self, input: Vec<u8>, dest_width: f64, dest_height: f64) -> Vec<FaceRect> {
        self.inner
            .face_rects(&input, blurfaces::Size::new(dest_width, dest_height))
            .into_iter()
            .map(FaceRect::from)
            .collect()
    }

    /// PNG of the image with every face blurred, or nothing on failure.
    pub fn blur_faces(&self, input: Vec<u8>) -> Option<Vec<u8>> {
        let blurred = self.inner.blur_faces(&input)?;
        encode_png(&blurred)
    }

    /// Like `blur_faces`, reporting why it failed.
    pub fn try_blur_faces(&self, input: Vec<u8>) -> Result<Vec<u8>, BlurFacesError> {
        let blurred = self.inner.try_blur_faces(&input)?;
        Ok(blurred.encode(blurfaces::OutputFormat::Png, 1.0)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum DisplayMode {
    Blurred,
    FaceBoxes,
}

impl From<blurfaces::DisplayMode> for DisplayMode {
    fn from(mode: blurfaces::DisplayMode) -> Self {
        match mode {
            blurfaces::DisplayMode::Blurred => DisplayMode::Blurred,
            blurfaces::DisplayMode::FaceBoxes => DisplayMode::FaceBoxes,
        }
    }
}

/// What the image view should show. Images are PNG-encoded; an image that
/// fails to encode is `None` while the face boxes are still reported.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum Frame {
    Empty,
    FaceBoxes {
        image: Option<Vec<u8>>,
        boxes: Vec<FaceRect>,
    },
    Blurred {
        image: Option<Vec<u8>>,
    },
}

impl From<blurfaces::Frame> for Frame {
    fn from(frame: blurfaces::Frame) -> Self {
        match frame {
            blurfaces::Frame::Empty => Frame::Empty,
            blurfaces::Frame::FaceBoxes { image, boxes } => Frame::FaceBoxes {
                image: encode_png(&image),
                boxes: boxes.into_iter().map(FaceRect::from).collect(),
            },
            blurfaces::Frame::Blurred(image) => Frame::Blurred {
                image: image.as_ref().and_then(encode_png),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct ViewSize {
    pub width: f64,
    pub height: f64,
}

#[derive(uniffi::Object)]
pub struct InteractionController {
    inner: Mutex<blurfaces::InteractionController>,
}

impl InteractionController {
    fn with<T>(&self, f: impl FnOnce(&mut blurfaces::InteractionController) -> T) -> T {
        // Poisoned only if a previous render panicked
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

#[uniffi::export]
impl InteractionController {
    #[uniffi::constructor]
    pub fn new(
        detector: Arc<dyn FaceDetector>,
        origin: CoordinateOrigin,
        view_width: f64,
        blur_sigma: Option<f32>,
    ) -> Arc<Self> {
        let service = build_service(detector, origin, blur_sigma);
        Arc::new(Self {
            inner: Mutex::new(blurfaces::InteractionController::new(service, view_width)),
        })
    }

    pub fn pick_image(&self, input: Vec<u8>) -> Frame {
        self.with(|c| c.pick_image(&input)).into()
    }

    pub fn toggle_mode(&self) -> Frame {
        self.with(|c| c.toggle_mode()).into()
    }

    pub fn set_view_width(&self, width: f64) -> Frame {
        self.with(|c| c.set_view_width(width)).into()
    }

    pub fn render(&self) -> Frame {
        self.with(|c| c.render()).into()
    }

    pub fn mode(&self) -> DisplayMode {
        self.with(|c| c.mode()).into()
    }

    /// Title for the mode toggle button.
    pub fn action_label(&self) -> String {
        self.with(|c| c.action_label().to_string())
    }

    /// Image view size to lay out so face rectangles line up.
    pub fn display_size(&self) -> ViewSize {
        let size = self.with(|c| c.display_size());
        ViewSize {
            width: size.width,
            height: size.height,
        }
    }
}
