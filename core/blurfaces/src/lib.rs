//! Face detection and face blurring for photos.
//!
//! Detection and the image filters are pluggable: bring any [`FaceDetector`]
//! (or enable the `rustface` feature) and optionally an
//! [`ImageFilterEngine`]. The default engine runs on the CPU.
//!
//! # Example
//!
//! ```no_run
//! use blurfaces::{FaceBlurService, FaceBox, FaceDetector, OutputFormat, Size};
//!
//! struct MyDetector;
//! impl FaceDetector for MyDetector {
//!     fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBox> {
//!         vec![]
//!     }
//! }
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let service = FaceBlurService::new(Box::new(MyDetector));
//!
//! let boxes = service.face_rects(&bytes, Size::new(375.0, 500.0));
//! println!("{} face(s)", boxes.len());
//!
//! if let Some(blurred) = service.blur_faces(&bytes) {
//!     let png = blurred.encode(OutputFormat::Png, 1.0).unwrap();
//!     std::fs::write("blurred.png", png).unwrap();
//! }
//! ```
#![warn(missing_docs)]

/// Pick-photo / toggle-mode display state.
pub mod controller;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
/// Primitive image filters and the default CPU engine.
pub mod filter;
mod geometry;
mod photo;
mod pipeline;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;

use log::warn;

/// Display state types.
pub use controller::{DisplayMode, Frame, InteractionController};
/// Error type returned by blurfaces operations.
pub use error::BlurFacesError;
/// Face detection trait and face bounding-box type.
pub use face_detector::{FaceBox, FaceDetector};
/// Filter engine trait, default engine and mask types.
pub use filter::{ImageFilterEngine, MaskCanvas, RadialGradient, RasterFilterEngine};
/// Destination sizes and normalized boxes.
pub use geometry::{normalize_face_box, NormalizedFaceBox, PixelRect, Size};
/// Decoded image with orientation, and output formats.
pub use photo::{Image, OutputFormat};
#[cfg(feature = "rustface")]
/// Built-in detector that loads a SeetaFace model.
pub use rustface_backend::RustfaceDetector;

/// Gaussian blur standard deviation applied to face regions, in pixels.
pub const DEFAULT_BLUR_SIGMA: f32 = 30.0;

/// Largest accepted blur sigma. The blur pads the image by `ceil(3σ)` on each
/// side, so larger values would allocate without bound.
pub const MAX_BLUR_SIGMA: f32 = 1000.0;

/// Detects faces and blurs them.
///
/// Every call is a self-contained pipeline: nothing is cached between calls,
/// so [`face_rects`](Self::face_rects) and [`blur_faces`](Self::blur_faces)
/// on the same image each run the detector.
pub struct FaceBlurService {
    detector: Box<dyn FaceDetector>,
    engine: Box<dyn ImageFilterEngine>,
    blur_sigma: f32,
}

impl FaceBlurService {
    /// Create a service around `detector`, using [`RasterFilterEngine`] and
    /// [`DEFAULT_BLUR_SIGMA`].
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector,
            engine: Box::new(RasterFilterEngine::new()),
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }

    /// Replace the filter engine.
    pub fn filter_engine(mut self, engine: Box<dyn ImageFilterEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Set the blur strength (default: 30.0). Must be finite, > 0 and at most
    /// [`MAX_BLUR_SIGMA`]; checked when a blur runs.
    pub fn blur_sigma(mut self, sigma: f32) -> Self {
        self.blur_sigma = sigma;
        self
    }

    /// The detector this service runs.
    pub fn detector(&self) -> &dyn FaceDetector {
        self.detector.as_ref()
    }

    /// Current blur strength.
    pub fn sigma(&self) -> f32 {
        self.blur_sigma
    }

    /// Face boxes of a decoded image, normalized to `destination`.
    pub fn detect_faces(&self, image: &Image, destination: Size) -> Vec<NormalizedFaceBox> {
        pipeline::detect_pipeline(image, destination, self.detector.as_ref())
    }

    /// Decode `input` and return its face boxes normalized to `destination`.
    pub fn try_face_rects(
        &self,
        input: &[u8],
        destination: Size,
    ) -> Result<Vec<NormalizedFaceBox>, BlurFacesError> {
        let image = Image::decode(input)?;
        Ok(self.detect_faces(&image, destination))
    }

    /// Like [`try_face_rects`](Self::try_face_rects), but an undecodable
    /// input yields no boxes instead of an error.
    pub fn face_rects(&self, input: &[u8], destination: Size) -> Vec<NormalizedFaceBox> {
        self.try_face_rects(input, destination).unwrap_or_else(|e| {
            warn!("face detection skipped: {e}");
            Vec::new()
        })
    }

    /// Blur every detected face of a decoded image.
    ///
    /// The result is upright and has the oriented image's extent.
    pub fn blur_image(&self, image: &Image) -> Result<Image, BlurFacesError> {
        pipeline::blur_pipeline(
            image,
            self.blur_sigma,
            self.detector.as_ref(),
            self.engine.as_ref(),
        )
    }

    /// Decode `input` and blur every detected face.
    pub fn try_blur_faces(&self, input: &[u8]) -> Result<Image, BlurFacesError> {
        let image = Image::decode(input)?;
        self.blur_image(&image)
    }

    /// Like [`try_blur_faces`](Self::try_blur_faces), but any failure yields
    /// `None`.
    pub fn blur_faces(&self, input: &[u8]) -> Option<Image> {
        self.try_blur_faces(input)
            .map_err(|e| warn!("face blur produced no result: {e}"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageEncoder;

    struct FixedDetector(Vec<FaceBox>);

    impl FaceDetector for FixedDetector {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBox> {
            self.0.clone()
        }
    }

    fn make_test_png(width: u32, height: u32) -> Vec<u8> {
        use image::codecs::png::PngEncoder;
        use image::RgbImage;

        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        let mut buffer = Vec::new();
        let encoder = PngEncoder::new(&mut buffer);
        encoder
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        buffer
    }

    fn service_with(faces: Vec<FaceBox>) -> FaceBlurService {
        FaceBlurService::new(Box::new(FixedDetector(faces)))
    }

    #[test]
    fn builder_defaults() {
        let service = service_with(Vec::new());
        assert_eq!(service.sigma(), DEFAULT_BLUR_SIGMA);
    }

    #[test]
    fn builder_overrides_sigma() {
        let service = service_with(Vec::new()).blur_sigma(4.5);
        assert_eq!(service.sigma(), 4.5);
    }

    #[test]
    fn face_rects_scenario() {
        let service = service_with(vec![FaceBox::new(400.0, 400.0, 200.0, 200.0)]);
        let rects = service.face_rects(&make_test_png(1000, 1000), Size::new(500.0, 500.0));
        assert_eq!(
            rects,
            vec![NormalizedFaceBox {
                x: 200.0,
                y: 200.0,
                width: 100.0,
                height: 100.0,
            }]
        );
    }

    #[test]
    fn invalid_input_fails_soft() {
        let service = service_with(vec![FaceBox::new(0.0, 0.0, 10.0, 10.0)]);
        assert!(service
            .face_rects(b"not an image", Size::new(10.0, 10.0))
            .is_empty());
        assert!(service.blur_faces(b"not an image").is_none());
    }

    #[test]
    fn invalid_input_typed_errors() {
        let service = service_with(Vec::new());
        let err = service.try_blur_faces(b"not an image").unwrap_err();
        assert!(err.is_decode_failure());
        let err = service
            .try_face_rects(b"not an image", Size::new(1.0, 1.0))
            .unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn huge_sigma_is_an_error_not_a_panic() {
        let service = service_with(Vec::new()).blur_sigma(1.0e9);
        let image = Image::from_rgba(image::RgbaImage::new(4, 4));
        assert!(matches!(
            service.blur_image(&image),
            Err(BlurFacesError::InvalidSigma(_))
        ));
        assert!(service.blur_faces(&make_test_png(4, 4)).is_none());
    }

    #[test]
    fn invalid_sigma_fails_soft() {
        let service = service_with(Vec::new()).blur_sigma(0.0);
        let png = make_test_png(16, 16);
        assert!(matches!(
            service.try_blur_faces(&png),
            Err(BlurFacesError::InvalidSigma(_))
        ));
        assert!(service.blur_faces(&png).is_none());
    }

    #[test]
    fn blur_keeps_extent() {
        let service = service_with(vec![FaceBox::new(20.0, 30.0, 40.0, 40.0)]).blur_sigma(3.0);
        let blurred = service.blur_faces(&make_test_png(100, 80)).unwrap();
        assert_eq!((blurred.width(), blurred.height()), (100, 80));
    }
}
