use log::debug;

use crate::error::BlurFacesError;
use crate::face_detector::{FaceBox, FaceDetector};
use crate::filter::{ImageFilterEngine, MaskCanvas, RadialGradient};
use crate::geometry::{normalize_face_box, NormalizedFaceBox, PixelRect, Size};
use crate::photo::Image;
use crate::MAX_BLUR_SIGMA;

/// Run the detector on an already-oriented image.
pub(crate) fn run_detector(image: &Image, detector: &dyn FaceDetector) -> Vec<FaceBox> {
    let gray = image.to_gray();
    let faces = detector.detect(gray.as_raw(), gray.width(), gray.height());
    debug!(
        "detected {} face(s) in {}x{} image",
        faces.len(),
        image.width(),
        image.height()
    );
    faces
}

/// Detection pipeline: orient → detect → normalize each box to `destination`.
///
/// Output keeps the detector's order and cardinality.
pub(crate) fn detect_pipeline(
    image: &Image,
    destination: Size,
    detector: &dyn FaceDetector,
) -> Vec<NormalizedFaceBox> {
    let oriented = image.oriented();
    let (width, height) = (oriented.width(), oriented.height());

    run_detector(&oriented, detector)
        .iter()
        .map(|face| normalize_face_box(face, width, height, destination))
        .collect()
}

/// Accumulate one feathered radial mask per face, in detection order.
pub(crate) fn build_mask(
    faces: &[FaceBox],
    width: u32,
    height: u32,
    engine: &dyn ImageFilterEngine,
) -> MaskCanvas {
    let mut canvas = MaskCanvas::transparent(width, height);

    for face in faces {
        let gradient = RadialGradient::for_face(face);
        let crop = face.inset_by(-face.width / 2.0, -face.height / 2.0);
        // Faces entirely off-image contribute nothing
        if let Some(layer) = engine.radial_gradient(&gradient, &crop, width, height) {
            canvas = engine.composite_over(&layer, canvas);
        }
    }

    canvas
}

/// Blur the whole image without dark fringes: clamp-extend the edges, blur,
/// then crop back to the original extent.
pub(crate) fn blur_whole(
    image: &Image,
    sigma: f32,
    engine: &dyn ImageFilterEngine,
) -> Result<image::RgbaImage, BlurFacesError> {
    let margin = (3.0 * sigma).ceil();
    if !(0.0..=u32::MAX as f32).contains(&margin) {
        return Err(BlurFacesError::InvalidSigma(sigma));
    }
    let margin = margin as u32;
    let extended = engine.clamp_to_extent(image.pixels(), margin)?;
    let blurred = engine.gaussian_blur(&extended, sigma);
    engine.crop(
        &blurred,
        PixelRect::new(margin, margin, image.width(), image.height()),
    )
}

/// Full blur pipeline: orient → mask faces → blur → blend with mask → render.
pub(crate) fn blur_pipeline(
    image: &Image,
    sigma: f32,
    detector: &dyn FaceDetector,
    engine: &dyn ImageFilterEngine,
) -> Result<Image, BlurFacesError> {
    if !sigma.is_finite() || sigma <= 0.0 || sigma > MAX_BLUR_SIGMA {
        return Err(BlurFacesError::InvalidSigma(sigma));
    }

    let oriented = image.oriented();
    let (width, height) = (oriented.width(), oriented.height());
    if width == 0 || height == 0 {
        return Err(BlurFacesError::ZeroDimensions);
    }

    let faces = run_detector(&oriented, detector);
    let mask = build_mask(&faces, width, height, engine);

    let blurred = blur_whole(&oriented, sigma, engine)?;
    let composite = engine.blend_with_mask(&blurred, oriented.pixels(), &mask)?;
    let rendered = engine.render(&composite, PixelRect::extent(width, height))?;

    Ok(Image::from_rgba(rendered))
}
