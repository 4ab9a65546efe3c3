//! Primitive image filters the blur pipeline is built from.
//!
//! [`ImageFilterEngine`] is the seam: the pipeline only sequences these
//! operations. [`RasterFilterEngine`] is the default eager implementation on
//! top of `image` and `imageproc`.

use image::{ImageBuffer, Luma, Rgba, Rgba32FImage, RgbaImage};

use crate::error::BlurFacesError;
use crate::face_detector::FaceBox;
use crate::geometry::PixelRect;

/// One `f32` alpha value per pixel, in `0.0..=1.0`.
pub type AlphaPlane = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Radial gradient of white, from `inner_alpha` at `inner_radius` to
/// `outer_alpha` at `outer_radius`.
///
/// `center` uses the same bottom-left-origin image space as [`FaceBox`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    /// Center `(x, y)`.
    pub center: (f64, f64),
    /// Radius up to which alpha is `inner_alpha`.
    pub inner_radius: f64,
    /// Radius from which alpha is `outer_alpha`.
    pub outer_radius: f64,
    /// Alpha inside `inner_radius`.
    pub inner_alpha: f32,
    /// Alpha beyond `outer_radius`.
    pub outer_alpha: f32,
}

impl RadialGradient {
    /// Soft mask for one face: opaque out to half the face height, fading to
    /// transparent at the full face height.
    pub fn for_face(face: &FaceBox) -> Self {
        Self {
            center: (
                face.max_x() - face.width / 2.0,
                face.max_y() - face.height / 2.0,
            ),
            inner_radius: face.height / 2.0,
            outer_radius: face.height,
            inner_alpha: 1.0,
            outer_alpha: 0.0,
        }
    }

    /// Alpha at distance `d` from the center.
    pub fn alpha_at(&self, d: f64) -> f32 {
        if d <= self.inner_radius {
            return self.inner_alpha;
        }
        if d >= self.outer_radius {
            return self.outer_alpha;
        }
        let t = ((d - self.inner_radius) / (self.outer_radius - self.inner_radius)) as f32;
        self.inner_alpha + (self.outer_alpha - self.inner_alpha) * t
    }
}

/// A finite piece of mask positioned inside the image extent.
#[derive(Debug, Clone)]
pub struct MaskLayer {
    /// Where `alpha` sits in the image, top-left origin.
    pub bounds: PixelRect,
    /// Alpha values, `bounds.width` × `bounds.height`.
    pub alpha: AlphaPlane,
}

/// Image-sized accumulated mask. Starts fully transparent.
#[derive(Debug, Clone)]
pub struct MaskCanvas {
    alpha: AlphaPlane,
}

impl MaskCanvas {
    /// All-zero canvas of `width` × `height`.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            alpha: AlphaPlane::new(width, height),
        }
    }

    /// Canvas width.
    pub fn width(&self) -> u32 {
        self.alpha.width()
    }

    /// Canvas height.
    pub fn height(&self) -> u32 {
        self.alpha.height()
    }

    /// Alpha at top-left pixel `(x, y)`.
    pub fn alpha_at(&self, x: u32, y: u32) -> f32 {
        self.alpha.get_pixel(x, y).0[0]
    }

    /// True if no face has contributed any alpha.
    pub fn is_transparent(&self) -> bool {
        self.alpha.pixels().all(|p| p.0[0] == 0.0)
    }

    /// The whole alpha plane.
    pub fn alpha(&self) -> &AlphaPlane {
        &self.alpha
    }

    fn alpha_mut(&mut self) -> &mut AlphaPlane {
        &mut self.alpha
    }
}

/// The filter-graph capability consumed by the blur pipeline.
///
/// Geometry arguments typed as [`FaceBox`] are in bottom-left-origin image
/// space; [`PixelRect`]s are top-left pixel rectangles.
pub trait ImageFilterEngine: Send + Sync {
    /// Evaluate `gradient` over an image of `width` × `height`, keeping only
    /// the pixels whose centers fall inside `crop`.
    ///
    /// Returns `None` when the crop misses the image entirely.
    fn radial_gradient(
        &self,
        gradient: &RadialGradient,
        crop: &FaceBox,
        width: u32,
        height: u32,
    ) -> Option<MaskLayer>;

    /// Source-over composite `top` onto `bottom`.
    fn composite_over(&self, top: &MaskLayer, bottom: MaskCanvas) -> MaskCanvas;

    /// Extend the image by `margin` pixels on every side, repeating edge pixels.
    /// Fails if the padded size does not fit in `u32`.
    fn clamp_to_extent(&self, image: &RgbaImage, margin: u32)
        -> Result<RgbaImage, BlurFacesError>;

    /// Gaussian blur with standard deviation `sigma` (pixels).
    fn gaussian_blur(&self, image: &RgbaImage, sigma: f32) -> RgbaImage;

    /// Cut `rect` out of `image`. Fails if `rect` is empty or out of bounds.
    fn crop(&self, image: &RgbaImage, rect: PixelRect) -> Result<RgbaImage, BlurFacesError>;

    /// Per pixel `foreground * a + background * (1 - a)` with `a` from `mask`.
    ///
    /// Output channels are normalized to `0.0..=1.0`.
    fn blend_with_mask(
        &self,
        foreground: &RgbaImage,
        background: &RgbaImage,
        mask: &MaskCanvas,
    ) -> Result<Rgba32FImage, BlurFacesError>;

    /// Materialize `extent` of a composited image into 8-bit pixels.
    fn render(&self, image: &Rgba32FImage, extent: PixelRect) -> Result<RgbaImage, BlurFacesError>;
}

/// Eager CPU implementation of [`ImageFilterEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterFilterEngine;

impl RasterFilterEngine {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }
}

impl ImageFilterEngine for RasterFilterEngine {
    fn radial_gradient(
        &self,
        gradient: &RadialGradient,
        crop: &FaceBox,
        width: u32,
        height: u32,
    ) -> Option<MaskLayer> {
        let bounds = PixelRect::covering(crop, width, height)?;
        let image_height = height as f64;
        let (cx, cy) = gradient.center;

        let alpha = AlphaPlane::from_fn(bounds.width, bounds.height, |lx, ly| {
            // Pixel center in bottom-left image space
            let px = (bounds.x + lx) as f64 + 0.5;
            let py = image_height - ((bounds.y + ly) as f64 + 0.5);
            let inside = px >= crop.min_x()
                && px <= crop.max_x()
                && py >= crop.min_y()
                && py <= crop.max_y();
            if !inside {
                return Luma([0.0]);
            }
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            Luma([gradient.alpha_at(d)])
        });

        Some(MaskLayer { bounds, alpha })
    }

    fn composite_over(&self, top: &MaskLayer, mut bottom: MaskCanvas) -> MaskCanvas {
        let (canvas_w, canvas_h) = (bottom.width(), bottom.height());
        let plane = bottom.alpha_mut();

        for (lx, ly, src) in top.alpha.enumerate_pixels() {
            let (x, y) = (top.bounds.x + lx, top.bounds.y + ly);
            if x >= canvas_w || y >= canvas_h {
                continue;
            }
            let src = src.0[0];
            let dst = plane.get_pixel_mut(x, y);
            dst.0[0] = src + dst.0[0] * (1.0 - src);
        }

        bottom
    }

    fn clamp_to_extent(
        &self,
        image: &RgbaImage,
        margin: u32,
    ) -> Result<RgbaImage, BlurFacesError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Ok(image.clone());
        }
        let padded = |side: u32| margin.checked_mul(2).and_then(|m| side.checked_add(m));
        let (Some(padded_w), Some(padded_h)) = (padded(w), padded(h)) else {
            return Err(BlurFacesError::RenderError(format!(
                "{w}x{h} image cannot be padded by {margin}"
            )));
        };
        Ok(RgbaImage::from_fn(padded_w, padded_h, |x, y| {
            let sx = x.saturating_sub(margin).min(w - 1);
            let sy = y.saturating_sub(margin).min(h - 1);
            *image.get_pixel(sx, sy)
        }))
    }

    fn gaussian_blur(&self, image: &RgbaImage, sigma: f32) -> RgbaImage {
        imageproc::filter::gaussian_blur_f32(image, sigma)
    }

    fn crop(&self, image: &RgbaImage, rect: PixelRect) -> Result<RgbaImage, BlurFacesError> {
        if rect.is_empty() || !rect.fits_within(image.width(), image.height()) {
            return Err(BlurFacesError::RenderError(format!(
                "crop {rect:?} outside {}x{} image",
                image.width(),
                image.height()
            )));
        }
        Ok(image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
    }

    fn blend_with_mask(
        &self,
        foreground: &RgbaImage,
        background: &RgbaImage,
        mask: &MaskCanvas,
    ) -> Result<Rgba32FImage, BlurFacesError> {
        let dims = background.dimensions();
        if foreground.dimensions() != dims || (mask.width(), mask.height()) != dims {
            return Err(BlurFacesError::RenderError(format!(
                "blend extents differ: foreground {:?}, background {:?}, mask {:?}",
                foreground.dimensions(),
                dims,
                (mask.width(), mask.height())
            )));
        }

        Ok(Rgba32FImage::from_fn(dims.0, dims.1, |x, y| {
            let a = mask.alpha_at(x, y).clamp(0.0, 1.0);
            let fg = foreground.get_pixel(x, y).0;
            let bg = background.get_pixel(x, y).0;
            let mut out = [0.0f32; 4];
            for c in 0..4 {
                out[c] = (fg[c] as f32 * a + bg[c] as f32 * (1.0 - a)) / 255.0;
            }
            Rgba(out)
        }))
    }

    fn render(&self, image: &Rgba32FImage, extent: PixelRect) -> Result<RgbaImage, BlurFacesError> {
        if extent.is_empty() || !extent.fits_within(image.width(), image.height()) {
            return Err(BlurFacesError::RenderError(format!(
                "extent {extent:?} outside {}x{} composite",
                image.width(),
                image.height()
            )));
        }

        let mut out = RgbaImage::new(extent.width, extent.height);
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            let src = image.get_pixel(extent.x + x, extent.y + y).0;
            if src.iter().any(|v| !v.is_finite()) {
                return Err(BlurFacesError::RenderError(format!(
                    "non-finite value at ({x}, {y})"
                )));
            }
            *pixel = Rgba(src.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
        Ok(out)
    }
}
