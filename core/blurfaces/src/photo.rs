use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, GrayImage, ImageDecoder, ImageEncoder, ImageReader, RgbaImage};

use crate::error::BlurFacesError;

/// Encoded output format for [`Image::encode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG (keeps alpha).
    #[default]
    Png,

    /// JPEG at a given quality. Alpha is dropped.
    Jpeg,
}

/// A decoded raster image together with its orientation tag.
///
/// The pixels are stored as decoded; the tag records how they must be
/// transformed to display upright. Call [`Image::oriented`] before any
/// geometric work. Transforms never mutate an `Image`, they return new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: RgbaImage,
    orientation: Orientation,
}

impl Image {
    /// Decode PNG or JPEG bytes, keeping the EXIF orientation as the tag.
    pub fn decode(input: &[u8]) -> Result<Self, BlurFacesError> {
        let decode_err = |e: image::ImageError| BlurFacesError::DecodeError(e.to_string());

        let mut decoder = ImageReader::new(Cursor::new(input))
            .with_guessed_format()
            .map_err(|e| BlurFacesError::DecodeError(e.to_string()))?
            .into_decoder()
            .map_err(decode_err)?;
        // Missing or unreadable metadata means upright
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let decoded = DynamicImage::from_decoder(decoder).map_err(decode_err)?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(BlurFacesError::ZeroDimensions);
        }

        Ok(Self {
            pixels: decoded.to_rgba8(),
            orientation,
        })
    }

    /// Wrap an already-upright pixel buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self::with_orientation(pixels, Orientation::NoTransforms)
    }

    /// Wrap a pixel buffer that still needs `orientation` applied.
    pub fn with_orientation(pixels: RgbaImage, orientation: Orientation) -> Self {
        Self {
            pixels,
            orientation,
        }
    }

    /// Width of the stored pixels (before orientation).
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height of the stored pixels (before orientation).
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Orientation still to be applied.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Stored pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take the stored pixels.
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Apply the orientation tag, returning an upright image tagged
    /// `NoTransforms`. Already-upright images come back unchanged.
    pub fn oriented(&self) -> Image {
        if self.orientation == Orientation::NoTransforms {
            return self.clone();
        }
        let mut dynamic = DynamicImage::ImageRgba8(self.pixels.clone());
        dynamic.apply_orientation(self.orientation);
        Image::from_rgba(dynamic.to_rgba8())
    }

    /// Row-major 8-bit luma of the pixels, as fed to a face detector.
    pub fn to_gray(&self) -> GrayImage {
        image::imageops::grayscale(&self.pixels)
    }

    /// Encode the pixels (orientation is not applied) in `format`.
    ///
    /// `quality` ranges from 0.0 to 1.0 and only affects JPEG.
    pub fn encode(&self, format: OutputFormat, quality: f32) -> Result<Vec<u8>, BlurFacesError> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(BlurFacesError::InvalidQuality(quality));
        }

        let mut buffer = Vec::new();
        let (width, height) = self.pixels.dimensions();

        match format {
            OutputFormat::Png => {
                PngEncoder::new(&mut buffer)
                    .write_image(
                        self.pixels.as_raw(),
                        width,
                        height,
                        image::ExtendedColorType::Rgba8,
                    )
                    .map_err(|e| BlurFacesError::EncodeError(e.to_string()))?;
            }
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8();
                let quality_percent = ((quality * 100.0).round() as u8).max(1);
                JpegEncoder::new_with_quality(&mut buffer, quality_percent)
                    .write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
                    .map_err(|e| BlurFacesError::EncodeError(e.to_string()))?;
            }
        }

        Ok(buffer)
    }
}
