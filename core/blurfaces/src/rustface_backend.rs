use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use log::debug;

use crate::error::BlurFacesError;
use crate::face_detector::{FaceBox, FaceDetector};

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The SeetaFace frontal model (`seeta_fd_frontal_v1.0.bin`) is not bundled;
/// load it from disk with [`RustfaceDetector::from_file`] or from memory with
/// [`RustfaceDetector::from_bytes`].
pub struct RustfaceDetector {
    model: rustface::Model,
    min_face_size: u32,
    score_thresh: f64,
}

impl RustfaceDetector {
    /// Load the SeetaFace model from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BlurFacesError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| BlurFacesError::Model(format!("{}: {e}", path.display())))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load the SeetaFace model from an in-memory buffer.
    pub fn from_bytes(model_data: &[u8]) -> Result<Self, BlurFacesError> {
        Self::from_reader(Cursor::new(model_data))
    }

    fn from_reader(reader: impl Read) -> Result<Self, BlurFacesError> {
        let model = rustface::read_model(reader).map_err(|e| BlurFacesError::Model(e.to_string()))?;
        Ok(Self {
            model,
            min_face_size: 20,
            score_thresh: 2.0,
        })
    }

    /// Smallest face edge (pixels) the detector will report. Default: 20.
    pub fn min_face_size(mut self, size: u32) -> Self {
        self.min_face_size = size;
        self
    }

    /// Minimum classifier score for a detection. Default: 2.0.
    pub fn score_thresh(mut self, thresh: f64) -> Self {
        self.score_thresh = thresh;
        self
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBox> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_thresh);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));
        debug!("rustface reported {} candidate(s)", faces.len());

        // rustface boxes are top-left origin
        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox::from_top_left(
                    bbox.x() as f64,
                    bbox.y() as f64,
                    bbox.width() as f64,
                    bbox.height() as f64,
                    height as f64,
                )
            })
            .collect()
    }
}
