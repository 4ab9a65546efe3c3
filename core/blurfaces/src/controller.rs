//! Display state for a pick-a-photo, show-boxes-or-blur screen.
//!
//! The widgets themselves live in the host UI; this module owns what they
//! show. Every state change returns the [`Frame`] to draw next.

use log::warn;

use crate::geometry::{NormalizedFaceBox, Size};
use crate::photo::Image;
use crate::FaceBlurService;

/// What the screen currently shows for the picked image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// The picked image with every face blurred.
    #[default]
    Blurred,

    /// The picked image with a debug rectangle over every face.
    FaceBoxes,
}

impl DisplayMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Blurred => DisplayMode::FaceBoxes,
            DisplayMode::FaceBoxes => DisplayMode::Blurred,
        }
    }

    /// Title for the button that switches to the other mode.
    pub fn action_label(self) -> &'static str {
        match self {
            DisplayMode::Blurred => "Show Rects",
            DisplayMode::FaceBoxes => "Blur Faces",
        }
    }
}

/// Content to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Nothing picked yet (or the last pick was unreadable).
    Empty,

    /// Upright original plus face rectangles in view coordinates.
    FaceBoxes {
        /// Upright picked image.
        image: Image,
        /// Face rectangles in view coordinates.
        boxes: Vec<NormalizedFaceBox>,
    },

    /// Blurred image, or `None` if blurring failed.
    Blurred(Option<Image>),
}

/// Holds the picked image and display mode and drives [`FaceBlurService`].
pub struct InteractionController {
    service: FaceBlurService,
    picked: Option<Image>,
    mode: DisplayMode,
    view_width: f64,
}

impl InteractionController {
    /// `view_width` is the width of the image view; its height follows the
    /// picked image's aspect ratio.
    pub fn new(service: FaceBlurService, view_width: f64) -> Self {
        Self {
            service,
            picked: None,
            mode: DisplayMode::default(),
            view_width,
        }
    }

    /// Current display mode.
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Title for the mode toggle button.
    pub fn action_label(&self) -> &'static str {
        self.mode.action_label()
    }

    /// The picked image, upright.
    pub fn picked(&self) -> Option<&Image> {
        self.picked.as_ref()
    }

    /// The service frames are rendered with.
    pub fn service(&self) -> &FaceBlurService {
        &self.service
    }

    /// Replace the picked image with `input` and render it in the current mode.
    pub fn pick_image(&mut self, input: &[u8]) -> Frame {
        self.picked = match Image::decode(input) {
            Ok(image) => Some(image.oriented()),
            Err(e) => {
                warn!("picked image could not be decoded: {e}");
                None
            }
        };
        self.render()
    }

    /// Replace the picked image with an already-decoded one.
    pub fn pick_decoded(&mut self, image: Image) -> Frame {
        self.picked = Some(image.oriented());
        self.render()
    }

    /// Switch between blurred and face-box display.
    pub fn toggle_mode(&mut self) -> Frame {
        self.mode = self.mode.toggled();
        self.render()
    }

    /// Change the image view width, e.g. after rotation.
    pub fn set_view_width(&mut self, width: f64) -> Frame {
        self.view_width = width;
        self.render()
    }

    /// Size of the image view: the configured width, height from the picked
    /// image's aspect ratio. Zero height when nothing is picked.
    pub fn display_size(&self) -> Size {
        match &self.picked {
            Some(image) => Size::fit_width(self.view_width, image.width(), image.height()),
            None => Size::new(self.view_width, 0.0),
        }
    }

    /// Frame for the current picked image and mode.
    pub fn render(&self) -> Frame {
        let Some(image) = &self.picked else {
            return Frame::Empty;
        };

        match self.mode {
            DisplayMode::FaceBoxes => Frame::FaceBoxes {
                image: image.clone(),
                boxes: self.service.detect_faces(image, self.display_size()),
            },
            DisplayMode::Blurred => Frame::Blurred(match self.service.blur_image(image) {
                Ok(blurred) => Some(blurred),
                Err(e) => {
                    warn!("blurring picked image failed: {e}");
                    None
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_detector::{FaceBox, FaceDetector};
    use image::{ImageEncoder, Rgba, RgbaImage};

    struct FixedDetector(Vec<FaceBox>);

    impl FaceDetector for FixedDetector {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBox> {
            self.0.clone()
        }
    }

    fn make_test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        buffer
    }

    fn controller(faces: Vec<FaceBox>) -> InteractionController {
        let service = FaceBlurService::new(Box::new(FixedDetector(faces))).blur_sigma(2.0);
        InteractionController::new(service, 100.0)
    }

    #[test]
    fn starts_empty_in_blur_mode() {
        let c = controller(Vec::new());
        assert_eq!(c.mode(), DisplayMode::Blurred);
        assert_eq!(c.action_label(), "Show Rects");
        assert_eq!(c.render(), Frame::Empty);
    }

    #[test]
    fn toggle_flips_mode_and_label() {
        let mut c = controller(Vec::new());
        c.toggle_mode();
        assert_eq!(c.mode(), DisplayMode::FaceBoxes);
        assert_eq!(c.action_label(), "Blur Faces");
        c.toggle_mode();
        assert_eq!(c.mode(), DisplayMode::Blurred);
    }

    #[test]
    fn pick_renders_current_mode() {
        let mut c = controller(vec![FaceBox::new(50.0, 100.0, 40.0, 40.0)]);
        match c.pick_image(&make_test_png(200, 400)) {
            Frame::Blurred(Some(image)) => assert_eq!((image.width(), image.height()), (200, 400)),
            other => panic!("expected blurred frame, got {other:?}"),
        }

        match c.toggle_mode() {
            Frame::FaceBoxes { boxes, .. } => {
                // View 100 wide → 200 tall, half scale
                assert_eq!(c.display_size(), Size::new(100.0, 200.0));
                assert_eq!(boxes.len(), 1);
                assert_eq!(boxes[0].x, 25.0);
                assert_eq!(boxes[0].y, 200.0 - 140.0 * 0.5);
                assert_eq!(boxes[0].width, 20.0);
            }
            other => panic!("expected face boxes, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_pick_clears_image() {
        let mut c = controller(Vec::new());
        c.pick_image(&make_test_png(10, 10));
        assert!(c.picked().is_some());
        assert_eq!(c.pick_image(b"garbage"), Frame::Empty);
        assert!(c.picked().is_none());
        assert_eq!(c.display_size().height, 0.0);
    }

    #[test]
    fn view_width_change_rescales_boxes() {
        let mut c = controller(vec![FaceBox::new(0.0, 0.0, 100.0, 100.0)]);
        c.toggle_mode();
        c.pick_image(&make_test_png(200, 200));
        match c.set_view_width(50.0) {
            Frame::FaceBoxes { boxes, .. } => assert_eq!(boxes[0].width, 25.0),
            other => panic!("expected face boxes, got {other:?}"),
        }
    }
}
