use std::sync::Arc;

use blurfaces_mobile::*;

fn make_test_png(width: u32, height: u32) -> Vec<u8> {
    use image::codecs::png::PngEncoder;
    use image::{ImageEncoder, RgbImage};

    let mut img = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            if (x / 3 + y / 3) % 2 == 0 { 0 } else { 255 },
        ]);
    }
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new(&mut buffer);
    encoder
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

struct HostDetector {
    faces: Vec<FaceRect>,
}

impl FaceDetector for HostDetector {
    fn detect(&self, gray: Vec<u8>, width: u32, height: u32) -> Vec<FaceRect> {
        assert_eq!(gray.len(), (width * height) as usize);
        self.faces.clone()
    }
}

fn detector(faces: &[(f64, f64, f64, f64)]) -> Arc<dyn FaceDetector> {
    Arc::new(HostDetector {
        faces: faces
            .iter()
            .map(|&(x, y, width, height)| FaceRect {
                x,
                y,
                width,
                height,
            })
            .collect(),
    })
}

#[test]
fn face_rects_bottom_left_detector() {
    let service = FaceBlurService::new(
        detector(&[(400.0, 400.0, 200.0, 200.0)]),
        CoordinateOrigin::BottomLeft,
        None,
    );
    let rects = service.get_face_rects(make_test_png(1000, 1000), 500.0, 500.0);
    assert_eq!(
        rects,
        vec![FaceRect {
            x: 200.0,
            y: 200.0,
            width: 100.0,
            height: 100.0,
        }]
    );
}

#[test]
fn face_rects_top_left_detector() {
    // Top 10 rows of a 100x100 image
    let service = FaceBlurService::new(
        detector(&[(0.0, 0.0, 10.0, 10.0)]),
        CoordinateOrigin::TopLeft,
        None,
    );
    let rects = service.get_face_rects(make_test_png(100, 100), 100.0, 100.0);
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0].y, 0.0);
}

#[test]
fn blur_faces_returns_png() {
    let service = FaceBlurService::new(
        detector(&[(20.0, 20.0, 30.0, 30.0)]),
        CoordinateOrigin::BottomLeft,
        Some(4.0),
    );
    let png = service.blur_faces(make_test_png(80, 60)).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (80, 60));
}

#[test]
fn invalid_input_fails_soft_and_typed() {
    let service = FaceBlurService::new(detector(&[]), CoordinateOrigin::BottomLeft, None);
    assert!(service
        .get_face_rects(b"not an image".to_vec(), 10.0, 10.0)
        .is_empty());
    assert!(service.blur_faces(b"not an image".to_vec()).is_none());
    assert!(matches!(
        service.try_blur_faces(b"not an image".to_vec()),
        Err(BlurFacesError::DecodeError { .. })
    ));
}

#[test]
fn invalid_sigma_is_reported() {
    let service = FaceBlurService::new(detector(&[]), CoordinateOrigin::BottomLeft, Some(-1.0));
    assert!(matches!(
        service.try_blur_faces(make_test_png(8, 8)),
        Err(BlurFacesError::InvalidSigma)
    ));
}

#[test]
fn controller_round_trip() {
    let controller = InteractionController::new(
        detector(&[(10.0, 10.0, 20.0, 20.0)]),
        CoordinateOrigin::BottomLeft,
        50.0,
        Some(2.0),
    );
    assert_eq!(controller.render(), Frame::Empty);
    assert_eq!(controller.mode(), DisplayMode::Blurred);
    assert_eq!(controller.action_label(), "Show Rects");

    match controller.pick_image(make_test_png(100, 50)) {
        Frame::Blurred { image } => assert!(image.is_some()),
        other => panic!("expected blurred frame, got {other:?}"),
    }
    assert_eq!(
        controller.display_size(),
        ViewSize {
            width: 50.0,
            height: 25.0,
        }
    );

    match controller.toggle_mode() {
        Frame::FaceBoxes { image, boxes } => {
            assert!(image.is_some_and(|png| !png.is_empty()));
            assert_eq!(boxes.len(), 1);
            assert_eq!(boxes[0].width, 10.0);
        }
        other => panic!("expected face boxes, got {other:?}"),
    }
    assert_eq!(controller.action_label(), "Blur Faces");
}

#[test]
fn face_boxes_survive_unencodable_image() {
    let frame = Frame::from(blurfaces::Frame::FaceBoxes {
        image: blurfaces::Image::from_rgba(image::RgbaImage::new(0, 0)),
        boxes: vec![blurfaces::NormalizedFaceBox {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        }],
    });
    match frame {
        Frame::FaceBoxes { image, boxes } => {
            assert!(image.is_none());
            assert_eq!(boxes.len(), 1);
            assert_eq!(boxes[0].height, 4.0);
        }
        other => panic!("expected face boxes, got {other:?}"),
    }
}

#[test]
fn huge_sigma_fails_soft() {
    let service = FaceBlurService::new(detector(&[]), CoordinateOrigin::BottomLeft, Some(1.0e9));
    assert!(service.blur_faces(make_test_png(4, 4)).is_none());
    assert!(matches!(
        service.try_blur_faces(make_test_png(4, 4)),
        Err(BlurFacesError::InvalidSigma)
    ));
}
