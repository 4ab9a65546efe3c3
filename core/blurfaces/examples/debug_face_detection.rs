//! Print raw and normalized face boxes for a set of images.
//!
//! Usage:
//!   cargo run --example debug_face_detection --features rustface -- \
//!       <seeta_fd_frontal_v1.0.bin> <view-width> <image>...

use blurfaces::{FaceBlurService, FaceDetector, Image, RustfaceDetector, Size};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: debug_face_detection <model> <view-width> <image>...");
        std::process::exit(2);
    }
    let view_width: f64 = args[1].parse().expect("view width must be a number");

    let detector = RustfaceDetector::from_file(&args[0]).expect("failed to load model");
    let service = FaceBlurService::new(Box::new(detector));

    for path in &args[2..] {
        let input = std::fs::read(path).unwrap();
        let image = Image::decode(&input).unwrap().oriented();
        let gray = image.to_gray();
        let (width, height) = (gray.width(), gray.height());

        println!("=== {path} ({width}x{height}) ===");

        let faces = service.detector().detect(gray.as_raw(), width, height);
        if faces.is_empty() {
            println!("  NO FACES DETECTED");
            println!();
            continue;
        }

        println!("  Found {} face(s) (bottom-left origin):", faces.len());
        for (i, face) in faces.iter().enumerate() {
            println!(
                "    face {i}: ({:.0}, {:.0}, {:.0}x{:.0})",
                face.x, face.y, face.width, face.height
            );
        }

        let view = Size::fit_width(view_width, width, height);
        println!("  In a {:.0}x{:.0} view (top-left origin):", view.width, view.height);
        for (i, rect) in service.detect_faces(&image, view).iter().enumerate() {
            println!(
                "    face {i}: ({:.1}, {:.1}, {:.1}x{:.1})",
                rect.x, rect.y, rect.width, rect.height
            );
        }
        println!();
    }
}
