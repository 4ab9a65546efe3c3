//! Blur every face in a photo.
//!
//! Usage:
//!   cargo run --example blur_image --features rustface -- \
//!       <seeta_fd_frontal_v1.0.bin> <input> <output.png|output.jpg> [sigma]

use blurfaces::{FaceBlurService, OutputFormat, RustfaceDetector, DEFAULT_BLUR_SIGMA};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: blur_image <model> <input> <output> [sigma]");
        std::process::exit(2);
    }
    let sigma = match args.get(3) {
        Some(s) => s.parse().expect("sigma must be a number"),
        None => DEFAULT_BLUR_SIGMA,
    };

    let detector = RustfaceDetector::from_file(&args[0]).expect("failed to load model");
    let service = FaceBlurService::new(Box::new(detector)).blur_sigma(sigma);

    let input = std::fs::read(&args[1]).unwrap();
    let blurred = match service.try_blur_faces(&input) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("{}: {e}", args[1]);
            std::process::exit(1);
        }
    };

    let format = if args[2].ends_with(".jpg") || args[2].ends_with(".jpeg") {
        OutputFormat::Jpeg
    } else {
        OutputFormat::Png
    };
    let data = blurred.encode(format, 0.9).unwrap();
    std::fs::write(&args[2], &data).unwrap();

    println!(
        "{} → {} ({}x{}, {} bytes)",
        args[1],
        args[2],
        blurred.width(),
        blurred.height(),
        data.len()
    );
}
