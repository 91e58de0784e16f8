//! Print the chosen crop for image files and dump the feature map.
//!
//! Usage:
//!   cargo run --example debug_crop -- [--size WxH] photo.jpg [more.png ...]
//!
//! Without paths a synthetic image is analysed instead. Feature maps and
//! crops are written to `target/debug_crop/`.

use image::{DynamicImage, Rgba, RgbaImage};
use smartcrop::SmartCropper;

const OUTPUT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../target/debug_crop");

/// Warm blob on a cool gradient, off to the right.
fn synthetic() -> DynamicImage {
    let (width, height) = (480, 320);
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let dx = x as f64 - 340.0;
        let dy = y as f64 - 140.0;
        if dx * dx + dy * dy < 60.0 * 60.0 {
            Rgba([224, 170, 140, 255])
        } else {
            Rgba([40, (y * 120 / height) as u8 + 60, 160, 255])
        }
    });
    DynamicImage::ImageRgba8(image)
}

fn parse_size(value: &str) -> (u32, u32) {
    let (w, h) = value.split_once('x').expect("size must look like WxH");
    (w.parse().unwrap(), h.parse().unwrap())
}

fn main() {
    let mut args = std::env::args().skip(1).peekable();
    let mut size = (100, 100);
    if args.peek().map(String::as_str) == Some("--size") {
        args.next();
        size = parse_size(&args.next().expect("--size needs a value"));
    }

    let mut inputs: Vec<(String, DynamicImage)> = args
        .map(|path| {
            let bytes = std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
            let image = smartcrop::decode_image(&bytes).unwrap();
            let stem = std::path::Path::new(&path)
                .file_stem()
                .unwrap()
                .to_string_lossy()
                .into_owned();
            (stem, image)
        })
        .collect();
    if inputs.is_empty() {
        inputs.push(("synthetic".to_string(), synthetic()));
    }

    std::fs::create_dir_all(OUTPUT_DIR).unwrap();

    for (stem, image) in inputs {
        let (width, height) = (image.width(), image.height());
        println!("=== {stem} ({width}x{height}) -> {}x{} ===", size.0, size.1);

        let cropper = SmartCropper::from_image(image)
            .unwrap()
            .target_size(size.0, size.1)
            .debug(true);
        let result = cropper.analyze().unwrap();

        match &result.top_crop {
            Some(top) => println!(
                "  crop ({}, {}, {}x{}) total={:.5} detail={:.3} skin={:.3} saturation={:.3} boost={:.3}",
                top.rect.x,
                top.rect.y,
                top.rect.width,
                top.rect.height,
                top.score.total,
                top.score.detail,
                top.score.skin,
                top.score.saturation,
                top.score.boost,
            ),
            None => println!("  no candidate fits"),
        }

        if let Some(debug) = &result.debug {
            println!(
                "  {} candidates, prescale {:.4}",
                debug.candidates.len(),
                debug.prescale
            );
            let path = format!("{OUTPUT_DIR}/{stem}_features.png");
            debug.feature_map.to_debug_image().save(&path).unwrap();
            println!("  feature map -> {path}");
        }

        let path = format!("{OUTPUT_DIR}/{stem}_crop.png");
        cropper.crop().unwrap().save(&path).unwrap();
        println!("  crop -> {path}");
        println!();
    }
}
