use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use smartcrop_wasm::{analyze_crop, analyze_encoded};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn make_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ]);
    }

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

fn gray_rgba(width: u32, height: u32) -> Vec<u8> {
    [128, 128, 128, 255].repeat((width * height) as usize)
}

fn get(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &key.into()).unwrap()
}

fn options(fields: &[(&str, f64)]) -> JsValue {
    let obj = js_sys::Object::new();
    for (key, value) in fields {
        js_sys::Reflect::set(&obj, &(*key).into(), &JsValue::from(*value)).unwrap();
    }
    JsValue::from(obj)
}

#[wasm_bindgen_test]
fn gray_quadrants_pick_bottom_right() {
    let result = analyze_crop(
        gray_rgba(512, 512),
        512,
        512,
        options(&[("cropWidth", 256.0), ("cropHeight", 256.0), ("step", 256.0)]),
    )
    .unwrap();
    let top = get(&result, "topCrop");

    assert_eq!(get(&top, "x").as_f64(), Some(256.0));
    assert_eq!(get(&top, "y").as_f64(), Some(256.0));
    assert_eq!(get(&top, "width").as_f64(), Some(256.0));
    assert!(get(&get(&top, "score"), "total").as_f64().is_some());
}

#[wasm_bindgen_test]
fn oversized_crop_returns_null() {
    let result = analyze_crop(
        gray_rgba(64, 64),
        64,
        64,
        options(&[("cropWidth", 100.0), ("cropHeight", 100.0)]),
    )
    .unwrap();

    assert!(get(&result, "topCrop").is_null());
}

#[wasm_bindgen_test]
fn encoded_input_with_default_options() {
    let png = make_test_png(200, 300);
    let result = analyze_encoded(png, JsValue::UNDEFINED).unwrap();
    let top = get(&result, "topCrop");

    assert_eq!(get(&top, "width").as_f64(), Some(200.0));
    assert_eq!(get(&top, "height").as_f64(), Some(200.0));
}

#[wasm_bindgen_test]
fn wrong_buffer_length_is_reported() {
    let err = analyze_crop(vec![0; 10], 4, 4, JsValue::UNDEFINED).unwrap_err();
    assert_eq!(
        get(&err, "code").as_string().as_deref(),
        Some("BUFFER_LENGTH_MISMATCH")
    );
}

#[wasm_bindgen_test]
fn invalid_input_returns_error() {
    let err = analyze_encoded(b"not an image".to_vec(), JsValue::UNDEFINED).unwrap_err();
    assert_eq!(get(&err, "code").as_string().as_deref(), Some("DECODE_ERROR"));
}

#[wasm_bindgen_test]
fn zero_step_is_rejected() {
    let err = analyze_crop(gray_rgba(8, 8), 8, 8, options(&[("step", 0.0)])).unwrap_err();
    assert_eq!(get(&err, "code").as_string().as_deref(), Some("INVALID_CONFIG"));
}
