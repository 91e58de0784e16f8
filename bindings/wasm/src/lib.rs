use smartcrop::{AnalysisConfig, AnalysisResult, ImageBuffer, SmartCropError};
use wasm_bindgen::prelude::*;

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

/// Convert a `SmartCropError` into a JS `Error` with a machine-readable `code` property.
fn to_js_error(e: SmartCropError) -> JsValue {
    let code = match &e {
        SmartCropError::ZeroDimensions => "ZERO_DIMENSIONS",
        SmartCropError::BufferLengthMismatch { .. } => "BUFFER_LENGTH_MISMATCH",
        SmartCropError::DecodeError(_) => "DECODE_ERROR",
        SmartCropError::InvalidConfig(_) => "INVALID_CONFIG",
    };
    make_error(code, &e.to_string())
}

/// Options arrive as a camelCase object; missing fields keep their defaults.
fn parse_options(options: JsValue) -> Result<AnalysisConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(AnalysisConfig::default())
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid options: {e}")))
    }
}

/// Build `{ topCrop: { x, y, width, height, score } | null }`.
fn build_result_object(result: &AnalysisResult) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();

    let top = match result.top_crop.as_ref() {
        Some(candidate) => {
            let rect = &candidate.rect;
            let crop = js_sys::Object::new();
            js_sys::Reflect::set(&crop, &"x".into(), &JsValue::from(rect.x))?;
            js_sys::Reflect::set(&crop, &"y".into(), &JsValue::from(rect.y))?;
            js_sys::Reflect::set(&crop, &"width".into(), &JsValue::from(rect.width))?;
            js_sys::Reflect::set(&crop, &"height".into(), &JsValue::from(rect.height))?;

            let score = &candidate.score;
            let score_obj = js_sys::Object::new();
            js_sys::Reflect::set(&score_obj, &"detail".into(), &JsValue::from(score.detail))?;
            js_sys::Reflect::set(
                &score_obj,
                &"saturation".into(),
                &JsValue::from(score.saturation),
            )?;
            js_sys::Reflect::set(&score_obj, &"skin".into(), &JsValue::from(score.skin))?;
            js_sys::Reflect::set(&score_obj, &"boost".into(), &JsValue::from(score.boost))?;
            js_sys::Reflect::set(&score_obj, &"total".into(), &JsValue::from(score.total))?;
            js_sys::Reflect::set(&crop, &"score".into(), &score_obj)?;
            JsValue::from(crop)
        }
        None => JsValue::NULL,
    };
    js_sys::Reflect::set(&obj, &"topCrop".into(), &top)?;

    Ok(JsValue::from(obj))
}

/// Find the best crop of a raw RGBA raster, e.g. `ImageData.data`.
///
/// @param rgba - Row-major RGBA bytes, `width * height * 4` long
/// @param options - Optional object with fields such as width, height,
///   aspect, cropWidth, cropHeight, minScale, boost, ruleOfThirds, prescale
#[wasm_bindgen(js_name = "analyzeCrop")]
pub fn analyze_crop(
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let config = parse_options(options)?;
    let image = ImageBuffer::new(width, height, rgba).map_err(to_js_error)?;

    let result = smartcrop::analyze_crop(&image, &config).map_err(to_js_error)?;

    build_result_object(&result)
}

/// Decode an encoded image (JPEG, PNG, or WebP) and find its best crop.
///
/// @param input - Raw image bytes
/// @param options - Same fields as `analyzeCrop`
#[wasm_bindgen(js_name = "analyzeEncoded")]
pub fn analyze_encoded(input: Vec<u8>, options: JsValue) -> Result<JsValue, JsValue> {
    let config = parse_options(options)?;

    let image = smartcrop::decode_image(&input).map_err(to_js_error)?;
    let result = smartcrop::analyze_source(&image, &config).map_err(to_js_error)?;

    build_result_object(&result)
}
