use std::borrow::Cow;

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::crop::{generate_candidates, CropCandidate, CropRegion, Score};
use crate::downsample::downsample;
use crate::error::SmartCropError;
use crate::features::{build_feature_map, FeatureMap};
use crate::image_buffer::{ImageBuffer, ImageSource};
use crate::score::score;

/// Long-edge size the working image is shrunk to when prescaling.
const PRESCALE_EDGE: f64 = 256.0;

/// Outcome of one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Highest-scoring candidate in source-image coordinates, or `None` when
    /// no candidate fits inside the image.
    pub top_crop: Option<CropCandidate>,

    /// Present only when the config asked for debug output.
    pub debug: Option<DebugOutput>,
}

impl AnalysisResult {
    /// Score of the winning candidate.
    pub fn top_score(&self) -> Option<&Score> {
        self.top_crop.as_ref().map(|c| &c.score)
    }

    /// The winning rectangle as whole pixels clamped to a `width` x `height`
    /// image.
    pub fn top_region(&self, width: u32, height: u32) -> Option<CropRegion> {
        self.top_crop.map(|c| c.rect.to_region(width, height))
    }
}

/// Intermediate state exposed for inspection.
#[derive(Debug, Clone)]
pub struct DebugOutput {
    /// Every candidate in generation order, in source-image coordinates.
    pub candidates: Vec<CropCandidate>,
    /// Full-resolution feature map of the (possibly prescaled) working image.
    pub feature_map: FeatureMap,
    /// The config after normalization and target resolution.
    pub config: AnalysisConfig,
    /// Factor applied to the source image before analysis.
    pub prescale: f64,
}

/// Find the best crop of a decoded raster.
pub fn analyze_crop(
    image: &ImageBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, SmartCropError> {
    analyze_source(image, config)
}

/// Find the best crop of any [`ImageSource`].
///
/// The source is only resampled when prescaling applies; otherwise its
/// full-resolution raster is analysed directly.
pub fn analyze_source<S: ImageSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, SmartCropError> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(SmartCropError::ZeroDimensions);
    }

    let mut config = config.normalized()?;
    let prescale = resolve_target(&mut config, width, height);

    let working: Cow<'_, ImageBuffer> = if prescale < 1.0 {
        let (scaled_w, scaled_h) = prescaled_dimensions(width, height, prescale);
        Cow::Owned(source.resample(scaled_w, scaled_h)?)
    } else {
        source.open()?
    };

    debug!(
        source = format!("{width}x{height}"),
        working = format!("{}x{}", working.width(), working.height()),
        prescale,
        crop_width = config.crop_width,
        crop_height = config.crop_height,
        "Resolved crop target"
    );

    let feature_map = build_feature_map(&working, &config);
    let score_map = downsample(&feature_map, config.score_down_sample);
    let rects = generate_candidates(&config, working.width(), working.height());

    let mut top_crop: Option<CropCandidate> = None;
    let mut top_score = f64::NEG_INFINITY;
    let mut candidates = Vec::with_capacity(if config.debug { rects.len() } else { 0 });

    for rect in &rects {
        let candidate = CropCandidate {
            rect: *rect,
            score: score(&config, &score_map, rect),
        };
        if candidate.score.total > top_score {
            top_score = candidate.score.total;
            top_crop = Some(candidate);
        }
        if config.debug {
            candidates.push(candidate);
        }
    }

    let to_source = |c: CropCandidate| CropCandidate {
        rect: c.rect.unscaled(prescale),
        score: c.score,
    };
    let top_crop = top_crop.map(to_source);

    match &top_crop {
        Some(top) => debug!(
            candidates = rects.len(),
            x = top.rect.x,
            y = top.rect.y,
            width = top.rect.width,
            height = top.rect.height,
            total = top.score.total,
            "Selected crop"
        ),
        None => debug!(candidates = 0, "No crop candidate fits the image"),
    }

    let debug = config.debug.then(|| DebugOutput {
        candidates: candidates.into_iter().map(to_source).collect(),
        feature_map,
        config,
        prescale,
    });

    Ok(AnalysisResult { top_crop, debug })
}

/// Derive crop dimensions from the target size or aspect and decide the
/// prescale factor. Crop dimensions and boosts are rescaled in place.
fn resolve_target(config: &mut AnalysisConfig, width: u32, height: u32) -> f64 {
    if let Some(aspect) = config.aspect {
        config.width = Some(aspect);
        config.height = Some(1.0);
    }
    let (Some(target_w), Some(target_h)) = (config.width, config.height) else {
        return 1.0;
    };

    let (width, height) = (width as f64, height as f64);
    let scale = (width / target_w).min(height / target_h);
    config.crop_width = Some(((target_w * scale) as u32).max(1));
    config.crop_height = Some(((target_h * scale) as u32).max(1));
    // Never consider crops that would have to be upscaled to reach the target
    config.min_scale = config.max_scale.min((1.0 / scale).max(config.min_scale));

    let long_edge = width.max(height);
    if !config.prescale || long_edge <= PRESCALE_EDGE {
        return 1.0;
    }

    let prescale = PRESCALE_EDGE / long_edge;
    config.crop_width = config
        .crop_width
        .map(|w| ((w as f64 * prescale) as u32).max(1));
    config.crop_height = config
        .crop_height
        .map(|h| ((h as f64 * prescale) as u32).max(1));
    config.boost = config.boost.iter().map(|b| b.scaled(prescale)).collect();
    prescale
}

/// Working-image size for `prescale`, truncated to whole pixels.
fn prescaled_dimensions(width: u32, height: u32, prescale: f64) -> (u32, u32) {
    (
        ((width as f64 * prescale) as u32).max(1),
        ((height as f64 * prescale) as u32).max(1),
    )
}

/// Run [`analyze_crop`] over many images, in parallel when the `parallel`
/// feature is enabled. Results keep the input order.
#[cfg(feature = "parallel")]
pub fn analyze_batch(
    images: &[ImageBuffer],
    config: &AnalysisConfig,
) -> Vec<Result<AnalysisResult, SmartCropError>> {
    use rayon::prelude::*;

    images
        .par_iter()
        .map(|image| analyze_crop(image, config))
        .collect()
}

/// Run [`analyze_crop`] over many images. Results keep the input order.
#[cfg(not(feature = "parallel"))]
pub fn analyze_batch(
    images: &[ImageBuffer],
    config: &AnalysisConfig,
) -> Vec<Result<AnalysisResult, SmartCropError>> {
    images
        .iter()
        .map(|image| analyze_crop(image, config))
        .collect()
}

/// Cut `region` out of `image` and, when `target` is set, resize the cut to
/// exactly that size.
pub fn crop_image(image: &DynamicImage, region: CropRegion, target: Option<(u32, u32)>) -> DynamicImage {
    let x = region.x.min(image.width().saturating_sub(1));
    let y = region.y.min(image.height().saturating_sub(1));
    let width = region.width.min(image.width() - x);
    let height = region.height.min(image.height() - y);

    let cropped = image.crop_imm(x, y, width, height);
    match target {
        Some((w, h)) if (w, h) != (width, height) && w > 0 && h > 0 => {
            cropped.resize_exact(w, h, FilterType::Lanczos3)
        }
        _ => cropped,
    }
}
