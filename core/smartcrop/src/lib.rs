//! Content-aware crop selection.
//!
//! Candidate crops are scored against a per-pixel saliency map built from
//! edge detail, skin tone and colour saturation, weighted by a spatial
//! importance function (centre falloff, border penalty, rule of thirds) and
//! optionally biased by externally supplied boost regions.
//!
//! # Example
//!
//! ```no_run
//! use smartcrop::SmartCropper;
//!
//! let raw_bytes = std::fs::read("photo.jpg").unwrap();
//! let result = SmartCropper::new(&raw_bytes)
//!     .unwrap()
//!     .target_size(300, 200)
//!     .analyze()
//!     .unwrap();
//! if let Some(top) = result.top_crop {
//!     println!("crop: {:?} score {:.4}", top.rect, top.score.total);
//! }
//! ```
mod analyze;
/// Analysis configuration and boost regions.
pub mod config;
/// Candidate rectangles and their generation.
pub mod crop;
/// Pluggable boost-region detection.
pub mod detector;
/// Feature-map downsampling for the scoring grid.
pub mod downsample;
mod error;
/// Per-pixel saliency channels.
pub mod features;
/// Decoded rasters and the image-source capability.
pub mod image_buffer;
/// Candidate scoring and the importance function.
pub mod score;

use image::DynamicImage;

pub use analyze::{analyze_batch, analyze_crop, analyze_source, crop_image, AnalysisResult, DebugOutput};
pub use config::{AnalysisConfig, Boost};
pub use crop::{CropCandidate, CropRegion, Rect, Score};
pub use detector::BoostDetector;
/// Error type returned by smartcrop operations.
pub use error::SmartCropError;
pub use features::FeatureMap;
pub use image_buffer::{decode_image, ImageBuffer, ImageSource};

/// Builder that analyses one image and optionally cuts the chosen crop.
///
/// Decodes the input on construction, then runs the analysis with the
/// configured target and tuning.
pub struct SmartCropper {
    image: DynamicImage,
    config: AnalysisConfig,
    /// Extra boost source consulted right before analysis.
    detector: Option<Box<dyn BoostDetector>>,
}

impl SmartCropper {
    /// Create a cropper from encoded image bytes (JPEG, PNG, or WebP).
    pub fn new(input: &[u8]) -> Result<Self, SmartCropError> {
        let image = decode_image(input)?;
        Self::from_image(image)
    }

    /// Create a cropper from an already decoded image.
    pub fn from_image(image: DynamicImage) -> Result<Self, SmartCropError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SmartCropError::ZeroDimensions);
        }
        Ok(Self {
            image,
            config: AnalysisConfig::default(),
            detector: None,
        })
    }

    /// Replace the whole analysis config. Individual settings can be
    /// overridden after this call.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the target output size. The crop takes its aspect ratio and the
    /// cut image is resized to it by [`SmartCropper::crop`].
    pub fn target_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = Some(width as f64);
        self.config.height = Some(height as f64);
        self
    }

    /// Set the target aspect ratio (width / height) without an output size.
    pub fn aspect(mut self, aspect: f64) -> Self {
        self.config.aspect = Some(aspect);
        self
    }

    /// Set an explicit base crop size in source pixels.
    pub fn crop_size(mut self, width: u32, height: u32) -> Self {
        self.config.crop_width = Some(width);
        self.config.crop_height = Some(height);
        self
    }

    /// Set the range of candidate scales (default: 1.0 to 1.0, step 0.1).
    pub fn scale_range(mut self, min_scale: f64, max_scale: f64, scale_step: f64) -> Self {
        self.config = self.config.scale_range(min_scale, max_scale, scale_step);
        self
    }

    /// Add a boost region in source pixels.
    pub fn boost(mut self, boost: Boost) -> Self {
        self.config.boost.push(boost);
        self
    }

    /// Enable or disable the rule-of-thirds bonus (default: true).
    pub fn rule_of_thirds(mut self, enable: bool) -> Self {
        self.config.rule_of_thirds = enable;
        self
    }

    /// Enable or disable prescaling to 256px before analysis (default: true).
    pub fn prescale(mut self, enable: bool) -> Self {
        self.config.prescale = enable;
        self
    }

    /// Request debug output (default: false).
    pub fn debug(mut self, enable: bool) -> Self {
        self.config.debug = enable;
        self
    }

    /// Provide a boost detector.
    ///
    /// ```no_run
    /// use smartcrop::{Boost, BoostDetector, ImageBuffer, SmartCropper};
    ///
    /// struct CentreDetector;
    /// impl BoostDetector for CentreDetector {
    ///     fn detect(&self, image: &ImageBuffer) -> Vec<Boost> {
    ///         let (w, h) = (image.width() as f64, image.height() as f64);
    ///         vec![Boost::new(w / 4.0, h / 4.0, w / 2.0, h / 2.0, 1.0)]
    ///     }
    /// }
    ///
    /// let bytes = std::fs::read("photo.jpg").unwrap();
    /// let result = SmartCropper::new(&bytes).unwrap()
    ///     .boost_detector(Box::new(CentreDetector))
    ///     .analyze().unwrap();
    /// ```
    pub fn boost_detector(mut self, detector: Box<dyn BoostDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Width and height of the decoded image.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Run the analysis with the configured settings.
    pub fn analyze(&self) -> Result<AnalysisResult, SmartCropError> {
        match &self.detector {
            Some(detector) => {
                let raster = self.image.open()?;
                let mut config = self.config.clone();
                config.boost.extend(detector.detect(&raster));
                analyze_source(&*raster, &config)
            }
            None => analyze_source(&self.image, &self.config),
        }
    }

    /// Analyse, cut the winning crop and resize it to the target size when
    /// one was set. Falls back to the whole image when no candidate fits.
    pub fn crop(&self) -> Result<DynamicImage, SmartCropError> {
        let result = self.analyze()?;
        let (width, height) = self.dimensions();
        let region = result.top_region(width, height).unwrap_or(CropRegion {
            x: 0,
            y: 0,
            width,
            height,
        });
        let target = match (self.config.width, self.config.height) {
            (Some(w), Some(h)) if self.config.aspect.is_none() => Some((w as u32, h as u32)),
            _ => None,
        };
        Ok(crop_image(&self.image, region, target))
    }
}
