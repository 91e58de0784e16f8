use crate::error::SmartCropError;

/// Externally supplied salient rectangle, e.g. from a face detector.
///
/// Every pixel it covers gains `weight * 255` in the boost channel of the
/// feature map. Overlapping boosts accumulate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Boost {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

impl Boost {
    pub fn new(x: f64, y: f64, width: f64, height: f64, weight: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            weight,
        }
    }

    /// Scale the geometry by `factor`, truncating to whole pixels. The weight
    /// is kept.
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            x: (self.x * factor).trunc(),
            y: (self.y * factor).trunc(),
            width: (self.width * factor).trunc(),
            height: (self.height * factor).trunc(),
            weight: self.weight,
        }
    }
}

/// Weights, thresholds and scale bounds for one analysis.
///
/// The defaults are the stock tuning. A config is never mutated by
/// the analysis; each run works on its own normalized copy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct AnalysisConfig {
    /// Target output width. Together with `height` it fixes the crop aspect.
    pub width: Option<f64>,
    /// Target output height.
    pub height: Option<f64>,
    /// Target aspect ratio; when set it overrides `width`/`height` as
    /// `width = aspect, height = 1`.
    pub aspect: Option<f64>,
    /// Explicit base crop width in working-image pixels.
    pub crop_width: Option<u32>,
    /// Explicit base crop height in working-image pixels.
    pub crop_height: Option<u32>,

    pub detail_weight: f64,
    /// Skin tone compared against each pixel's unit RGB direction.
    pub skin_color: [f64; 3],
    pub skin_bias: f64,
    pub skin_brightness_min: f64,
    pub skin_brightness_max: f64,
    pub skin_threshold: f64,
    pub skin_weight: f64,

    pub saturation_brightness_min: f64,
    pub saturation_brightness_max: f64,
    pub saturation_threshold: f64,
    pub saturation_bias: f64,
    pub saturation_weight: f64,

    /// Block size of the scoring grid.
    pub score_down_sample: u32,
    /// Candidate stride in working-image pixels.
    pub step: u32,
    pub scale_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,

    /// Fraction of the crop, measured from its border, penalized by `edge_weight`.
    pub edge_radius: f64,
    pub edge_weight: f64,
    /// Importance of samples lying outside a candidate.
    pub outside_importance: f64,
    pub boost_weight: f64,
    pub rule_of_thirds: bool,

    /// Shrink large images to 256px on the long edge before analysis.
    pub prescale: bool,
    pub boost: Vec<Boost>,
    /// Return every candidate, the feature map and the resolved config.
    pub debug: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            aspect: None,
            crop_width: None,
            crop_height: None,
            detail_weight: 0.2,
            skin_color: [0.78, 0.57, 0.44],
            skin_bias: 0.01,
            skin_brightness_min: 0.2,
            skin_brightness_max: 1.0,
            skin_threshold: 0.8,
            skin_weight: 1.8,
            saturation_brightness_min: 0.05,
            saturation_brightness_max: 0.9,
            saturation_threshold: 0.4,
            saturation_bias: 0.2,
            saturation_weight: 0.1,
            score_down_sample: 8,
            step: 8,
            scale_step: 0.1,
            min_scale: 1.0,
            max_scale: 1.0,
            edge_radius: 0.4,
            edge_weight: -20.0,
            outside_importance: -0.5,
            boost_weight: 100.0,
            rule_of_thirds: true,
            prescale: true,
            boost: Vec::new(),
            debug: false,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target output size; the crop takes its aspect ratio (default: unset).
    pub fn target_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the target aspect ratio, width / height. Overrides `target_size`
    /// (default: unset).
    pub fn aspect(mut self, aspect: f64) -> Self {
        self.aspect = Some(aspect);
        self
    }

    /// Set an explicit base crop size in working-image pixels (default: the
    /// shorter image side, square).
    pub fn crop_size(mut self, width: u32, height: u32) -> Self {
        self.crop_width = Some(width);
        self.crop_height = Some(height);
        self
    }

    /// Set the stride between candidate positions in pixels (default: 8).
    pub fn step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    /// Set the block size of the scoring grid (default: 8).
    pub fn score_down_sample(mut self, factor: u32) -> Self {
        self.score_down_sample = factor;
        self
    }

    /// Set the range of candidate scales and the step between them
    /// (default: 1.0 to 1.0, step 0.1).
    pub fn scale_range(mut self, min_scale: f64, max_scale: f64, scale_step: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self.scale_step = scale_step;
        self
    }

    /// Add a boost region in source-image pixels.
    pub fn boost(mut self, boost: Boost) -> Self {
        self.boost.push(boost);
        self
    }

    /// Set the weight of the boost channel in the total score (default: 100.0).
    pub fn boost_weight(mut self, weight: f64) -> Self {
        self.boost_weight = weight;
        self
    }

    /// Enable or disable the rule-of-thirds bonus (default: true).
    pub fn rule_of_thirds(mut self, enable: bool) -> Self {
        self.rule_of_thirds = enable;
        self
    }

    /// Enable or disable prescaling to 256px before analysis (default: true).
    pub fn prescale(mut self, enable: bool) -> Self {
        self.prescale = enable;
        self
    }

    /// Enable or disable debug output (default: false).
    pub fn debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Check preconditions and return the copy the analysis runs on.
    ///
    /// An inverted scale range is swapped rather than rejected. Everything
    /// else that would make the analysis meaningless (zero strides, a
    /// threshold of 1 or more, non-finite numbers) is an `InvalidConfig`.
    pub fn normalized(&self) -> Result<Self, SmartCropError> {
        let mut config = self.clone();

        if config.min_scale > config.max_scale {
            std::mem::swap(&mut config.min_scale, &mut config.max_scale);
        }

        let numbers = [
            ("detailWeight", config.detail_weight),
            ("skinColor[0]", config.skin_color[0]),
            ("skinColor[1]", config.skin_color[1]),
            ("skinColor[2]", config.skin_color[2]),
            ("skinBias", config.skin_bias),
            ("skinBrightnessMin", config.skin_brightness_min),
            ("skinBrightnessMax", config.skin_brightness_max),
            ("skinThreshold", config.skin_threshold),
            ("skinWeight", config.skin_weight),
            ("saturationBrightnessMin", config.saturation_brightness_min),
            ("saturationBrightnessMax", config.saturation_brightness_max),
            ("saturationThreshold", config.saturation_threshold),
            ("saturationBias", config.saturation_bias),
            ("saturationWeight", config.saturation_weight),
            ("scaleStep", config.scale_step),
            ("minScale", config.min_scale),
            ("maxScale", config.max_scale),
            ("edgeRadius", config.edge_radius),
            ("edgeWeight", config.edge_weight),
            ("outsideImportance", config.outside_importance),
            ("boostWeight", config.boost_weight),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }

        for (name, value) in [
            ("width", config.width),
            ("height", config.height),
            ("aspect", config.aspect),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(invalid(format!("{name} must be > 0, got {v}")));
                }
            }
        }
        if config.crop_width == Some(0) || config.crop_height == Some(0) {
            return Err(invalid("crop dimensions must be > 0".to_string()));
        }

        if config.step == 0 {
            return Err(invalid("step must be > 0".to_string()));
        }
        if config.score_down_sample == 0 {
            return Err(invalid("scoreDownSample must be > 0".to_string()));
        }
        if config.scale_step <= 0.0 {
            return Err(invalid(format!(
                "scaleStep must be > 0, got {}",
                config.scale_step
            )));
        }
        if config.min_scale <= 0.0 {
            return Err(invalid(format!(
                "minScale must be > 0, got {}",
                config.min_scale
            )));
        }
        if config.skin_threshold >= 1.0 {
            return Err(invalid(format!(
                "skinThreshold must be < 1, got {}",
                config.skin_threshold
            )));
        }
        if config.saturation_threshold >= 1.0 {
            return Err(invalid(format!(
                "saturationThreshold must be < 1, got {}",
                config.saturation_threshold
            )));
        }
        if let Some(boost) = config.boost.iter().find(|b| {
            ![b.x, b.y, b.width, b.height, b.weight]
                .iter()
                .all(|v| v.is_finite())
        }) {
            return Err(invalid(format!("boost values must be finite: {boost:?}")));
        }

        Ok(config)
    }
}

fn invalid(message: String) -> SmartCropError {
    SmartCropError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_tuning() {
        let config = AnalysisConfig::default();
        assert_eq!(config.detail_weight, 0.2);
        assert_eq!(config.skin_color, [0.78, 0.57, 0.44]);
        assert_eq!(config.skin_weight, 1.8);
        assert_eq!(config.score_down_sample, 8);
        assert_eq!(config.step, 8);
        assert_eq!(config.edge_weight, -20.0);
        assert_eq!(config.outside_importance, -0.5);
        assert_eq!(config.boost_weight, 100.0);
        assert!(config.rule_of_thirds);
        assert!(config.prescale);
        assert!(!config.debug);
        assert!(config.boost.is_empty());
    }

    #[test]
    fn inverted_scale_range_is_swapped() {
        let config = AnalysisConfig::new()
            .scale_range(1.0, 0.6, 0.1)
            .normalized()
            .unwrap();
        assert_eq!(config.min_scale, 0.6);
        assert_eq!(config.max_scale, 1.0);
    }

    #[test]
    fn normalized_leaves_original_untouched() {
        let original = AnalysisConfig::new().scale_range(1.0, 0.5, 0.1);
        let _ = original.normalized().unwrap();
        assert_eq!(original.min_scale, 1.0);
        assert_eq!(original.max_scale, 0.5);
    }

    #[test]
    fn negative_weights_are_allowed() {
        let config = AnalysisConfig {
            skin_weight: -1.0,
            boost_weight: -5.0,
            ..AnalysisConfig::default()
        };
        assert!(config.normalized().is_ok());
    }

    #[test]
    fn zero_step_is_rejected() {
        let result = AnalysisConfig::new().step(0).normalized();
        assert!(matches!(result, Err(SmartCropError::InvalidConfig(_))));
    }

    #[test]
    fn zero_score_down_sample_is_rejected() {
        let result = AnalysisConfig::new().score_down_sample(0).normalized();
        assert!(matches!(result, Err(SmartCropError::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_scale_step_is_rejected() {
        let result = AnalysisConfig::new().scale_range(0.5, 1.0, 0.0).normalized();
        assert!(matches!(result, Err(SmartCropError::InvalidConfig(_))));
    }

    #[test]
    fn threshold_of_one_is_rejected() {
        let config = AnalysisConfig {
            skin_threshold: 1.0,
            ..AnalysisConfig::default()
        };
        assert!(config.normalized().is_err());

        let config = AnalysisConfig {
            saturation_threshold: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(config.normalized().is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let config = AnalysisConfig {
            edge_radius: f64::NAN,
            ..AnalysisConfig::default()
        };
        let err = config.normalized().unwrap_err();
        assert!(err.to_string().contains("edgeRadius"));

        let config = AnalysisConfig::new().boost(Boost::new(0.0, 0.0, f64::INFINITY, 1.0, 1.0));
        assert!(config.normalized().is_err());
    }

    #[test]
    fn non_positive_target_is_rejected() {
        assert!(AnalysisConfig::new()
            .target_size(0.0, 10.0)
            .normalized()
            .is_err());
        assert!(AnalysisConfig::new().aspect(-1.0).normalized().is_err());
        assert!(AnalysisConfig::new().crop_size(0, 10).normalized().is_err());
    }

    #[test]
    fn boost_scaling_truncates_geometry_and_keeps_weight() {
        let boost = Boost::new(10.0, 15.0, 33.0, 7.0, 0.75);
        let scaled = boost.scaled(0.5);
        assert_eq!(scaled, Boost::new(5.0, 7.0, 16.0, 3.0, 0.75));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_camel_case_with_defaults() {
        let json = r#"{"cropWidth": 100, "cropHeight": 50, "ruleOfThirds": false,
            "boost": [{"x": 1, "y": 2, "width": 3, "height": 4, "weight": 0.5}]}"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.crop_width, Some(100));
        assert_eq!(config.crop_height, Some(50));
        assert!(!config.rule_of_thirds);
        assert_eq!(config.boost, vec![Boost::new(1.0, 2.0, 3.0, 4.0, 0.5)]);
        assert_eq!(config.skin_weight, 1.8);
    }
}
