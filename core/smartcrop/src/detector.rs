use crate::config::Boost;
use crate::image_buffer::ImageBuffer;

/// Pluggable source of boost regions.
///
/// Implement this trait to feed an external detector (faces, objects, text)
/// into the analysis and pass it to [`crate::SmartCropper::boost_detector`].
/// Returned boosts are in the coordinates of the raster passed in.
pub trait BoostDetector: Send + Sync {
    /// Detect salient regions in a full-resolution RGBA raster.
    fn detect(&self, image: &ImageBuffer) -> Vec<Boost>;
}

impl<F> BoostDetector for F
where
    F: Fn(&ImageBuffer) -> Vec<Boost> + Send + Sync,
{
    fn detect(&self, image: &ImageBuffer) -> Vec<Boost> {
        self(image)
    }
}
