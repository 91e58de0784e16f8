use std::borrow::Cow;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::error::SmartCropError;

/// Filter used when the working image is shrunk before analysis.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Decoded RGBA raster, row-major, top to bottom.
///
/// Construction validates that both dimensions are non-zero and that the
/// buffer holds exactly `width * height * 4` bytes. The pixels cannot be
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Wrap an RGBA pixel buffer.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SmartCropError> {
        if width == 0 || height == 0 {
            return Err(SmartCropError::ZeroDimensions);
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(SmartCropError::BufferLengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// An image filled with a single RGBA colour.
    pub fn from_pixel(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, SmartCropError> {
        let len = width as usize * height as usize;
        Self::new(width, height, rgba.repeat(len))
    }

    /// Copy the pixels of an `image::RgbaImage`.
    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self, SmartCropError> {
        Self::new(image.width(), image.height(), image.as_raw().clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Copy into an `image::RgbaImage`.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(self.pixel(x, y)))
    }
}

/// Host capability that hands the analysis a decoded raster.
///
/// `open` yields the full-resolution raster; `resample` yields a resized one
/// and is only called when the working image is prescaled.
pub trait ImageSource {
    /// Width and height of the full-resolution image.
    fn dimensions(&self) -> (u32, u32);

    /// The full-resolution raster.
    fn open(&self) -> Result<Cow<'_, ImageBuffer>, SmartCropError>;

    /// A raster resized to exactly `width` x `height`.
    fn resample(&self, width: u32, height: u32) -> Result<ImageBuffer, SmartCropError>;
}

impl ImageSource for ImageBuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn open(&self) -> Result<Cow<'_, ImageBuffer>, SmartCropError> {
        Ok(Cow::Borrowed(self))
    }

    fn resample(&self, width: u32, height: u32) -> Result<ImageBuffer, SmartCropError> {
        if (width, height) == self.dimensions() {
            return Ok(self.clone());
        }
        let resized =
            image::imageops::resize(&self.to_rgba_image(), width, height, RESAMPLE_FILTER);
        ImageBuffer::from_rgba_image(&resized)
    }
}

impl ImageSource for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn open(&self) -> Result<Cow<'_, ImageBuffer>, SmartCropError> {
        ImageBuffer::from_rgba_image(&self.to_rgba8()).map(Cow::Owned)
    }

    fn resample(&self, width: u32, height: u32) -> Result<ImageBuffer, SmartCropError> {
        let resized = self.resize_exact(width, height, RESAMPLE_FILTER);
        ImageBuffer::from_rgba_image(&resized.to_rgba8())
    }
}

/// Decode JPEG, PNG or WebP bytes.
pub fn decode_image(input: &[u8]) -> Result<DynamicImage, SmartCropError> {
    image::load_from_memory(input).map_err(|e| SmartCropError::DecodeError(e.to_string()))
}
