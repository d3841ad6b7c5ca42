//! The [`Image`] wrapper.
//!
//! An `Image` owns one [`Bitmap`] plus the output configuration used when
//! it is encoded. Every raster operation is a `&mut self` method that
//! returns the same handle, so calls chain:
//!
//! ```rust
//! use pixmill::{Image, ResizeMode, AUTO};
//!
//! let mut img = Image::filled(200, 400, 0x3366CCFF);
//! img.resize(AUTO, 100, ResizeMode::Bilinear)?
//!     .greyscale()
//!     .brightness(0.2)?
//!     .flip(true, false);
//! assert_eq!(img.dimensions(), (50, 100));
//! # Ok::<(), pixmill::Error>(())
//! ```
//!
//! Fallible methods validate their arguments first; on error the image is
//! left exactly as it was.

use std::path::Path;

use pixmill_compare::{phash, Phash};
use pixmill_core::{Bitmap, Rect};
use pixmill_io::{EncodeOptions, IoError, Mime, PngFilter};
use pixmill_ops::{
    adjust, color, composite, dither, filter, resize, transform, AutocropOptions, ColorAction, Dim,
    ResizeMode,
};
use tracing::debug;

use crate::Result;

/// An RGBA raster image with chainable operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    bitmap: Bitmap,
    options: EncodeOptions,
    mime: Option<Mime>,
}

impl Image {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_bitmap(Bitmap::new(width, height))
    }

    /// Image filled with a packed `0xRRGGBBAA` color.
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        Self::from_bitmap(Bitmap::filled(width, height, color))
    }

    /// Wraps an existing bitmap with default output settings.
    pub fn from_bitmap(bitmap: Bitmap) -> Self {
        Self {
            bitmap,
            options: EncodeOptions::default(),
            mime: None,
        }
    }

    /// Decodes PNG, JPEG or BMP bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mime = Mime::from_magic(bytes);
        let bitmap = pixmill_io::decode(bytes)?;
        Ok(Self {
            mime,
            ..Self::from_bitmap(bitmap)
        })
    }

    /// Loads an image from a file path.
    pub fn read(locator: &str) -> Result<Self> {
        let bytes = pixmill_io::fetch_bytes(locator)?;
        debug!(locator, len = bytes.len(), "read");
        Self::from_bytes(&bytes)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The underlying bitmap.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Mutable access to the underlying bitmap.
    pub fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bitmap
    }

    /// Unwraps the bitmap.
    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }

    /// MIME type the image was decoded from, if any.
    pub fn original_mime(&self) -> Option<Mime> {
        self.mime
    }

    /// Byte offset of pixel `(x, y)`, or `None` off-canvas.
    pub fn get_pixel_index(&self, x: i64, y: i64) -> Option<usize> {
        self.bitmap.pixel_index(x, y)
    }

    /// Packed color at `(x, y)`.
    pub fn get_pixel_color(&self, x: i64, y: i64) -> Result<u32> {
        Ok(self.bitmap.get_pixel_color(x, y)?)
    }

    /// Alias of [`Image::get_pixel_color`].
    pub fn get_pixel_colour(&self, x: i64, y: i64) -> Result<u32> {
        self.get_pixel_color(x, y)
    }

    /// Writes a packed color at `(x, y)`.
    pub fn set_pixel_color(&mut self, color: u32, x: i64, y: i64) -> Result<&mut Self> {
        self.bitmap.set_pixel_color(color, x, y)?;
        Ok(self)
    }

    /// Alias of [`Image::set_pixel_color`].
    pub fn set_pixel_colour(&mut self, color: u32, x: i64, y: i64) -> Result<&mut Self> {
        self.set_pixel_color(color, x, y)
    }

    /// Visits each on-canvas pixel of a region with `(x, y, byte_index)`.
    pub fn scan<F>(&self, x: i64, y: i64, w: u32, h: u32, visit: F) -> &Self
    where
        F: FnMut(u32, u32, usize),
    {
        self.bitmap.scan(x, y, w, h, visit);
        self
    }

    /// Visits each on-canvas pixel of a region with its 4 mutable bytes.
    pub fn scan_mut<F>(&mut self, x: i64, y: i64, w: u32, h: u32, visit: F) -> &mut Self
    where
        F: FnMut(u32, u32, &mut [u8]),
    {
        self.bitmap.scan_mut(x, y, w, h, visit);
        self
    }

    // ========================================================================
    // Output configuration
    // ========================================================================

    /// Current encoder settings.
    pub fn encode_options(&self) -> &EncodeOptions {
        &self.options
    }

    /// JPEG quality, `0..=100`.
    pub fn quality(&mut self, quality: u8) -> Result<&mut Self> {
        let options = self.options.with_quality(quality);
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// PNG deflate level, `0..=9`.
    pub fn deflate_level(&mut self, level: u8) -> Result<&mut Self> {
        let options = self.options.with_deflate_level(level);
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// PNG row filter.
    pub fn filter_type(&mut self, filter: PngFilter) -> &mut Self {
        self.options.filter_type = filter;
        self
    }

    /// Keep (`true`) or flatten (`false`) alpha on PNG and BMP output.
    pub fn rgba(&mut self, use_alpha: bool) -> &mut Self {
        self.options.use_alpha = use_alpha;
        self
    }

    /// Background color for flattening, rotation and padding.
    pub fn background(&mut self, color: u32) -> &mut Self {
        self.options.background = color;
        self
    }

    /// Alias of [`Image::background`].
    pub fn background_colour(&mut self, color: u32) -> &mut Self {
        self.background(color)
    }

    // ========================================================================
    // Resampling
    // ========================================================================

    /// Resizes to `width` x `height`; either side may be [`crate::AUTO`].
    ///
    /// Asking for the current size leaves the pixels untouched.
    pub fn resize(
        &mut self,
        width: impl Into<Dim>,
        height: impl Into<Dim>,
        mode: ResizeMode,
    ) -> Result<&mut Self> {
        self.bitmap = resize::resize(&self.bitmap, width.into(), height.into(), mode)?;
        Ok(self)
    }

    /// Scales both sides by `factor`.
    pub fn scale(&mut self, factor: f64, mode: ResizeMode) -> Result<&mut Self> {
        self.bitmap = resize::scale(&self.bitmap, factor, mode)?;
        Ok(self)
    }

    /// Largest aspect-preserving size that fits in `width` x `height`.
    pub fn scale_to_fit(&mut self, width: u32, height: u32, mode: ResizeMode) -> Result<&mut Self> {
        self.bitmap = resize::scale_to_fit(&self.bitmap, width, height, mode)?;
        Ok(self)
    }

    /// Fills `width` x `height` exactly, cropping the overflow around the center.
    pub fn cover(&mut self, width: u32, height: u32, mode: ResizeMode) -> Result<&mut Self> {
        self.bitmap = resize::cover(&self.bitmap, width, height, mode)?;
        Ok(self)
    }

    /// Fits inside `width` x `height`, centered and padded with the background.
    pub fn contain(&mut self, width: u32, height: u32, mode: ResizeMode) -> Result<&mut Self> {
        self.bitmap =
            resize::contain(&self.bitmap, width, height, mode, self.options.background)?;
        Ok(self)
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Keeps the `w` x `h` region at `(x, y)`. Off-canvas parts take the background.
    pub fn crop(&mut self, x: i64, y: i64, w: u32, h: u32) -> Result<&mut Self> {
        self.bitmap = transform::crop(&self.bitmap, x, y, w, h, self.options.background)?;
        Ok(self)
    }

    /// Strips uniform borders using default tolerance.
    pub fn autocrop(&mut self) -> Result<&mut Self> {
        self.autocrop_with(&AutocropOptions::default())
    }

    /// Strips uniform borders.
    pub fn autocrop_with(&mut self, options: &AutocropOptions) -> Result<&mut Self> {
        self.bitmap = transform::autocrop(&self.bitmap, options)?;
        Ok(self)
    }

    /// Mirrors horizontally and/or vertically.
    pub fn flip(&mut self, horizontal: bool, vertical: bool) -> &mut Self {
        transform::flip(&mut self.bitmap, horizontal, vertical);
        self
    }

    /// Alias of [`Image::flip`].
    pub fn mirror(&mut self, horizontal: bool, vertical: bool) -> &mut Self {
        self.flip(horizontal, vertical)
    }

    /// Rotates clockwise by `degrees`.
    ///
    /// With `resize_canvas` the canvas grows to hold the whole result;
    /// otherwise it keeps its size and the corners are clipped. Uncovered
    /// pixels take the background color.
    pub fn rotate(&mut self, degrees: f64, resize_canvas: bool) -> Result<&mut Self> {
        self.bitmap =
            transform::rotate(&self.bitmap, degrees, resize_canvas, self.options.background)?;
        Ok(self)
    }

    // ========================================================================
    // Compositing
    // ========================================================================

    /// Copies `src` onto this image with its origin at `(x, y)`.
    pub fn blit(&mut self, src: &Image, x: i64, y: i64) -> &mut Self {
        composite::blit(&mut self.bitmap, &src.bitmap, x, y, None);
        self
    }

    /// Copies the `region` of `src` onto this image with its corner at `(x, y)`.
    pub fn blit_region(&mut self, src: &Image, x: i64, y: i64, region: Rect) -> &mut Self {
        composite::blit(&mut self.bitmap, &src.bitmap, x, y, Some(region));
        self
    }

    /// Draws `src` over this image at `(x, y)` with source-over blending.
    pub fn composite(&mut self, src: &Image, x: i64, y: i64) -> &mut Self {
        composite::composite(&mut self.bitmap, &src.bitmap, x, y);
        self
    }

    /// Scales alpha by the brightness of `src` placed at `(x, y)`.
    pub fn mask(&mut self, src: &Image, x: i64, y: i64) -> &mut Self {
        composite::mask(&mut self.bitmap, &src.bitmap, x, y);
        self
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Gaussian blur, `radius >= 1`.
    pub fn gaussian(&mut self, radius: f64) -> Result<&mut Self> {
        filter::gaussian(&mut self.bitmap, radius)?;
        Ok(self)
    }

    /// Fast box blur, `radius >= 1`.
    pub fn blur(&mut self, radius: u32) -> Result<&mut Self> {
        filter::blur(&mut self.bitmap, radius)?;
        Ok(self)
    }

    /// Brightness shift in `[-1, 1]`.
    pub fn brightness(&mut self, value: f64) -> Result<&mut Self> {
        adjust::brightness(&mut self.bitmap, value)?;
        Ok(self)
    }

    /// Contrast change in `[-1, 1]`.
    pub fn contrast(&mut self, value: f64) -> Result<&mut Self> {
        adjust::contrast(&mut self.bitmap, value)?;
        Ok(self)
    }

    /// Reduces each channel to `levels` values, `levels >= 2`.
    pub fn posterize(&mut self, levels: u32) -> Result<&mut Self> {
        adjust::posterize(&mut self.bitmap, levels)?;
        Ok(self)
    }

    /// Inverts RGB.
    pub fn invert(&mut self) -> &mut Self {
        adjust::invert(&mut self.bitmap);
        self
    }

    /// BT.709 luma greyscale.
    pub fn greyscale(&mut self) -> &mut Self {
        adjust::greyscale(&mut self.bitmap);
        self
    }

    /// Alias of [`Image::greyscale`].
    pub fn grayscale(&mut self) -> &mut Self {
        self.greyscale()
    }

    /// Sepia tone.
    pub fn sepia(&mut self) -> &mut Self {
        adjust::sepia(&mut self.bitmap);
        self
    }

    /// Multiplies alpha by `factor` in `[0, 1]`.
    pub fn opacity(&mut self, factor: f64) -> Result<&mut Self> {
        adjust::opacity(&mut self.bitmap, factor)?;
        Ok(self)
    }

    /// Multiplies alpha by `1 - amount`.
    pub fn fade(&mut self, amount: f64) -> Result<&mut Self> {
        adjust::fade(&mut self.bitmap, amount)?;
        Ok(self)
    }

    /// Sets every alpha to 255.
    pub fn opaque(&mut self) -> &mut Self {
        adjust::opaque(&mut self.bitmap);
        self
    }

    /// Ordered dither to RGB565.
    pub fn dither565(&mut self) -> &mut Self {
        dither::dither565(&mut self.bitmap);
        self
    }

    /// Alias of [`Image::dither565`].
    pub fn dither16(&mut self) -> &mut Self {
        dither::dither16(&mut self.bitmap);
        self
    }

    /// Runs a color pipeline. Nothing changes if any action is invalid.
    pub fn color(&mut self, actions: &[ColorAction]) -> Result<&mut Self> {
        color::apply_actions(&mut self.bitmap, actions)?;
        Ok(self)
    }

    /// Alias of [`Image::color`].
    pub fn colour(&mut self, actions: &[ColorAction]) -> Result<&mut Self> {
        self.color(actions)
    }

    // ========================================================================
    // Hashing
    // ========================================================================

    /// Perceptual hash value.
    pub fn phash(&self) -> Result<Phash> {
        Ok(phash(&self.bitmap)?)
    }

    /// Perceptual hash printed in `radix` (2 to 64).
    pub fn hash(&self, radix: u32) -> Result<String> {
        Ok(self.phash()?.to_radix(radix)?)
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Encodes with the current output settings.
    pub fn encode(&self, mime: Mime) -> Result<Vec<u8>> {
        Ok(pixmill_io::encode(&self.bitmap, mime, &self.options)?)
    }

    /// Encodes and writes to `path`, picking the format from its extension.
    pub fn write<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        let mime = Mime::from_path(path).ok_or_else(|| {
            IoError::UnsupportedFormat(format!("no known format for '{}'", path.display()))
        })?;
        let bytes = self.encode(mime)?;
        std::fs::write(path, &bytes).map_err(IoError::from)?;
        debug!(path = %path.display(), mime = %mime, len = bytes.len(), "write");
        Ok(self)
    }
}

impl From<Bitmap> for Image {
    fn from(bitmap: Bitmap) -> Self {
        Self::from_bitmap(bitmap)
    }
}

impl From<Image> for Bitmap {
    fn from(image: Image) -> Self {
        image.bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_returns_same_handle() {
        let mut img = Image::filled(4, 4, 0x808080FF);
        let ptr: *const Image = &img;
        let out: *const Image = img.invert().sepia().opaque();
        assert_eq!(ptr, out);
    }

    #[test]
    fn test_failed_op_keeps_state() {
        let mut img = Image::filled(6, 3, 0x123456FF);
        let before = img.clone();
        assert!(img.posterize(0).is_err());
        assert!(img.resize(Dim::Auto, Dim::Auto, ResizeMode::Bilinear).is_err());
        assert!(img.quality(101).is_err());
        assert!(img.deflate_level(12).is_err());
        assert_eq!(img, before);
    }

    #[test]
    fn test_config_setters() {
        let mut img = Image::new(2, 2);
        img.quality(60)
            .unwrap()
            .deflate_level(3)
            .unwrap()
            .filter_type(PngFilter::Paeth)
            .rgba(false)
            .background(0xFFFFFFFF);
        let opts = img.encode_options();
        assert_eq!(opts.quality, 60);
        assert_eq!(opts.deflate_level, 3);
        assert_eq!(opts.filter_type, PngFilter::Paeth);
        assert!(!opts.use_alpha);
        assert_eq!(opts.background, 0xFFFFFFFF);
    }

    #[test]
    fn test_background_fills_crop_outside() {
        let mut img = Image::filled(2, 2, 0xFF0000FF);
        img.background(0x0000FFFF).crop(1, 1, 2, 2).unwrap();
        assert_eq!(img.get_pixel_color(0, 0).unwrap(), 0xFF0000FF);
        assert_eq!(img.get_pixel_color(1, 1).unwrap(), 0x0000FFFF);
    }

    #[test]
    fn test_clone_is_independent() {
        let img = Image::filled(3, 3, 0x00FF00FF);
        let mut copy = img.clone();
        copy.invert();
        assert_eq!(img.get_pixel_color(0, 0).unwrap(), 0x00FF00FF);
        assert_eq!(copy.get_pixel_color(0, 0).unwrap(), 0xFF00FFFF);
    }
}
