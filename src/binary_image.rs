
use crate::error::{Error, Result};

/// Represents an image with each pixel being either true or false,
/// corresponding to inside-the-shape and outside-of-the-shape respectively.
/// BinaryImages can be created from byte slices
/// or piston images if the feature `piston_image` is activated.
pub trait BinaryImage {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn is_inside(&self, x: u32, y: u32) -> bool;
}

/// An image which is described by a slice of bytes with one byte per pixel.
/// To determine if a byte is inside or outside,
/// it is compared to a threshold. The default threshold is 127.
#[derive(Clone, Copy, Debug)]
pub struct BinaryByteImage<'b> {
    width: u32,
    height: u32,

    /// A row-major image vector with one byte per pixel.
    buffer: &'b [u8],

    /// A pixel must be brighter than this value
    /// in order to be inside the shape.
    /// Pixels exactly at the threshold are outside.
    threshold: u8,
}


impl<'b> BinaryByteImage<'b> {
    /// Create a binary byte image with a threshold of 127
    pub fn from_slice(width: u32, height: u32, buffer: &'b [u8]) -> Result<Self> {
        Self::from_slice_with_threshold(width, height, buffer, 127)
    }

    /// Create a binary byte image from the buffer
    /// with all pixels brighter than the threshold being inside-the-shape.
    pub fn from_slice_with_threshold(width: u32, height: u32, buffer: &'b [u8], threshold: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "source image is {}x{} pixels, but must not be empty", width, height
            )));
        }

        let expected = width as usize * height as usize;
        if buffer.len() != expected {
            return Err(Error::InvalidInput(format!(
                "{}x{} pixels require {} bytes, but the buffer has {} bytes",
                width, height, expected, buffer.len()
            )));
        }

        Ok(BinaryByteImage { width, height, buffer, threshold })
    }
}

impl BinaryImage for BinaryByteImage<'_> {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn is_inside(&self, x: u32, y: u32) -> bool {
        self.buffer[self.width as usize * y as usize + x as usize] > self.threshold
    }
}


/// The classified source, stored with one flag per pixel.
/// It is created once per run and only read afterwards,
/// which allows all output cells to search it concurrently.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceMask {
    width: u32,
    height: u32,

    /// Row-major inside flags.
    inside: Vec<bool>,
}

impl SourceMask {
    /// Classify every pixel of the binary image once.
    pub fn classify(image: &impl BinaryImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());

        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "source image is {}x{} pixels, but must not be empty", width, height
            )));
        }

        let mut inside = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                inside.push(image.is_inside(x, y));
            }
        }

        Ok(SourceMask { width, height, inside })
    }

    /// Classify a byte buffer with one byte per pixel.
    pub fn from_bytes(width: u32, height: u32, buffer: &[u8], threshold: u8) -> Result<Self> {
        let image = BinaryByteImage::from_slice_with_threshold(width, height, buffer, threshold)?;
        Self::classify(&image)
    }

    /// Build a mask from a predicate, mostly useful for synthetic shapes.
    pub fn from_fn(width: u32, height: u32, is_inside: impl Fn(u32, u32) -> bool) -> Result<Self> {
        struct FnImage<F> { width: u32, height: u32, is_inside: F }

        impl<F: Fn(u32, u32) -> bool> BinaryImage for FnImage<F> {
            fn width(&self) -> u32 { self.width }
            fn height(&self) -> u32 { self.height }
            fn is_inside(&self, x: u32, y: u32) -> bool { (self.is_inside)(x, y) }
        }

        Self::classify(&FnImage { width, height, is_inside })
    }

    /// Whether every pixel belongs to the same class.
    pub fn is_uniform(&self) -> bool {
        self.inside.windows(2).all(|pair| pair[0] == pair[1])
    }
}

impl BinaryImage for SourceMask {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn is_inside(&self, x: u32, y: u32) -> bool {
        self.inside[self.width as usize * y as usize + x as usize]
    }
}


/// Create binary images from piston images.
#[cfg(feature = "piston_image")]
pub mod piston_image {
    use image::{DynamicImage, GenericImageView, GrayImage};
    use crate::error::Result;
    use crate::options::Channel;
    use super::SourceMask;

    /// Classify a grey-scale piston image
    /// with all pixels brighter than 127 being inside-the-shape.
    pub fn of_gray_u8_image(image: &GrayImage) -> Result<SourceMask> {
        of_gray_u8_image_with_threshold(image, 127)
    }

    /// Classify a grey-scale piston image
    /// with all pixels brighter than the threshold being inside-the-shape.
    pub fn of_gray_u8_image_with_threshold(image: &GrayImage, threshold: u8) -> Result<SourceMask> {
        SourceMask::from_bytes(image.width(), image.height(), image.as_raw(), threshold)
    }

    /// Classify one channel of a grey-scale piston image.
    /// Red is the grey value itself, and grey-scale images are fully opaque.
    pub fn of_gray_u8_image_with_channel(image: &GrayImage, channel: Channel, threshold: u8) -> Result<SourceMask> {
        match channel {
            Channel::Luma | Channel::Red => of_gray_u8_image_with_threshold(image, threshold),
            Channel::Alpha => SourceMask::from_fn(image.width(), image.height(), |_, _| u8::MAX > threshold),
        }
    }

    /// Classify one channel of any decoded image.
    pub fn of_dynamic_image(image: &DynamicImage, channel: Channel, threshold: u8) -> Result<SourceMask> {
        let channel_bytes: Vec<u8> = match channel {
            Channel::Luma => return of_gray_u8_image_with_threshold(&image.to_luma8(), threshold),
            Channel::Alpha => image.to_rgba8().pixels().map(|pixel| pixel.0[3]).collect(),
            Channel::Red => image.to_rgba8().pixels().map(|pixel| pixel.0[0]).collect(),
        };

        let (width, height) = image.dimensions();
        SourceMask::from_bytes(width, height, &channel_bytes, threshold)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive(){
        let bytes = [ 0, 126, 127, 128, 255, 127 ];
        let image = BinaryByteImage::from_slice(3, 2, &bytes).unwrap();

        assert!(!image.is_inside(0, 0));
        assert!(!image.is_inside(1, 0));
        assert!(!image.is_inside(2, 0), "pixels at the threshold are outside");
        assert!(image.is_inside(0, 1));
        assert!(image.is_inside(1, 1));
        assert!(!image.is_inside(2, 1));
    }

    #[test]
    fn custom_threshold(){
        let bytes = [ 10, 11 ];
        let mask = SourceMask::from_bytes(2, 1, &bytes, 10).unwrap();

        assert!(!mask.is_inside(0, 0));
        assert!(mask.is_inside(1, 0));
        assert!(!mask.is_uniform());
    }

    #[test]
    fn rejects_empty_images(){
        match SourceMask::from_bytes(0, 4, &[], 127) {
            Err(Error::InvalidInput(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_mismatched_buffers(){
        assert!(BinaryByteImage::from_slice(4, 4, &[0; 15]).is_err());
    }

    #[test]
    fn mask_from_predicate(){
        let mask = SourceMask::from_fn(4, 3, |x, y| x == 1 && y == 2).unwrap();

        assert_eq!(mask.width(), 4);
        assert_eq!(mask.height(), 3);
        assert!(mask.is_inside(1, 2));
        assert!(!mask.is_inside(2, 1));
    }

    #[cfg(feature = "piston_image")]
    #[test]
    fn classifies_selected_channel(){
        use image::{DynamicImage, Rgba, RgbaImage};
        use crate::options::Channel;

        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([ 255, 0, 0, 0 ]));
        rgba.put_pixel(1, 0, Rgba([ 0, 0, 0, 255 ]));
        let image = DynamicImage::ImageRgba8(rgba);

        let alpha = piston_image::of_dynamic_image(&image, Channel::Alpha, 127).unwrap();
        assert!(!alpha.is_inside(0, 0));
        assert!(alpha.is_inside(1, 0));

        let red = piston_image::of_dynamic_image(&image, Channel::Red, 127).unwrap();
        assert!(red.is_inside(0, 0));
        assert!(!red.is_inside(1, 0));
    }

    #[cfg(feature = "piston_image")]
    #[test]
    fn gray_channels_match_dynamic_image(){
        use image::{DynamicImage, GrayImage, Luma};
        use crate::options::Channel;

        let gray = GrayImage::from_fn(4, 2, |x, _| Luma([ if x < 2 { 255 } else { 0 } ]));
        let dynamic = DynamicImage::ImageLuma8(gray.clone());

        let default_threshold = piston_image::of_gray_u8_image(&gray).unwrap();
        assert_eq!(default_threshold, piston_image::of_gray_u8_image_with_threshold(&gray, 127).unwrap());
        assert!(default_threshold.is_inside(1, 1));
        assert!(!default_threshold.is_inside(2, 1));

        for &channel in &[ Channel::Luma, Channel::Alpha, Channel::Red ] {
            assert_eq!(
                piston_image::of_gray_u8_image_with_channel(&gray, channel, 127).unwrap(),
                piston_image::of_dynamic_image(&dynamic, channel, 127).unwrap(),
                "{:?} differs between grey-scale and dynamic images", channel
            );
        }

        let opaque = piston_image::of_gray_u8_image_with_channel(&gray, Channel::Alpha, 127).unwrap();
        assert!(opaque.is_uniform() && opaque.is_inside(3, 0));

        // nothing exceeds the largest threshold
        let transparent = piston_image::of_gray_u8_image_with_channel(&gray, Channel::Alpha, 255).unwrap();
        assert!(transparent.is_uniform() && !transparent.is_inside(0, 0));
    }
}
