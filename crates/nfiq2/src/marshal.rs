//! Image validation and argument layout for the native call.

use crate::config::ImageLimits;
use crate::error::ValidationError;
use crate::types::{ImageDescriptor, PixelDepth, QualityOptions, NFIQ2_PPI};

/// Borrowed view of a validated image, laid out in the order
/// `nfiq2wrapper_compute` takes its arguments.
///
/// The lifetime ties the view to the caller's pixels, so it cannot be handed
/// past the end of the call.
#[derive(Debug, Clone, Copy)]
pub struct NativeBuffer<'a> {
    data: &'a [u8],
    size: u32,
    cols: u32,
    rows: u32,
    ppi: u16,
}

impl<'a> NativeBuffer<'a> {
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Byte count, as the native `size` argument. Equals `cols * rows`.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn ppi(&self) -> u16 {
        self.ppi
    }
}

/// Validate `image` and produce the native argument view.
pub fn marshal<'a>(
    image: &ImageDescriptor<'a>,
    options: &QualityOptions,
    limits: &ImageLimits,
) -> Result<NativeBuffer<'a>, ValidationError> {
    let (width, height) = (image.width(), image.height());

    if width == 0 || height == 0 {
        return Err(ValidationError::EmptyDimensions { width, height });
    }
    if width > limits.max_width || height > limits.max_height {
        return Err(ValidationError::TooLarge {
            width,
            height,
            max_width: limits.max_width,
            max_height: limits.max_height,
        });
    }
    // The native side takes the pixel count as a u32 and checks it against
    // `cols * rows` in wrapping arithmetic.
    let size = u32::try_from(u64::from(width) * u64::from(height)).map_err(|_| {
        ValidationError::TooLarge {
            width,
            height,
            max_width: limits.max_width,
            max_height: limits.max_height,
        }
    })?;
    if image.depth() != PixelDepth::Gray8 {
        return Err(ValidationError::UnsupportedDepth(image.depth()));
    }
    if options.ppi != NFIQ2_PPI {
        return Err(ValidationError::UnsupportedResolution(options.ppi));
    }

    let expected = image.expected_len();
    let actual = image.pixels().len();
    if actual != expected {
        return Err(ValidationError::BufferLength { expected, actual });
    }

    Ok(NativeBuffer {
        data: image.pixels(),
        size,
        cols: width,
        rows: height,
        ppi: options.ppi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn limits() -> ImageLimits {
        ImageLimits::default()
    }

    #[test]
    fn test_valid_image_exact_length() {
        for (w, h) in [(1u32, 1u32), (300, 400), (512, 480), (4096, 1)] {
            let pixels = vec![0u8; (w * h) as usize];
            let image = ImageDescriptor::gray8(w, h, &pixels);

            let buf = marshal(&image, &QualityOptions::default(), &limits()).unwrap();
            assert_eq!(buf.size(), w * h);
            assert_eq!(buf.bytes().len(), (w * h) as usize);
            assert_eq!((buf.cols(), buf.rows(), buf.ppi()), (w, h, 500));
            assert_eq!(buf.as_ptr(), pixels.as_ptr());
        }
    }

    #[test]
    fn test_length_mismatch() {
        let pixels = vec![0u8; 300 * 400 - 1];
        let image = ImageDescriptor::gray8(300, 400, &pixels);
        assert_eq!(
            marshal(&image, &QualityOptions::default(), &limits()).unwrap_err(),
            ValidationError::BufferLength {
                expected: 120_000,
                actual: 119_999
            }
        );

        let pixels = vec![0u8; 300 * 400 + 1];
        let image = ImageDescriptor::gray8(300, 400, &pixels);
        assert!(marshal(&image, &QualityOptions::default(), &limits()).is_err());
    }

    #[test]
    fn test_zero_dimensions() {
        let image = ImageDescriptor::gray8(0, 10, &[]);
        assert_eq!(
            marshal(&image, &QualityOptions::default(), &limits()).unwrap_err(),
            ValidationError::EmptyDimensions {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn test_too_large() {
        let small = ImageLimits {
            max_width: 64,
            max_height: 64,
        };
        let pixels = vec![0u8; 65 * 10];
        let image = ImageDescriptor::gray8(65, 10, &pixels);
        assert!(matches!(
            marshal(&image, &QualityOptions::default(), &small),
            Err(ValidationError::TooLarge { width: 65, .. })
        ));
    }

    #[test]
    fn test_pixel_count_must_fit_native_size() {
        let unbounded = ImageLimits {
            max_width: u32::MAX,
            max_height: u32::MAX,
        };
        for (w, h) in [(65536u32, 65536u32), (u32::MAX, 2), (1 << 20, 1 << 12)] {
            let image = ImageDescriptor::gray8(w, h, &[]);
            assert_eq!(
                marshal(&image, &QualityOptions::default(), &unbounded).unwrap_err(),
                ValidationError::TooLarge {
                    width: w,
                    height: h,
                    max_width: u32::MAX,
                    max_height: u32::MAX,
                }
            );
        }

        let pixels = vec![0u8; 65535];
        let image = ImageDescriptor::gray8(65535, 1, &pixels);
        let buf = marshal(&image, &QualityOptions::default(), &unbounded).unwrap();
        assert_eq!(buf.size(), 65535);
    }

    #[test]
    fn test_unsupported_depth_even_with_matching_length() {
        let pixels = vec![0u8; 10 * 10 * 2];
        let image = ImageDescriptor::new(10, 10, PixelDepth::Gray16, &pixels);
        assert_eq!(
            marshal(&image, &QualityOptions::default(), &limits()).unwrap_err(),
            ValidationError::UnsupportedDepth(PixelDepth::Gray16)
        );
    }

    #[test]
    fn test_unsupported_resolution() {
        let pixels = vec![0u8; 100];
        let image = ImageDescriptor::gray8(10, 10, &pixels);
        let options = QualityOptions {
            ppi: 1000,
            ..Default::default()
        };
        assert_eq!(
            marshal(&image, &options, &limits()).unwrap_err(),
            ValidationError::UnsupportedResolution(1000)
        );
    }
}
