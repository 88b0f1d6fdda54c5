//! Value types exchanged with application code.

use serde::Serialize;

/// Resolution NFIQ2 is trained for; the only one it accepts.
pub const NFIQ2_PPI: u16 = 500;

/// Pixel layout of a caller-supplied image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelDepth {
    /// Grayscale, 8 bits per pixel
    #[default]
    Gray8,
    /// Grayscale, 16 bits per pixel
    Gray16,
    /// RGB with 8 bits per channel
    Rgb8,
}

impl PixelDepth {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelDepth::Gray8 => 1,
            PixelDepth::Gray16 => 2,
            PixelDepth::Rgb8 => 3,
        }
    }
}

/// A fingerprint image borrowed from the caller for one invocation.
///
/// Pixels are row-major with no padding (stride == width).
#[derive(Debug, Clone, Copy)]
pub struct ImageDescriptor<'a> {
    width: u32,
    height: u32,
    depth: PixelDepth,
    pixels: &'a [u8],
}

impl<'a> ImageDescriptor<'a> {
    pub fn new(width: u32, height: u32, depth: PixelDepth, pixels: &'a [u8]) -> Self {
        Self {
            width,
            height,
            depth,
            pixels,
        }
    }

    /// 8-bit grayscale image, the format NFIQ2 consumes.
    pub fn gray8(width: u32, height: u32, pixels: &'a [u8]) -> Self {
        Self::new(width, height, PixelDepth::Gray8, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// Byte length the pixel buffer must have for these dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.depth.bytes_per_pixel()
    }
}

/// Per-call algorithm options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityOptions {
    /// Capture resolution in pixels per inch
    pub ppi: u16,
    /// Return actionable feedback and native feature values with the score
    pub collect_measures: bool,
}

impl Default for QualityOptions {
    fn default() -> Self {
        Self {
            ppi: NFIQ2_PPI,
            collect_measures: true,
        }
    }
}

/// A named value reported by NFIQ2 (actionable feedback or quality feature).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl From<(String, f64)> for NamedValue {
    fn from((name, value): (String, f64)) -> Self {
        Self { name, value }
    }
}

/// Diagnostic detail accompanying a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityMeasures {
    /// Actionable quality feedback (e.g. `UniformImage`)
    pub actionable: Vec<NamedValue>,
    /// Native quality measure values fed to the model
    pub features: Vec<NamedValue>,
}

impl QualityMeasures {
    pub fn actionable(&self, name: &str) -> Option<f64> {
        find(&self.actionable, name)
    }

    pub fn feature(&self, name: &str) -> Option<f64> {
        find(&self.features, name)
    }
}

fn find(values: &[NamedValue], name: &str) -> Option<f64> {
    values.iter().find(|v| v.name == name).map(|v| v.value)
}

/// A validated NFIQ2 score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityResult {
    /// Unified quality score, 1..=100
    pub score: u8,
    /// Present when requested via [`QualityOptions::collect_measures`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measures: Option<QualityMeasures>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_len() {
        let pixels = [0u8; 6];
        assert_eq!(ImageDescriptor::gray8(3, 2, &pixels).expected_len(), 6);
        assert_eq!(
            ImageDescriptor::new(3, 2, PixelDepth::Rgb8, &pixels).expected_len(),
            18
        );
    }

    #[test]
    fn test_measure_lookup() {
        let measures = QualityMeasures {
            actionable: vec![NamedValue::from(("UniformImage".to_string(), 1.0))],
            features: vec![],
        };
        assert_eq!(measures.actionable("UniformImage"), Some(1.0));
        assert_eq!(measures.feature("MMB"), None);
    }

    #[test]
    fn test_result_serializes_without_measures() {
        let result = QualityResult {
            score: 54,
            measures: None,
        };
        assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"score":54}"#);
    }
}
