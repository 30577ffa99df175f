//! Everything a generator run can be configured with.

use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::normalize::{Normalization, SignConvention};

/// The largest width or height a field file header can hold.
pub const MAX_FIELD_DIMENSION: u32 = 255;

/// Which channel of a decoded source image decides inside and outside.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Grey-scale brightness of the pixel.
    Luma,

    /// Opacity of the pixel.
    Alpha,

    /// The red channel, for sources that only paint in red.
    Red,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Width and height of the generated field, each within `1..=255`.
    pub size: (u32, u32),

    /// A source pixel must be brighter than this value
    /// in order to be inside the shape.
    pub threshold: u8,

    pub channel: Channel,

    /// Half extent of the square window searched around each cell.
    /// Cells without an opposite pixel in their window saturate to this distance.
    pub search_radius: u32,

    pub normalization: Normalization,

    pub sign: SignConvention,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            size: (64, 64),
            threshold: 127,
            channel: Channel::Luma,
            search_radius: 100,
            normalization: Normalization::Static { max_distance: 100.0 },
            sign: SignConvention::Signed,
        }
    }
}

impl Options {
    /// Check every option before any work happens.
    pub fn validate(&self) -> Result<()> {
        check_dimension("width", self.size.0)?;
        check_dimension("height", self.size.1)?;

        if self.search_radius == 0 {
            return Err(Error::InvalidOptions {
                option: "search_radius",
                reason: "must be at least 1".to_string(),
            });
        }

        if let Normalization::Static { max_distance } = self.normalization {
            if !max_distance.is_finite() || max_distance <= 0.0 {
                return Err(Error::InvalidOptions {
                    option: "max_distance",
                    reason: format!("must be a positive number, but is {}", max_distance),
                });
            }
        }

        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 { self.size.0 }

    #[inline]
    pub fn height(&self) -> u32 { self.size.1 }
}

pub(crate) fn check_dimension(dimension: &'static str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_FIELD_DIMENSION {
        Err(Error::DimensionOutOfRange { dimension, value })
    }
    else {
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid(){
        Options::default().validate().unwrap();
    }

    #[test]
    fn rejects_oversized_fields(){
        let options = Options { size: (64, 256), ..Default::default() };

        match options.validate() {
            Err(Error::DimensionOutOfRange { dimension: "height", value: 256 }) => {},
            other => panic!("unexpected result {:?}", other),
        }

        let options = Options { size: (0, 64), ..Default::default() };
        assert!(options.validate().unwrap_err().is_format_error());
    }

    #[test]
    fn rejects_empty_window(){
        let options = Options { search_radius: 0, ..Default::default() };

        match options.validate() {
            Err(Error::InvalidOptions { option: "search_radius", .. }) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_non_positive_static_range(){
        let options = Options {
            normalization: Normalization::Static { max_distance: 0.0 },
            ..Default::default()
        };

        assert!(options.validate().is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults(){
        let options: Options = serde_json::from_str(r#"{
            "size": [32, 16],
            "channel": "alpha",
            "normalization": "dynamic",
            "sign": "unsigned"
        }"#).unwrap();

        assert_eq!(options.size, (32, 16));
        assert_eq!(options.channel, Channel::Alpha);
        assert_eq!(options.normalization, Normalization::Dynamic);
        assert_eq!(options.sign, SignConvention::Unsigned);
        assert_eq!(options.threshold, 127);
        assert_eq!(options.search_radius, 100);
    }
}
