//! Map the raw distance samples into single bytes.
//!
//! Larger samples always become brighter bytes. With the signed convention,
//! inside samples are negative, so the shape is dark and its surroundings are bright.
//! All scaled values are truncated toward zero.

use serde::{Deserialize, Serialize};
use crate::distance_field::{DistanceField, DistanceStorage, GlobalStats};
use crate::error::{Error, Result};
use crate::field_file::QuantizedField;

/// How raw distances are scaled into the byte range.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Divide each distance by a fixed maximum.
    /// Distances beyond the maximum are clamped.
    Static { max_distance: f32 },

    /// Rescale from the smallest to the largest sample of the field.
    Dynamic,
}

/// Whether inside cells carry a negative distance.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignConvention {
    /// Inside is negative, outside is positive.
    /// Statically normalized, a distance of zero maps to 128.
    Signed,

    /// Only the magnitude of the distance is kept.
    Unsigned,
}

impl SignConvention {
    #[inline]
    pub fn apply(self, distance: f32, inside: bool) -> f32 {
        match self {
            SignConvention::Signed if inside => -distance,
            _ => distance,
        }
    }
}


impl<D> DistanceField<D> where D: DistanceStorage {

    /// Quantize every sample into a byte.
    /// Fails for dynamic normalization if all samples are equal.
    pub fn quantize(&self, normalization: Normalization) -> Result<QuantizedField> {
        let samples = (0 .. self.distances.len()).map(|index| self.distances.get(index));

        let bytes = match normalization {
            Normalization::Static { max_distance } => samples
                .map(|distance| quantize_static(distance, max_distance, self.sign))
                .collect(),

            Normalization::Dynamic => {
                let stats = self.stats();

                if !(stats.range() > 0.0) {
                    return Err(Error::DegenerateField { distance: stats.min_distance });
                }

                samples.map(|distance| quantize_dynamic(distance, stats)).collect()
            }
        };

        QuantizedField::new(self.width, self.height, bytes)
    }
}

/// Scale by a fixed maximum distance.
/// Signed distances are biased so that zero lands in the middle of the byte range.
pub fn quantize_static(distance: f32, max_distance: f32, sign: SignConvention) -> u8 {
    let scaled = match sign {
        SignConvention::Signed => 128.0 + distance / max_distance * 128.0,
        SignConvention::Unsigned => distance / max_distance * 255.0,
    };

    to_byte(scaled)
}

/// Rescale linearly from the range of the field to the full byte range.
pub fn quantize_dynamic(distance: f32, stats: GlobalStats) -> u8 {
    to_byte((distance - stats.min_distance) / stats.range() * 255.0)
}

#[inline]
fn to_byte(value: f32) -> u8 {
    // truncates toward zero, after clamping
    value.max(0.0).min(255.0) as u8
}
