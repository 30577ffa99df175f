//! This crate turns a high resolution binary mask into a tiny
//! signed distance field texture, which a renderer can magnify
//! while keeping the edges of the shape sharp.
//!
//! Every output cell brute-force searches a square window of the source
//! for the closest pixel of the opposite class. This is slow compared to
//! a proper distance transform, but the output is small and is
//! only generated once per asset.

pub mod binary_image;
pub mod distance_field;
pub mod error;
pub mod field_file;
pub mod normalize;
pub mod options;

pub mod prelude {
    pub use crate::{
        compute_distance_field,
        compute_f16_distance_field,
        compute_f32_distance_field,
        generate_field,
    };

    pub use crate::binary_image::{
        BinaryImage, BinaryByteImage, SourceMask
    };

    pub use crate::distance_field::{
        DistanceField, DistanceStorage, GlobalStats,
        F16DistanceStorage, F32DistanceStorage
    };

    pub use crate::error::{ Error, Result };
    pub use crate::field_file::QuantizedField;
    pub use crate::normalize::{ Normalization, SignConvention };
    pub use crate::options::{ Channel, Options };

    #[cfg(feature = "piston_image")]
    pub use crate::binary_image::piston_image as binary_piston_image;

    #[cfg(feature = "piston_image")]
    pub use crate::DistanceFieldExt;
}


use prelude::*;

/// Compute the distance samples with the specified distance storage of the specified mask.
pub fn compute_distance_field<D: DistanceStorage>(mask: &SourceMask, options: &Options) -> Result<DistanceField<D>> {
    DistanceField::compute(mask, options)
}

/// Compute the distance samples with an `f16` distance storage of the specified mask.
pub fn compute_f16_distance_field(mask: &SourceMask, options: &Options) -> Result<DistanceField<F16DistanceStorage>> {
    compute_distance_field(mask, options)
}

/// Compute the distance samples with an `f32` distance storage of the specified mask.
pub fn compute_f32_distance_field(mask: &SourceMask, options: &Options) -> Result<DistanceField<F32DistanceStorage>> {
    compute_distance_field(mask, options)
}

/// Search and quantize in one go.
/// All samples are computed before any normalization happens.
pub fn generate_field(mask: &SourceMask, options: &Options) -> Result<QuantizedField> {
    compute_f32_distance_field(mask, options)?.quantize(options.normalization)
}


/// Generate fields directly from decoded piston images.
#[cfg(feature = "piston_image")]
pub trait DistanceFieldExt {
    /// Classify the configured channel and generate the quantized field.
    fn distance_field(&self, options: Options) -> Result<QuantizedField>;
}

#[cfg(feature = "piston_image")]
impl DistanceFieldExt for image::DynamicImage {
    fn distance_field(&self, options: Options) -> Result<QuantizedField> {
        options.validate()?;
        let mask = binary_piston_image::of_dynamic_image(self, options.channel, options.threshold)?;
        generate_field(&mask, &options)
    }
}

#[cfg(feature = "piston_image")]
impl DistanceFieldExt for image::GrayImage {
    fn distance_field(&self, options: Options) -> Result<QuantizedField> {
        options.validate()?;
        let mask = binary_piston_image::of_gray_u8_image_with_channel(self, options.channel, options.threshold)?;
        generate_field(&mask, &options)
    }
}
