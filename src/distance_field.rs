
use rayon::prelude::*;
use crate::binary_image::{BinaryImage, SourceMask};
use crate::error::Result;
use crate::normalize::SignConvention;
use crate::options::Options;


/// One distance sample per output cell, row-major,
/// measured in source pixels.
#[derive(Clone, PartialEq, Debug)]
pub struct DistanceField<D: DistanceStorage> {
    pub width: u32,
    pub height: u32,
    pub sign: SignConvention,
    pub distances: D,
}

/// The smallest and largest sample of a field.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GlobalStats {
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Needs less storage with sufficient precision, but takes
/// a little longer because of conversions between f16 and f32.
pub type F16DistanceStorage = Vec<half::f16>;

/// Needs more storage with high precision.
pub type F32DistanceStorage = Vec<f32>;

pub trait DistanceStorage: Send + Sync {
    fn from_distances(distances: Vec<f32>) -> Self;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> f32;
}



impl<D> DistanceField<D> where D: DistanceStorage {

    /// Searches the neighbourhood of every output cell for the closest
    /// pixel of the opposite class. Each output cell is mapped to the source
    /// pixel `(x * source_width / width, y * source_height / height)`.
    ///
    /// Only a square window of `search_radius` pixels around that pixel is searched.
    /// A cell without any opposite pixel in its window, or with only opposite pixels
    /// farther away than the radius, saturates to exactly `search_radius`.
    /// The result is therefore only exact for distances up to the radius.
    pub fn compute(mask: &SourceMask, options: &Options) -> Result<Self> {
        options.validate()?;

        let (width, height) = options.size;
        let radius = options.search_radius;
        let sign = options.sign;

        // cells are independent of each other and only read the mask
        let distances: Vec<f32> = (0 .. width * height).into_par_iter()
            .map(|index| {
                let (x, y) = (index % width, index / width);
                let source_x = (x as u64 * mask.width() as u64 / width as u64) as u32;
                let source_y = (y as u64 * mask.height() as u64 / height as u64) as u32;

                let inside = mask.is_inside(source_x, source_y);
                let distance = nearest_opposite(mask, source_x, source_y, radius);
                sign.apply(distance, inside)
            })
            .collect();

        Ok(DistanceField { width, height, sign, distances: D::from_distances(distances) })
    }

    #[inline]
    pub fn get_distance(&self, x: u32, y: u32) -> f32 {
        self.distances.get(self.flatten_index(x, y))
    }

    #[inline]
    pub fn flatten_index(&self, x: u32, y: u32) -> usize {
        self.width as usize * y as usize + x as usize
    }

    /// Reduce all samples to their range, after all of them have been computed.
    pub fn stats(&self) -> GlobalStats {
        (0 .. self.distances.len()).into_par_iter()
            .map(|index| self.distances.get(index))
            .fold(GlobalStats::empty, GlobalStats::include)
            .reduce(GlobalStats::empty, GlobalStats::merge)
    }
}

/// Euclidean distance from the pixel to the closest pixel of the other class,
/// or `radius` if there is no such pixel within the radius.
fn nearest_opposite(mask: &SourceMask, x: u32, y: u32, radius: u32) -> f32 {
    let inside = mask.is_inside(x, y);

    let min_x = x.saturating_sub(radius);
    let min_y = y.saturating_sub(radius);
    let max_x = x.saturating_add(radius).min(mask.width() - 1);
    let max_y = y.saturating_add(radius).min(mask.height() - 1);

    // compare squared distances, which are exact integers
    let radius_squared = radius as u64 * radius as u64;
    let mut min_squared = radius_squared;

    for window_y in min_y ..= max_y {
        let delta_y = (window_y as i64 - y as i64).abs() as u64;
        let delta_y_squared = delta_y * delta_y;

        // no pixel in this row can be closer
        if delta_y_squared >= min_squared {
            continue;
        }

        for window_x in min_x ..= max_x {
            if mask.is_inside(window_x, window_y) == inside {
                continue;
            }

            let delta_x = (window_x as i64 - x as i64).abs() as u64;
            let squared = delta_x * delta_x + delta_y_squared;

            if squared < min_squared {
                min_squared = squared;
            }
        }
    }

    (min_squared as f64).sqrt() as f32
}


impl GlobalStats {
    pub fn empty() -> Self {
        GlobalStats { min_distance: std::f32::INFINITY, max_distance: std::f32::NEG_INFINITY }
    }

    pub fn include(self, distance: f32) -> Self {
        GlobalStats {
            min_distance: self.min_distance.min(distance),
            max_distance: self.max_distance.max(distance),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        GlobalStats {
            min_distance: self.min_distance.min(other.min_distance),
            max_distance: self.max_distance.max(other.max_distance),
        }
    }

    #[inline]
    pub fn range(&self) -> f32 {
        self.max_distance - self.min_distance
    }
}


impl DistanceStorage for F16DistanceStorage {
    fn from_distances(distances: Vec<f32>) -> Self {
        distances.into_iter().map(half::f16::from_f32).collect()
    }

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> f32 {
        self[index].to_f32()
    }
}

impl DistanceStorage for F32DistanceStorage {
    fn from_distances(distances: Vec<f32>) -> Self {
        distances
    }

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> f32 {
        self[index]
    }
}
