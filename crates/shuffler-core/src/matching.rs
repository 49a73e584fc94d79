//! Nearest-value lookup and range normalization for ranking candidates

use crate::error::{Result, ShufflerError};

/// Index of the value closest to `target`. Ties go to the lowest index.
///
/// Returns 0 for an empty slice; callers must check the backing collection
/// before indexing with it.
pub fn closest_index(values: &[usize], target: usize) -> usize {
    let mut closest = 0;
    let mut smallest_diff = usize::MAX;
    for (i, &value) in values.iter().enumerate() {
        let diff = value.abs_diff(target);
        if diff < smallest_diff {
            smallest_diff = diff;
            closest = i;
        }
    }
    closest
}

/// Affinely rescale `values` from their observed range onto
/// `[target_min, target_max]`, flooring to integers.
///
/// Reversed targets are swapped. Fails with [`ShufflerError::DegenerateRange`]
/// when every value is equal.
pub fn normalize(values: &[usize], target_min: usize, target_max: usize) -> Result<Vec<usize>> {
    let (target_min, target_max) = if target_min > target_max {
        (target_max, target_min)
    } else {
        (target_min, target_max)
    };

    let (Some(&source_min), Some(&source_max)) = (values.iter().min(), values.iter().max()) else {
        return Ok(Vec::new());
    };
    if source_min == source_max {
        return Err(ShufflerError::DegenerateRange(source_min));
    }

    let factor = (target_max - target_min) as f64 / (source_max - source_min) as f64;
    Ok(values
        .iter()
        .map(|&v| {
            let scaled = ((v - source_min) as f64 * factor + target_min as f64).floor();
            (scaled as usize).clamp(target_min, target_max)
        })
        .collect())
}
