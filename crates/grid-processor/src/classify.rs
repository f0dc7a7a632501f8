//! Binary suitability masks.
//!
//! A mask cell is `1.0` when suitable and `NaN` otherwise, so combining
//! masks is a plain cellwise product.

use crate::types::SuitabilityRange;
use grid_common::{Grid, SuitabilityError, SuitabilityResult};
use tracing::debug;

/// Mark cells whose value lies in `range` (inclusive) as suitable.
pub fn classify(grid: &Grid, range: &SuitabilityRange) -> Grid {
    let mask = grid.map(|v| if range.contains(v) { 1.0 } else { f32::NAN });
    debug!(
        range = %range,
        suitable = suitable_cell_count(&mask),
        cells = mask.data.len(),
        "Classified grid"
    );
    mask
}

/// Cellwise product of aligned masks: suitable only where every mask is.
pub fn combine(masks: &[&Grid]) -> SuitabilityResult<Grid> {
    let (first, rest) = masks
        .split_first()
        .ok_or_else(|| SuitabilityError::configuration("no masks to combine"))?;

    for mask in rest {
        if !mask.spec.is_aligned_with(&first.spec) {
            return Err(SuitabilityError::alignment(
                "masks must share shape, transform and CRS to be combined",
            ));
        }
    }

    let mut combined = (*first).clone();
    for mask in rest {
        for (out, &v) in combined.data.iter_mut().zip(&mask.data) {
            *out *= v;
        }
    }

    Ok(combined)
}

/// Number of suitable cells in a mask.
pub fn suitable_cell_count(mask: &Grid) -> usize {
    mask.data.iter().filter(|&&v| v == 1.0).count()
}
