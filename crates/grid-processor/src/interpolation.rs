//! Point sampling of row-major grids.
//!
//! Both functions take fractional cell coordinates: cell `(c, r)` spans
//! `[c, c + 1) x [r, r + 1)` and its centre sits at `(c + 0.5, r + 0.5)`.
//! Points outside the grid return `NaN`.

/// Nearest neighbor interpolation.
///
/// Returns the value of the cell containing the point.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if !(x >= 0.0 && y >= 0.0) {
        return f32::NAN;
    }

    let col = x.floor() as usize;
    let row = y.floor() as usize;

    if col >= width || row >= height {
        return f32::NAN;
    }

    data[row * width + col]
}

/// Bilinear interpolation.
///
/// Smoothly interpolates between the four nearest cell centres. Within half
/// a cell of the grid edge the edge values are extended.
pub fn bilinear_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if !(x >= 0.0 && y >= 0.0) || x >= width as f64 || y >= height as f64 {
        return f32::NAN;
    }

    // Shift to centre-based coordinates and clamp into the centre lattice
    let u = (x - 0.5).clamp(0.0, (width - 1) as f64);
    let v = (y - 0.5).clamp(0.0, (height - 1) as f64);

    let x0 = u.floor() as usize;
    let y0 = v.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = (u - x0 as f64) as f32;
    let yf = (v - y0 as f64) as f32;

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    // Handle NaN values - if any corner is NaN, return NaN
    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}
