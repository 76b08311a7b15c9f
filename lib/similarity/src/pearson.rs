//! Pearson correlation over partially overlapping rating vectors
//!
//! Only users who rated both movies take part in a comparison. Degenerate
//! inputs (no shared raters, a constant vector) have a defined result of 0.

use webfilmz_core::{round_to_hundredths, MovieId, RatingMatrix};

#[inline]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Sum of element-wise products of two aligned vectors
#[inline]
pub fn sum_of_products(xs: &[f64], ys: &[f64]) -> f64 {
    xs.iter().zip(ys).map(|(x, y)| x * y).sum()
}

/// Sum of squared deviations from the vector's own mean
pub fn sum_of_squared_deviations(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = sum(values) / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum()
}

/// Pearson coefficient of two aligned vectors, rounded to two decimals.
///
/// Returns 0 for empty input, when either vector has zero variance, or when
/// the sums overflow.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 0 {
        return 0.0;
    }

    let sum_x = sum(xs);
    let sum_y = sum(ys);
    let sum_x_sq = sum_of_squared_deviations(xs);
    let sum_y_sq = sum_of_squared_deviations(ys);

    let numerator = sum_of_products(xs, ys) - (sum_x * sum_y / n as f64);
    let denominator = (sum_x_sq * sum_y_sq).sqrt();

    if denominator == 0.0 {
        return 0.0;
    }
    let coefficient = numerator / denominator;
    if !coefficient.is_finite() {
        return 0.0;
    }
    let coefficient = round_to_hundredths(coefficient);
    // Rounding error can push a perfect correlation a hair past the bound
    coefficient.clamp(-1.0, 1.0)
}

/// Pearson coefficient between two movies over their mutual raters
pub fn pearson_correlation(matrix: &RatingMatrix, x: MovieId, y: MovieId) -> f64 {
    let mutual = matrix.mutual_raters(x, y);
    if mutual.is_empty() {
        return 0.0;
    }
    let (xs, ys) = matrix.aligned_vectors(x, y, &mutual);
    pearson(&xs, &ys)
}
