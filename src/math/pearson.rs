/// Pearson correlation over pairwise-complete observations.
///
/// Positions where either side is missing are skipped. Degenerate input
/// (fewer than two pairs, a constant side, non-finite denominator) yields 0.
pub fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let mut n = 0usize;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut sum_xx = 0.0f64;
    let mut sum_yy = 0.0f64;
    let mut sum_xy = 0.0f64;

    for (a, b) in x.iter().zip(y.iter()) {
        if let (Some(a), Some(b)) = (a, b) {
            n += 1;
            sum_x += a;
            sum_y += b;
            sum_xx += a * a;
            sum_yy += b * b;
            sum_xy += a * b;
        }
    }

    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let cov = sum_xy - sum_x * sum_y / nf;
    let var_x = sum_xx - sum_x * sum_x / nf;
    let var_y = sum_yy - sum_y * sum_y / nf;
    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    let denom = (var_x * var_y).sqrt();
    if !denom.is_finite() || denom == 0.0 {
        return 0.0;
    }
    let r = cov / denom;
    if !r.is_finite() {
        return 0.0;
    }
    r.clamp(-1.0, 1.0)
}
