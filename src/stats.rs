//! Numeric primitives shared by the analyzers. All of them fail soft: empty
//! or degenerate input yields 0 instead of NaN.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { return 0.0; }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by N).
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() { return 0.0; }
    let m = mean(values);
    values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn stddev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Pearson correlation. Returns 0 for unequal or empty inputs and whenever
/// the denominator vanishes.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.is_empty() { return 0.0; }
    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();
    let sum_y2: f64 = ys.iter().map(|y| y * y).sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();

    let num = sum_xy - (sum_x * sum_y / n);
    let den = ((sum_x2 - sum_x * sum_x / n) * (sum_y2 - sum_y * sum_y / n)).sqrt();
    if den == 0.0 || !den.is_finite() { return 0.0; }
    let r = num / den;
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Slope of `y = a + b*i` over index positions `i = 0..n-1`.
pub fn least_squares_slope(ys: &[f64]) -> f64 {
    let n = ys.len();
    if n <= 1 { return 0.0; }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(ys);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den == 0.0 { 0.0 } else { num / den }
}
