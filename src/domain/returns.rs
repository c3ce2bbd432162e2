//! Percentage-change primitive shared by the risk, portfolio and correlation
//! engines.

/// r[i] = v[i] / v[i-1] - 1.
///
/// Index 0 has no prior value and is `None`; so is any index whose previous
/// value is zero.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    for w in values.windows(2) {
        out.push(ratio_change(w[0], w[1]));
    }
    out
}

/// `to / from - 1`, or `None` when `from` is zero.
pub fn ratio_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 { None } else { Some(to / from - 1.0) }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divisor n-1). Needs at least two values.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
