use rand::Rng;

/// Picks an index with probability proportional to its weight.
///
/// Returns `None` only for an empty slice. Degenerate weights do not fail:
///
/// - if the total is infinite, one of the infinite weights is picked uniformly;
/// - if the total is otherwise not a positive finite number, every index is
///   equally likely;
/// - if the scan runs past the accumulated sum because of rounding, the
///   choice falls back to a uniform draw.
pub(crate) fn select<R>(weights: &[f64], rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
{
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if total.is_infinite() && total > 0.0 {
        let infinite = weights
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_infinite() && **w > 0.0)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        if !infinite.is_empty() {
            return Some(infinite[rng.random_range(0..infinite.len())]);
        }
    }
    if !total.is_finite() || total <= 0.0 {
        return Some(rng.random_range(0..weights.len()));
    }

    let choice_point = rng.random::<f64>() * total;
    let mut sum = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        sum += weight;
        if sum > choice_point {
            return Some(i);
        }
    }
    Some(rng.random_range(0..weights.len()))
}
