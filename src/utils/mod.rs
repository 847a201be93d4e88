use std::cmp::Ordering;

/// Axis along which a per-row or per-column statistic is taken.
///
/// `ROW` produces one value per row, `COLUMN` one value per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ROW,
    COLUMN,
}

/// Indices that sort `values` by `key` in descending order.
///
/// NaN keys compare as equal so a poisoned spectrum never panics here.
pub(crate) fn descending_order<F>(values: &[f64], key: F) -> Vec<usize>
where
    F: Fn(f64) -> f64,
{
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&i, &j| {
        key(values[j])
            .partial_cmp(&key(values[i]))
            .unwrap_or(Ordering::Equal)
    });
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_order() {
        let values = [1.0, -3.0, 2.0];
        assert_eq!(descending_order(&values, |v| v), vec![2, 0, 1]);
        assert_eq!(descending_order(&values, f64::abs), vec![1, 2, 0]);
    }

    #[test]
    fn test_descending_order_is_stable_on_ties() {
        let values = [2.0, 2.0, 1.0];
        assert_eq!(descending_order(&values, |v| v), vec![0, 1, 2]);
    }
}
