pub struct Math {}

impl Math {
    /// # log domain average
    /// average values in the exponential domain:
    /// `scale * ln(n / sum(exp(-v / scale)))`.
    ///
    /// the sum is shifted by the lowest value before exponentiating so equal
    /// inputs collapse to exactly that input.
    ///
    /// ## Arguments
    /// * `values` - the values to average
    /// * `scale` - the spread of the exponential weighting
    ///
    /// ## Returns
    /// * `Option<f64>` - `None` when there is nothing to average
    pub fn log_domain_average(values: &[f64], scale: f64) -> Option<f64> {
        if values.is_empty() || scale <= 0.0 {
            return None;
        }

        let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);
        let shifted_sum: f64 = values.iter().map(|v| (-(v - lowest) / scale).exp()).sum();
        if shifted_sum <= 0.0 || !shifted_sum.is_finite() {
            return None;
        }

        let count = values.len() as f64;
        Some(lowest + scale * (count.ln() - shifted_sum.ln()))
    }

    /// mean of integer values, truncated towards zero
    pub fn truncating_mean(nums: &[i32]) -> Option<i32> {
        if nums.is_empty() {
            return None;
        }

        let sum: i64 = nums.iter().map(|n| *n as i64).sum();
        Some((sum / nums.len() as i64) as i32)
    }

    pub fn ceil_div(numerator: usize, denominator: usize) -> usize {
        if denominator == 0 {
            return 0;
        }
        (numerator + denominator - 1) / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_collapse_exactly() {
        let scale = 1600.0 / std::f64::consts::LN_2;
        assert_eq!(Math::log_domain_average(&[1500.0; 7], scale), Some(1500.0));
        assert_eq!(Math::log_domain_average(&[3127.0], scale), Some(3127.0));
    }

    #[test]
    fn lower_values_pull_harder() {
        let scale = 1600.0 / std::f64::consts::LN_2;
        let avg = Math::log_domain_average(&[1000.0, 3000.0], scale).unwrap();
        assert!(avg > 1000.0 && avg < 2000.0, "got {}", avg);
    }

    #[test]
    fn empty_input_has_no_average() {
        assert_eq!(Math::log_domain_average(&[], 10.0), None);
        assert_eq!(Math::truncating_mean(&[]), None);
    }

    #[test]
    fn truncating_mean_and_ceil_div() {
        assert_eq!(Math::truncating_mean(&[50, 45]), Some(47));
        assert_eq!(Math::ceil_div(5, 4), 2);
        assert_eq!(Math::ceil_div(4, 4), 1);
        assert_eq!(Math::ceil_div(1, 4), 1);
        assert_eq!(Math::ceil_div(3, 0), 0);
    }
}
