use crate::TRADING_DAYS_PER_YEAR;

/// Total return on contributed capital, `terminal / contributed - 1`.
///
/// Returns `None` when nothing was contributed.
#[must_use]
pub fn total_return(terminal_value: f64, total_contributed: f64) -> Option<f64> {
    (total_contributed > 0.0).then(|| terminal_value / total_contributed - 1.0)
}

/// Annualized (CAGR-equivalent) return over `days` trading days.
///
/// `(terminal / contributed)^(252 / days) - 1`. Returns `None` when nothing
/// was contributed, the duration is zero, or the terminal value is negative.
#[must_use]
pub fn annualized_return(terminal_value: f64, total_contributed: f64, days: u32) -> Option<f64> {
    if days == 0 || total_contributed <= 0.0 || terminal_value < 0.0 {
        return None;
    }
    let growth = terminal_value / total_contributed;
    Some(growth.powf(f64::from(TRADING_DAYS_PER_YEAR) / f64::from(days)) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_return() {
        assert_eq!(total_return(150.0, 100.0), Some(0.5));
        assert_eq!(total_return(150.0, 0.0), None);
    }

    #[test]
    fn test_annualized_return() {
        let r = annualized_return(121.0, 100.0, 504).unwrap();
        assert!((r - 0.1).abs() < 1e-12);
        assert_eq!(annualized_return(-1.0, 100.0, 252), None);
        assert_eq!(annualized_return(100.0, 100.0, 0), None);
    }
}
