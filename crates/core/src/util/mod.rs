pub mod range;

use std::cmp::Ordering;

/// A macro to measure the evaluation time of an expression. Wraps an
/// expression, logs how long it took to evaluate, and returns its value.
/// Defaults to the `Debug` log level.
#[macro_export]
macro_rules! timed {
    ($label:expr, $ex:expr) => {
        $crate::timed!($label, log::Level::Debug, $ex)
    };
    ($label:expr, $log_level:expr, $ex:expr) => {{
        let now = std::time::Instant::now();
        let value = $ex;
        let elapsed = now.elapsed();
        log::log!($log_level, "{} took {} ms", $label, elapsed.as_millis());
        value
    }};
}

/// Compare two floats by total ordering. Unlike `partial_cmp`, this never
/// fails, which lets us use floats as ordered keys. NaN sorts after
/// everything else.
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_f64() {
        assert_eq!(cmp_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(cmp_f64(2.0, 2.0), Ordering::Equal);
        assert_eq!(cmp_f64(-0.5, -1.5), Ordering::Greater);
        assert_eq!(cmp_f64(f64::NAN, 1.0e300), Ordering::Greater);
    }

    #[test]
    fn test_timed_passes_value_through() {
        let value = timed!("Addition", 2 + 2);
        assert_eq!(value, 4);
    }
}
