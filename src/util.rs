/// Checks that a numerical value is in the provided interval `[a,b]` and returns early
/// from the enclosing function with an [`Error::OutOfInterval`](crate::error::Error::OutOfInterval) if not
///
/// ### Example
/// ```ignore
/// let alpha = 2.0;
/// check_interval!(alpha, 0.0, 1.0);
/// ```
/// This returns an error with the message "invalid value 2 for \`alpha\`: must be in the interval \[0, 1\]".
///
/// Prefix the value with `open` to exclude the lower bound, checking `(a,b]` instead.
macro_rules! check_interval {
    (open $var:expr, $a:expr, $b:expr, $name:expr) => {
        if !($var > $a && $var <= $b) {
            return Err($crate::error::Error::OutOfInterval {
                name: $name,
                value: $var as f64,
                open: '(',
                low: $a as f64,
                high: $b as f64,
            });
        }
    };
    ($var:expr, $a:expr, $b:expr) => {
        $crate::util::check_interval!($var, $a, $b, stringify!($var))
    };
    ($var:expr, $a:expr, $b:expr, $name:expr) => {
        // NaN fails both comparisons
        if !($var >= $a && $var <= $b) {
            return Err($crate::error::Error::OutOfInterval {
                name: $name,
                value: $var as f64,
                open: '[',
                low: $a as f64,
                high: $b as f64,
            });
        }
    };
}

pub(crate) use check_interval;

/// Arithmetic mean of an iterator of values, or `None` if it is empty
pub(crate) fn mean(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, n), x| (sum + f64::from(x), n + 1));
    (n > 0).then(|| (sum / n as f64) as f32)
}
