//! Macros for recording host metrics.
//!
//! Each macro expands to nothing unless the `metrics` feature is enabled, so
//! call sites never need their own `cfg` guards. Labels are written as
//! `key => value` pairs after the metric name.

/// Increments a counter by one.
macro_rules! inc {
    ($metric:ident $(, $key:expr => $value:expr)* $(,)?) => {
        #[cfg(feature = "metrics")]
        metrics::counter!($crate::Metrics::$metric $(, $key => $value)*).increment(1);
    };
}

/// Sets a gauge to the given amount.
macro_rules! set {
    ($metric:ident $(, $key:expr => $value:expr)*; $amount:expr) => {
        #[cfg(feature = "metrics")]
        metrics::gauge!($crate::Metrics::$metric $(, $key => $value)*).set($amount);
    };
}

/// Records an observation into a histogram.
macro_rules! record {
    ($metric:ident $(, $key:expr => $value:expr)*; $amount:expr) => {
        #[cfg(feature = "metrics")]
        metrics::histogram!($crate::Metrics::$metric $(, $key => $value)*).record($amount);
    };
}
