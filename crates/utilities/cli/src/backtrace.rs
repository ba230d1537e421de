//! Helper to set the backtrace env var.

use std::sync::Once;

static INIT: Once = Once::new();

/// Sets the `RUST_BACKTRACE` environment variable to 1 if it is not already set.
///
/// Only the first call has an effect. Call it before any other thread is spawned.
pub fn enable() {
    INIT.call_once(|| {
        if std::env::var_os("RUST_BACKTRACE").is_none() {
            // SAFETY: called once at start-up, before the runtime spawns threads.
            unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
        }
    });
}
