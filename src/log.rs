//! Tagged status logging
//!
//! With the `esp32-log` feature every line goes to the serial console as
//! `[T+<uptime> ms][<tag>] <message>`. Without it the arguments are still
//! type-checked but nothing is printed.

/// Log a tagged status line stamped with the given [`Instant`](embassy_time::Instant).
macro_rules! log_status {
    ($now:expr, $tag:expr, $($arg:tt)*) => {{
        #[cfg(feature = "esp32-log")]
        {
            esp_println::println!(
                "[T+{:>9} ms][{}] {}",
                $now.as_millis(),
                $tag,
                format_args!($($arg)*)
            );
        }
        #[cfg(not(feature = "esp32-log"))]
        {
            let _ = &$now;
            let _ = $tag;
            let _ = format_args!($($arg)*);
        }
    }};
}
