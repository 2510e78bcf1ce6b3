//! Logging macros
//!
//! Routes to `esp-println` with the `esp32-log` feature or to `defmt` with the
//! `defmt` feature. Without either feature the arguments are still
//! type-checked but nothing is emitted.
//!
//! Format strings must stay compatible with both backends, so only plain `{}`
//! placeholders with primitive arguments are used.

macro_rules! emit {
    ($level:ident, $prefix:literal, $($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$level!($($arg)*);
        #[cfg(feature = "esp32-log")]
        ::esp_println::println!("{} {}", $prefix, format_args!($($arg)*));
        #[cfg(not(any(feature = "defmt", feature = "esp32-log")))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

macro_rules! error {
    ($($arg:tt)*) => { $crate::log::emit!(error, "[ERROR]", $($arg)*) };
}

macro_rules! warn_ {
    ($($arg:tt)*) => { $crate::log::emit!(warn, "[WARN]", $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { $crate::log::emit!(info, "[INFO]", $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { $crate::log::emit!(debug, "[DEBUG]", $($arg)*) };
}

pub(crate) use {debug, emit, error, info, warn_ as warn};
