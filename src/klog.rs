//! Kernel log macros.
//!
//! Lines go to COM1 only, never to the video surface, so they are safe to
//! emit while the console device lock is held. Verbosity is fixed at compile
//! time: `log_debug` enables `kdebug!`, `no_logs` turns every macro into an
//! empty statement.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    pub const fn prefix(self) -> &'static str {
        match self {
            Level::Error => "[ERROR] ",
            Level::Warn => "[WARN] ",
            Level::Info => "[INFO] ",
            Level::Debug => "[DEBUG] ",
        }
    }
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => ($crate::serial::_log($crate::klog::Level::Error, format_args!($($arg)*)));
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => ($crate::serial::_log($crate::klog::Level::Warn, format_args!($($arg)*)));
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => ($crate::serial::_log($crate::klog::Level::Info, format_args!($($arg)*)));
}

#[cfg(all(feature = "log_debug", not(feature = "no_logs")))]
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => ($crate::serial::_log($crate::klog::Level::Debug, format_args!($($arg)*)));
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{}};
}

#[cfg(any(not(feature = "log_debug"), feature = "no_logs"))]
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{}};
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn levels_order_by_severity() {
        assert!(Level::Error < Level::Warn);
        assert!(Level::Info < Level::Debug);
        assert_eq!(Level::Warn.prefix(), "[WARN] ");
    }
}
