use core::fmt;

/// Failures visible to callers of the device entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The calling task was marked for termination while waiting for input.
    Killed,
    /// No device is registered under this major number.
    NoDevice(usize),
    /// A device is already registered under this major number.
    AlreadyRegistered(usize),
}

impl Error {
    /// Value handed back across the system-call boundary.
    pub const fn errno(self) -> isize {
        -1
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Killed => write!(f, "task killed while waiting for console input"),
            Error::NoDevice(major) => write!(f, "no device with major number {}", major),
            Error::AlreadyRegistered(major) => write!(f, "major number {} already registered", major),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
