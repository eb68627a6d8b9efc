use core::fmt;

use crate::board::PinId;

/// Errors returned by pin, bus, and lifecycle operations.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Error {
    /// The calling process may not map the peripheral registers.
    PermissionDenied,
    /// A live [Io](crate::Io) already owns the peripheral mapping.
    AlreadyInitialized,
    /// The pin is owned by another handle.
    AlreadyClaimed(PinId),
    /// The pin does not exist on the board, or is not GPIO-capable.
    OutOfRange(PinId),
    /// The operation needs the opposite pin direction.
    WrongDirection,
    /// The bus configuration is outside hardware or device limits.
    UnsupportedConfig(&'static str),
    /// The bus channel is already enabled.
    DeviceBusy,
    /// The bus channel is not enabled.
    BusNotEnabled,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::PermissionDenied => {
                write!(f, "permission denied mapping the peripheral registers")
            }
            Error::AlreadyInitialized => {
                write!(f, "the peripherals are already mapped by this process")
            }
            Error::AlreadyClaimed(pin) => write!(f, "pin {} is already claimed", pin),
            Error::OutOfRange(pin) => write!(f, "pin {} is not a usable GPIO", pin),
            Error::WrongDirection => write!(f, "operation does not match the pin direction"),
            Error::UnsupportedConfig(why) => write!(f, "unsupported bus configuration: {}", why),
            Error::DeviceBusy => write!(f, "bus channel is already enabled"),
            Error::BusNotEnabled => write!(f, "bus channel is not enabled"),
        }
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}
