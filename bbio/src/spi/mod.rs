//! Master transactions on the two McSPI buses.
//!
//! Usage is a three-step ladder: [configure] claims the four bus pins and
//! routes them to the controller, [Configured::enable] validates a
//! [Config] and turns the channel on, and the resulting [Port] runs
//! chip-select framed transactions until it is disabled or dropped.

use crate::board::PinId;

mod config;
pub use config::*;

mod port;
pub use port::*;

mod hal1;

/// One of the two McSPI controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bus {
    Spi0,
    Spi1,
}

/// A chip-select channel on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Ch0,
    Ch1,
}

/// The header pins carrying the four bus signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpiPins {
    /// Chip select.
    pub cs: PinId,
    /// Data line 1.
    pub d1: PinId,
    /// Data line 0.
    pub d0: PinId,
    /// Bus clock.
    pub clk: PinId,
}

impl SpiPins {
    pub(crate) fn all(&self) -> [PinId; 4] {
        [self.cs, self.d1, self.d0, self.clk]
    }
}
