//! The interface between this crate and the register-level backend.
//!
//! The actual memory-mapped driver (the thing that opens `/dev/mem` and
//! pokes the GPIO and McSPI register windows) lives outside this crate.
//! Everything here is written against the [Driver] trait, which is the
//! exact set of register operations the core needs. [crate::sim] provides
//! an in-memory implementation.

use crate::board::GpioAddr;
use crate::gpio::{Direction, Level};
use crate::spi::{Bus, Channel, SpiPins};
use crate::Error;

/// Register-level access to the GPIO and McSPI controllers.
pub trait Driver {
    /// Map the controller register windows into the process.
    ///
    /// Fails with [Error::PermissionDenied] when the caller lacks the
    /// privilege to map physical memory.
    fn map(&mut self) -> Result<(), Error>;

    /// Undo [map](Driver::map). Idempotent.
    fn unmap(&mut self);

    /// Configure a GPIO line as an input or an output.
    fn set_direction(&mut self, addr: GpioAddr, direction: Direction);

    /// Drive an output line. Takes effect immediately, unbuffered.
    fn write_line(&mut self, addr: GpioAddr, level: Level);

    /// Sample a line.
    fn read_line(&mut self, addr: GpioAddr) -> Level;

    /// Route the four bus signals of `bus` to the given header pins.
    fn mux_spi(&mut self, bus: Bus, pins: &SpiPins);

    /// Reset a channel and program its configuration word, leaving
    /// chip-select at its inactive level.
    fn open_channel(&mut self, bus: Bus, channel: Channel, conf: u32) -> Result<(), Error>;

    /// Drive the channel's chip-select line to its active or inactive
    /// level, as configured by the channel's configuration word.
    fn set_chip_select(&mut self, bus: Bus, channel: Channel, active: bool);

    /// Clock the low `bits` bits of `word` out of the channel, MSB first,
    /// while sampling the same number of bits in. Blocks until the shift
    /// completes. Bits of the result above `bits` are unspecified.
    fn exchange(&mut self, bus: Bus, channel: Channel, word: u32, bits: u8) -> Result<u32, Error>;

    /// Stop the channel clock and release it. Idempotent.
    fn close_channel(&mut self, bus: Bus, channel: Channel);
}
