//! A register-free driver for tests and demos.
//!
//! [SimDriver] models just enough of the controllers to exercise the rest
//! of the crate: GPIO lines remember their direction and level, SPI
//! channels remember their configuration word, and the bus can be wired in
//! loopback so every outbound word comes straight back, masked to the
//! frame width. Everything the driver does lands in an [EventLog] that
//! tests can inspect after the fact.

use core::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::board::GpioAddr;
use crate::driver::Driver;
use crate::gpio::{Direction, Level};
use crate::spi::{word_mask, Bus, Channel, SpiPins};
use crate::Error;

/// Something the simulator did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Mapped,
    Unmapped,
    DirectionSet(GpioAddr, Direction),
    LineWritten(GpioAddr, Level),
    PinsMuxed(Bus),
    ChannelOpened(Bus, Channel, u32),
    ChipSelect(Bus, Channel, bool),
    Exchanged(Bus, Channel, u32, u8),
    ChannelClosed(Bus, Channel),
}

/// A shared view of everything a [SimDriver] has done.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// A copy of the recorded events, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// A simulated driver.
pub struct SimDriver {
    mapped: bool,
    deny_permission: bool,
    loopback: bool,
    lines: HashMap<GpioAddr, (Direction, Level)>,
    open: HashMap<(Bus, Channel), u32>,
    log: EventLog,
}

impl SimDriver {
    /// A simulator with nothing wired to the bus: inbound words read as
    /// all zeros.
    pub fn new() -> Self {
        Self {
            mapped: false,
            deny_permission: false,
            loopback: false,
            lines: HashMap::new(),
            open: HashMap::new(),
            log: Default::default(),
        }
    }

    /// A simulator with the bus data lines tied together, so every
    /// outbound word comes back masked to the frame width.
    pub fn new_loopback() -> Self {
        Self {
            loopback: true,
            ..Self::new()
        }
    }

    /// Refuse to map, as for an unprivileged caller.
    pub fn deny_permission(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    /// Externally drive a line, as a signal arriving at an input pin.
    pub fn wire_input(&mut self, addr: GpioAddr, level: Level) {
        let entry = self.lines.entry(addr).or_insert((Direction::Input, level));
        entry.1 = level;
    }

    /// Get a handle on the event log; it stays readable after the driver
    /// moves into an [Io](crate::Io).
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for SimDriver {
    fn map(&mut self) -> Result<(), Error> {
        if self.deny_permission {
            return Err(Error::PermissionDenied);
        }
        self.mapped = true;
        self.log.push(Event::Mapped);
        Ok(())
    }

    fn unmap(&mut self) {
        if self.mapped {
            self.mapped = false;
            self.log.push(Event::Unmapped);
        }
    }

    fn set_direction(&mut self, addr: GpioAddr, direction: Direction) {
        let level = self.lines.get(&addr).map(|e| e.1).unwrap_or(Level::Low);
        self.lines.insert(addr, (direction, level));
        self.log.push(Event::DirectionSet(addr, direction));
    }

    fn write_line(&mut self, addr: GpioAddr, level: Level) {
        let entry = self
            .lines
            .entry(addr)
            .or_insert((Direction::Output, Level::Low));
        entry.1 = level;
        self.log.push(Event::LineWritten(addr, level));
    }

    fn read_line(&mut self, addr: GpioAddr) -> Level {
        self.lines.get(&addr).map(|e| e.1).unwrap_or(Level::Low)
    }

    fn mux_spi(&mut self, bus: Bus, _pins: &SpiPins) {
        self.log.push(Event::PinsMuxed(bus));
    }

    fn open_channel(&mut self, bus: Bus, channel: Channel, conf: u32) -> Result<(), Error> {
        if self.open.contains_key(&(bus, channel)) {
            return Err(Error::DeviceBusy);
        }
        self.open.insert((bus, channel), conf);
        self.log.push(Event::ChannelOpened(bus, channel, conf));
        Ok(())
    }

    fn set_chip_select(&mut self, bus: Bus, channel: Channel, active: bool) {
        self.log.push(Event::ChipSelect(bus, channel, active));
    }

    fn exchange(&mut self, bus: Bus, channel: Channel, word: u32, bits: u8) -> Result<u32, Error> {
        let conf = *self
            .open
            .get(&(bus, channel))
            .ok_or(Error::BusNotEnabled)?;
        self.log.push(Event::Exchanged(bus, channel, word, bits));

        // transmit-only and receive-only frames bring nothing back
        let trm = (conf >> 12) & 0x3;
        if self.loopback && trm == 0 {
            Ok(word & word_mask(bits))
        } else {
            Ok(0)
        }
    }

    fn close_channel(&mut self, bus: Bus, channel: Channel) {
        if self.open.remove(&(bus, channel)).is_some() {
            self.log.push(Event::ChannelClosed(bus, channel));
        }
    }
}
