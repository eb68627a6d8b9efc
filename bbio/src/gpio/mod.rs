//! Claiming and driving individual GPIO pins.
//!
//! A pin is claimed from the [Io] with a fixed direction and held through a
//! [PinHandle]. The claim is exclusive: a second claim on the same line
//! fails with [Error::AlreadyClaimed] until the handle is released or
//! dropped. Level operations are checked against the claimed direction at
//! runtime, because the direction comes from caller data rather than the
//! type system.

use crate::board::{GpioAddr, PinId};
use crate::driver::Driver;
use crate::{Error, Io};

mod hal1;

/// Digital line state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Low = 0,
    High = 1,
}

impl From<bool> for Level {
    #[inline(always)]
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl core::ops::Not for Level {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl Level {
    /// Is the level high?
    #[inline(always)]
    pub fn is_high(&self) -> bool {
        *self == Self::High
    }

    /// Is the level low?
    #[inline(always)]
    pub fn is_low(&self) -> bool {
        *self == Self::Low
    }
}

/// Direction of a claimed pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// An exclusive claim on one GPIO pin.
///
/// The claim lasts until [release](PinHandle::release) or drop; either way
/// the line becomes claimable again.
pub struct PinHandle<'io, D: Driver> {
    io: &'io Io<D>,
    id: PinId,
    addr: GpioAddr,
    direction: Direction,
}

impl<D: Driver> Io<D> {
    /// Claim a pin and configure its direction.
    pub fn claim(&self, id: PinId, direction: Direction) -> Result<PinHandle<'_, D>, Error> {
        let mut inner = self.inner.borrow_mut();
        let addr = inner.claim_line(id)?;
        inner.driver.set_direction(addr, direction);
        drop(inner);
        log::debug!("claimed {} as {:?}", id, direction);
        Ok(PinHandle {
            io: self,
            id,
            addr,
            direction,
        })
    }
}

impl<'io, D: Driver> PinHandle<'io, D> {
    /// Get the pin this handle claims.
    #[inline(always)]
    pub fn id(&self) -> PinId {
        self.id
    }

    /// Get the claimed direction.
    #[inline(always)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Drive the output line. Takes effect immediately.
    pub fn set(&mut self, level: Level) -> Result<(), Error> {
        if self.direction != Direction::Output {
            return Err(Error::WrongDirection);
        }
        self.io.inner.borrow_mut().driver.write_line(self.addr, level);
        Ok(())
    }

    /// Drive the output high.
    #[inline(always)]
    pub fn set_high(&mut self) -> Result<(), Error> {
        self.set(Level::High)
    }

    /// Drive the output low.
    #[inline(always)]
    pub fn set_low(&mut self) -> Result<(), Error> {
        self.set(Level::Low)
    }

    /// The level the output is currently driving.
    pub fn get_state(&self) -> Result<Level, Error> {
        if self.direction != Direction::Output {
            return Err(Error::WrongDirection);
        }
        Ok(self.io.inner.borrow_mut().driver.read_line(self.addr))
    }

    /// Flip the output line.
    pub fn toggle(&mut self) -> Result<(), Error> {
        let level = self.get_state()?;
        self.io
            .inner
            .borrow_mut()
            .driver
            .write_line(self.addr, !level);
        Ok(())
    }

    /// Sample the input line.
    pub fn read(&self) -> Result<Level, Error> {
        if self.direction != Direction::Input {
            return Err(Error::WrongDirection);
        }
        Ok(self.io.inner.borrow_mut().driver.read_line(self.addr))
    }

    /// Is the input high?
    #[inline(always)]
    pub fn is_high(&self) -> Result<bool, Error> {
        Ok(self.read()?.is_high())
    }

    /// Is the input low?
    #[inline(always)]
    pub fn is_low(&self) -> Result<bool, Error> {
        Ok(self.read()?.is_low())
    }

    /// Release the claim. Equivalent to dropping the handle.
    #[inline(always)]
    pub fn release(self) {}
}

impl<D: Driver> Drop for PinHandle<'_, D> {
    fn drop(&mut self) {
        self.io.inner.borrow_mut().release_line(self.addr);
    }
}
