//! Process-wide ownership of the peripheral mapping.

use core::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::board::{GpioAddr, PinId, BANKS};
use crate::driver::Driver;
use crate::spi::{Bus, Channel};
use crate::Error;

// One mapping per process; the hardware cannot tolerate two owners.
static MAPPED: AtomicBool = AtomicBool::new(false);

/// Scoped access to the mapped peripherals.
///
/// [init](Io::init) maps the registers through the supplied [Driver];
/// dropping the `Io` unmaps them. Pin claims and enabled bus channels
/// borrow the `Io`, so they cannot outlive the mapping.
pub struct Io<D: Driver> {
    pub(crate) inner: RefCell<Inner<D>>,
}

pub(crate) struct Inner<D> {
    pub(crate) driver: D,
    // one claim bit per GPIO line, matching the bank registers
    claimed: [u32; BANKS],
    // one bit per (bus, channel) pairing
    enabled_channels: u8,
}

impl<D: Driver> Io<D> {
    /// Map the peripherals and take process-wide ownership of them.
    pub fn init(mut driver: D) -> Result<Self, Error> {
        if MAPPED.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyInitialized);
        }
        if let Err(e) = driver.map() {
            MAPPED.store(false, Ordering::Release);
            return Err(e);
        }
        log::debug!("peripheral registers mapped");
        Ok(Self {
            inner: RefCell::new(Inner {
                driver,
                claimed: [0; BANKS],
                enabled_channels: 0,
            }),
        })
    }
}

impl<D: Driver> Drop for Io<D> {
    fn drop(&mut self) {
        self.inner.get_mut().driver.unmap();
        MAPPED.store(false, Ordering::Release);
        log::debug!("peripheral registers unmapped");
    }
}

impl<D> Inner<D> {
    pub(crate) fn claim_line(&mut self, id: PinId) -> Result<GpioAddr, Error> {
        let addr = id.gpio().ok_or(Error::OutOfRange(id))?;
        let mask = 1 << addr.bit;
        if self.claimed[addr.bank as usize] & mask != 0 {
            return Err(Error::AlreadyClaimed(id));
        }
        self.claimed[addr.bank as usize] |= mask;
        Ok(addr)
    }

    // no-op when the line is not claimed, so every exit path may call it
    pub(crate) fn release_line(&mut self, addr: GpioAddr) {
        self.claimed[addr.bank as usize] &= !(1 << addr.bit);
    }

    pub(crate) fn enable_channel(&mut self, bus: Bus, channel: Channel) -> Result<(), Error> {
        let mask = channel_mask(bus, channel);
        if self.enabled_channels & mask != 0 {
            return Err(Error::DeviceBusy);
        }
        self.enabled_channels |= mask;
        Ok(())
    }

    pub(crate) fn disable_channel(&mut self, bus: Bus, channel: Channel) {
        self.enabled_channels &= !channel_mask(bus, channel);
    }
}

fn channel_mask(bus: Bus, channel: Channel) -> u8 {
    1 << ((bus as u8) * 2 + channel as u8)
}


#[cfg(test)]
mod test {
    use super::testing::init_lock;
    use super::*;
    use crate::sim::SimDriver;

    #[test]
    fn init_and_reinit() {
        let _guard = init_lock();

        let io = Io::init(SimDriver::new()).unwrap();
        assert_eq!(
            Io::init(SimDriver::new()).err(),
            Some(Error::AlreadyInitialized)
        );

        // teardown makes the mapping available again
        drop(io);
        Io::init(SimDriver::new()).unwrap();
    }

    #[test]
    fn denied_mapping_is_not_sticky() {
        let _guard = init_lock();

        let denied = SimDriver::new().deny_permission();
        assert_eq!(Io::init(denied).err(), Some(Error::PermissionDenied));

        // the failed init must not leave the process marked as mapped
        Io::init(SimDriver::new()).unwrap();
    }
}
