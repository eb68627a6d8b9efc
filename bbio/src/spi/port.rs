use core::mem::ManuallyDrop;

use crate::board::GpioAddr;
use crate::driver::Driver;
use crate::io::Inner;
use crate::{Error, Io};

use super::{Bus, Channel, Config, SpiPins};

/// Claim the four bus signals and route them to the controller.
///
/// The pins are held exclusively, like any other claim: a pin already
/// claimed elsewhere fails with [Error::AlreadyClaimed] and nothing is
/// kept. Must run before [Configured::enable], which is the only way to
/// get a [Port].
pub fn configure<'io, D: Driver>(
    io: &'io Io<D>,
    bus: Bus,
    pins: SpiPins,
) -> Result<Configured<'io, D>, Error> {
    let ids = pins.all();
    let mut addrs = [GpioAddr { bank: 0, bit: 0 }; 4];

    let mut inner = io.inner.borrow_mut();
    for i in 0..ids.len() {
        match inner.claim_line(ids[i]) {
            Ok(a) => addrs[i] = a,
            Err(e) => {
                // give back whatever was claimed before the failure
                for a in &addrs[..i] {
                    inner.release_line(*a);
                }
                return Err(e);
            }
        }
    }
    inner.driver.mux_spi(bus, &pins);
    drop(inner);

    log::debug!("configured {:?} pins: {:?}", bus, pins);
    Ok(Configured {
        io,
        bus,
        pins,
        addrs,
    })
}

/// A bus whose pins are claimed and muxed, ready to enable.
pub struct Configured<'io, D: Driver> {
    io: &'io Io<D>,
    bus: Bus,
    pins: SpiPins,
    addrs: [GpioAddr; 4],
}

impl<'io, D: Driver> Configured<'io, D> {
    /// Validate the configuration and turn the channel on.
    ///
    /// Fails with [Error::UnsupportedConfig] when the word width or the
    /// divided clock is out of range, and [Error::DeviceBusy] when the
    /// channel is already enabled through another port. On failure the
    /// pin claims are released.
    pub fn enable(self, config: Config) -> Result<Port<'io, D>, Error> {
        config.validate()?;
        {
            let mut inner = self.io.inner.borrow_mut();
            inner.enable_channel(self.bus, config.channel)?;
            if let Err(e) = inner.driver.open_channel(self.bus, config.channel, config.encode()) {
                inner.disable_channel(self.bus, config.channel);
                return Err(e);
            }
        }

        // the pins move into the port; don't release them here
        let this = ManuallyDrop::new(self);
        Ok(Port {
            io: this.io,
            bus: this.bus,
            pins: this.pins,
            addrs: this.addrs,
            config,
            enabled: true,
        })
    }

    /// Release the pin claims. Equivalent to dropping.
    #[inline(always)]
    pub fn free(self) {}
}

impl<D: Driver> Drop for Configured<'_, D> {
    fn drop(&mut self) {
        let mut inner = self.io.inner.borrow_mut();
        for a in self.addrs {
            inner.release_line(a);
        }
    }
}

/// An enabled bus channel in master mode.
///
/// Every operation frames its words in one chip-select assertion, and the
/// select line is back at its inactive level by the time the call
/// returns, error or not.
pub struct Port<'io, D: Driver> {
    io: &'io Io<D>,
    bus: Bus,
    pins: SpiPins,
    addrs: [GpioAddr; 4],
    config: Config,
    enabled: bool,
}

impl<'io, D: Driver> Port<'io, D> {
    /// Get the bus this port drives.
    #[inline(always)]
    pub fn bus(&self) -> Bus {
        self.bus
    }

    /// Get the channel configuration.
    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Is the channel still enabled?
    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // runs f with chip select active, and always deactivates it after
    fn with_selected<R>(
        &mut self,
        f: impl FnOnce(&mut Inner<D>, Bus, Channel) -> Result<R, Error>,
    ) -> Result<R, Error> {
        if !self.enabled {
            return Err(Error::BusNotEnabled);
        }
        let channel = self.config.channel;
        let mut inner = self.io.inner.borrow_mut();
        inner.driver.set_chip_select(self.bus, channel, true);
        let result = f(&mut inner, self.bus, channel);
        inner.driver.set_chip_select(self.bus, channel, false);
        result
    }

    /// Perform one full-duplex transaction.
    ///
    /// Drives chip select active, clocks out the low `word_bits` bits of
    /// `outbound` MSB first while sampling the inbound word, then returns
    /// chip select to its inactive level and blocks until complete.
    ///
    /// Bits of the result above the configured width are unspecified;
    /// callers wanting a clean narrow value must mask it themselves.
    pub fn transact(&mut self, outbound: u32) -> Result<u32, Error> {
        let bits = self.config.word_bits;
        self.with_selected(|inner, bus, channel| inner.driver.exchange(bus, channel, outbound, bits))
    }

    /// Write and read to the bus simultaneously, under one chip-select
    /// assertion.
    ///
    /// If `read` is shorter than `write`, inbound words past its end are
    /// discarded. If `write` is shorter than `read`, zero words are sent
    /// after its end.
    pub fn transfer(&mut self, read: &mut [u32], write: &[u32]) -> Result<(), Error> {
        let bits = self.config.word_bits;
        self.with_selected(|inner, bus, channel| {
            for i in 0..read.len().max(write.len()) {
                let out = write.get(i).copied().unwrap_or(0);
                let in_ = inner.driver.exchange(bus, channel, out, bits)?;
                if let Some(slot) = read.get_mut(i) {
                    *slot = in_;
                }
            }
            Ok(())
        })
    }

    /// Write and read to the bus simultaneously, overwriting the buffer.
    pub fn transfer_in_place(&mut self, words: &mut [u32]) -> Result<(), Error> {
        let bits = self.config.word_bits;
        self.with_selected(|inner, bus, channel| {
            for slot in words.iter_mut() {
                *slot = inner.driver.exchange(bus, channel, *slot, bits)?;
            }
            Ok(())
        })
    }

    /// Read a buffer from the bus, sending zero words.
    #[inline]
    pub fn read(&mut self, words: &mut [u32]) -> Result<(), Error> {
        self.transfer(words, &[])
    }

    /// Write a buffer to the bus, discarding inbound words.
    #[inline]
    pub fn write(&mut self, words: &[u32]) -> Result<(), Error> {
        self.transfer(&mut [], words)
    }

    /// Stop the channel and release the bus pairing. Idempotent; the pin
    /// claims stay with the port until it is dropped or freed.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        let mut inner = self.io.inner.borrow_mut();
        inner.driver.close_channel(self.bus, self.config.channel);
        inner.disable_channel(self.bus, self.config.channel);
    }

    /// Disable the channel and recover the configured bus, ready to
    /// enable again.
    pub fn free(mut self) -> Configured<'io, D> {
        self.disable();
        let this = ManuallyDrop::new(self);
        Configured {
            io: this.io,
            bus: this.bus,
            pins: this.pins,
            addrs: this.addrs,
        }
    }
}

impl<D: Driver> Drop for Port<'_, D> {
    fn drop(&mut self) {
        self.disable();
        let mut inner = self.io.inner.borrow_mut();
        for a in self.addrs {
            inner.release_line(a);
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::{ChipSelect, ClockDivider, InputLine, MODE_0};
    use super::*;
    use crate::board::{Header, PinId};
    use crate::io::testing::init_lock;
    use crate::sim::{Event, SimDriver};
    use crate::time::Hertz;

    fn spi0_pins() -> SpiPins {
        // CS0, D1, D0, CLK on the P9 header
        SpiPins {
            cs: PinId::new(Header::P9, 17),
            d1: PinId::new(Header::P9, 18),
            d0: PinId::new(Header::P9, 21),
            clk: PinId::new(Header::P9, 22),
        }
    }

    fn other_pins() -> SpiPins {
        SpiPins {
            cs: PinId::new(Header::P8, 7),
            d1: PinId::new(Header::P8, 8),
            d0: PinId::new(Header::P8, 9),
            clk: PinId::new(Header::P8, 10),
        }
    }

    fn adc_config() -> Config {
        Config::new()
            .divider(ClockDivider::Div32)
            .mode(MODE_0)
            .chip_select(ChipSelect::ActiveLow)
            .input_line(InputLine::D1)
            .word_bits(24)
            .device_limit(Hertz::kHz(1800))
    }

    #[test]
    fn loopback_transact() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        let bound = configure(&io, Bus::Spi0, spi0_pins()).unwrap();
        let mut port = bound.enable(adc_config()).unwrap();
        assert_eq!(port.transact(0x0055_3caa), Ok(0x0055_3caa));
    }

    #[test]
    fn loopback_masks_to_width() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        for bits in [1, 8, 16, 24, 31, 32] {
            let bound = configure(&io, Bus::Spi0, spi0_pins()).unwrap();
            let mut port = bound.enable(Config::new().word_bits(bits)).unwrap();
            let got = port.transact(u32::MAX).unwrap();
            let expect = if bits == 32 { u32::MAX } else { (1 << bits) - 1 };
            assert_eq!(got, expect, "width {}", bits);
        }
    }

    #[test]
    fn chip_select_frames_each_transaction() {
        let _guard = init_lock();
        let driver = SimDriver::new_loopback();
        let log = driver.log();
        let io = Io::init(driver).unwrap();

        let bound = configure(&io, Bus::Spi0, spi0_pins()).unwrap();
        let mut port = bound.enable(adc_config()).unwrap();
        port.transact(0x01).unwrap();
        port.transact(0x02).unwrap();

        let bus_events: Vec<_> = log
            .events()
            .into_iter()
            .filter(|e| {
                matches!(e, Event::ChipSelect(..)) || matches!(e, Event::Exchanged(..))
            })
            .collect();
        assert_eq!(
            bus_events,
            vec![
                Event::ChipSelect(Bus::Spi0, Channel::Ch0, true),
                Event::Exchanged(Bus::Spi0, Channel::Ch0, 0x01, 24),
                Event::ChipSelect(Bus::Spi0, Channel::Ch0, false),
                Event::ChipSelect(Bus::Spi0, Channel::Ch0, true),
                Event::Exchanged(Bus::Spi0, Channel::Ch0, 0x02, 24),
                Event::ChipSelect(Bus::Spi0, Channel::Ch0, false),
            ]
        );
    }

    #[test]
    fn transfer_uses_one_assertion() {
        let _guard = init_lock();
        let driver = SimDriver::new_loopback();
        let log = driver.log();
        let io = Io::init(driver).unwrap();

        let bound = configure(&io, Bus::Spi0, spi0_pins()).unwrap();
        let mut port = bound.enable(Config::new().word_bits(8)).unwrap();

        let mut read = [0u32; 2];
        port.transfer(&mut read, &[0xa1, 0xb2, 0xc3]).unwrap();
        assert_eq!(read, [0xa1, 0xb2]);

        let selects: Vec<_> = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::ChipSelect(..)))
            .collect();
        assert_eq!(
            selects,
            vec![
                Event::ChipSelect(Bus::Spi0, Channel::Ch0, true),
                Event::ChipSelect(Bus::Spi0, Channel::Ch0, false),
            ]
        );
    }

    #[test]
    fn disable_then_transact_fails() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        let bound = configure(&io, Bus::Spi0, spi0_pins()).unwrap();
        let mut port = bound.enable(adc_config()).unwrap();
        port.transact(0x01).unwrap();

        port.disable();
        port.disable(); // redundant, allowed
        assert_eq!(port.transact(0x01), Err(Error::BusNotEnabled));
        assert!(!port.is_enabled());
    }

    #[test]
    fn reenable_after_disable() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        let port = configure(&io, Bus::Spi0, spi0_pins())
            .unwrap()
            .enable(adc_config())
            .unwrap();

        // no residual busy state either way back
        let bound = port.free();
        let port = bound.enable(adc_config()).unwrap();
        drop(port);
        configure(&io, Bus::Spi0, spi0_pins())
            .unwrap()
            .enable(adc_config())
            .unwrap();
    }

    #[test]
    fn second_enable_is_busy() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        let _port = configure(&io, Bus::Spi0, spi0_pins())
            .unwrap()
            .enable(adc_config())
            .unwrap();

        // same bus and channel through different pins
        let bound = configure(&io, Bus::Spi0, other_pins()).unwrap();
        assert_eq!(bound.enable(adc_config()).err(), Some(Error::DeviceBusy));
    }

    #[test]
    fn failed_enable_releases_pins() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        let bound = configure(&io, Bus::Spi0, spi0_pins()).unwrap();
        let too_fast = adc_config().divider(ClockDivider::Div16);
        assert!(matches!(
            bound.enable(too_fast),
            Err(Error::UnsupportedConfig(_))
        ));

        // the pins came back with the failure
        configure(&io, Bus::Spi0, spi0_pins())
            .unwrap()
            .enable(adc_config())
            .unwrap();
    }

    #[test]
    fn configure_rolls_back_partial_claims() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        // the clock pin is taken, so configure must fail...
        let clk = io
            .claim(spi0_pins().clk, crate::gpio::Direction::Output)
            .unwrap();
        assert_eq!(
            configure(&io, Bus::Spi0, spi0_pins()).err(),
            Some(Error::AlreadyClaimed(spi0_pins().clk))
        );

        // ...without keeping the three pins it claimed first
        io.claim(spi0_pins().cs, crate::gpio::Direction::Output)
            .unwrap();
        drop(clk);
    }

    #[test]
    fn spi_pins_collide_with_gpio_claims() {
        let _guard = init_lock();
        let io = Io::init(SimDriver::new_loopback()).unwrap();

        let _bound = configure(&io, Bus::Spi0, spi0_pins()).unwrap();
        assert_eq!(
            io.claim(spi0_pins().cs, crate::gpio::Direction::Output)
                .err(),
            Some(Error::AlreadyClaimed(spi0_pins().cs))
        );
    }
}
