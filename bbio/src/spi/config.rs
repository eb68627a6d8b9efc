use crate::time::Hertz;
use crate::Error;

use super::Channel;

/// Choices for clock phase and polarity, re-exported from [embedded_hal].
pub use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

/// The bus functional clock, fixed by the SoC at 48 MHz.
pub const FUNCTIONAL_CLOCK: Hertz = Hertz::MHz(48);

/// Choices for the bus clock divider, each a power of two.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClockDivider {
    Div1 = 0,
    Div2 = 1,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
    Div256 = 8,
    Div512 = 9,
    Div1024 = 10,
    Div2048 = 11,
    Div4096 = 12,
    Div8192 = 13,
    Div16384 = 14,
    Div32768 = 15,
}

impl ClockDivider {
    /// The division factor.
    #[inline(always)]
    pub const fn factor(self) -> u32 {
        1 << (self as u32)
    }
}

/// Which transfers the channel performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Transfer {
    /// Transmit and receive.
    Duplex,
    /// Receive only.
    RxOnly,
    /// Transmit only.
    TxOnly,
}

/// The chip-select level that addresses the slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChipSelect {
    ActiveLow,
    ActiveHigh,
}

/// Which data line the controller samples. The other line transmits.
///
/// The stock routing samples D0; swap to [D1](InputLine::D1) for slaves
/// wired the other way around, like the MCP3202 in the reference setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputLine {
    D0,
    D1,
}

/// Settings for one bus channel, master role only.
///
/// Clock mode, chip-select level, transfer direction, and data-line
/// routing are independent axes; different slaves need different
/// combinations.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub(super) channel: Channel,
    pub(super) transfer: Transfer,
    pub(super) divider: ClockDivider,
    pub(super) mode: Mode,
    pub(super) chip_select: ChipSelect,
    pub(super) input_line: InputLine,
    pub(super) word_bits: u8,
    pub(super) device_limit: Option<Hertz>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: Channel::Ch0,
            transfer: Transfer::Duplex,
            divider: ClockDivider::Div32768,
            mode: MODE_0,
            chip_select: ChipSelect::ActiveLow,
            input_line: InputLine::D0,
            word_bits: 8,
            device_limit: None,
        }
    }
}

impl Config {
    /// A new configuration: channel 0, full duplex, slowest clock, mode 0,
    /// active-low chip select, input on D0, 8-bit words.
    #[inline(always)]
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the channel.
    #[inline(always)]
    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Set the transfer direction.
    #[inline(always)]
    pub fn transfer(mut self, transfer: Transfer) -> Self {
        self.transfer = transfer;
        self
    }

    /// Set the clock divider.
    #[inline(always)]
    pub fn divider(mut self, divider: ClockDivider) -> Self {
        self.divider = divider;
        self
    }

    /// Set the clock mode.
    #[inline(always)]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the chip-select active level.
    #[inline(always)]
    pub fn chip_select(mut self, chip_select: ChipSelect) -> Self {
        self.chip_select = chip_select;
        self
    }

    /// Set which data line the controller samples.
    #[inline(always)]
    pub fn input_line(mut self, input_line: InputLine) -> Self {
        self.input_line = input_line;
        self
    }

    /// Set the transfer width in bits, 1 to 32.
    #[inline(always)]
    pub fn word_bits(mut self, word_bits: u8) -> Self {
        self.word_bits = word_bits;
        self
    }

    /// Set the slave's rated maximum clock. Enabling fails when the
    /// divided bus clock would exceed it.
    #[inline(always)]
    pub fn device_limit(mut self, limit: Hertz) -> Self {
        self.device_limit = Some(limit);
        self
    }

    /// Get the channel.
    #[inline(always)]
    pub fn get_channel(&self) -> Channel {
        self.channel
    }

    /// Get the transfer width in bits.
    #[inline(always)]
    pub fn get_word_bits(&self) -> u8 {
        self.word_bits
    }

    /// The bus clock this configuration produces.
    #[inline(always)]
    pub fn clock(&self) -> Hertz {
        Hertz::from_raw(FUNCTIONAL_CLOCK.raw() / self.divider.factor())
    }

    pub(super) fn validate(&self) -> Result<(), Error> {
        if self.word_bits < 1 || self.word_bits > 32 {
            return Err(Error::UnsupportedConfig(
                "word width must be between 1 and 32 bits",
            ));
        }
        if let Some(limit) = self.device_limit {
            if self.clock() > limit {
                return Err(Error::UnsupportedConfig(
                    "bus clock exceeds the device's rated maximum",
                ));
            }
        }
        Ok(())
    }

    /// Pack into the channel-configuration register layout.
    pub(crate) fn encode(&self) -> u32 {
        let mut conf = 0;
        if self.mode.phase == Phase::CaptureOnSecondTransition {
            conf |= 1 << 0; // PHA
        }
        if self.mode.polarity == Polarity::IdleHigh {
            conf |= 1 << 1; // POL
        }
        conf |= (self.divider as u32) << 2; // CLKD
        if self.chip_select == ChipSelect::ActiveLow {
            conf |= 1 << 6; // EPOL
        }
        conf |= ((self.word_bits - 1) as u32) << 7; // WL
        conf |= match self.transfer {
            Transfer::Duplex => 0,
            Transfer::RxOnly => 1,
            Transfer::TxOnly => 2,
        } << 12; // TRM
        conf |= match self.input_line {
            // reception on D0, transmission on D1
            InputLine::D0 => 1 << 16, // DPE0
            // reception on D1, transmission on D0
            InputLine::D1 => (1 << 17) | (1 << 18), // DPE1 | IS
        };
        conf |= 1 << 20; // FORCE: chip select under manual control
        conf
    }
}

/// Mask covering the low `bits` bits of a word.
pub(crate) const fn word_mask(bits: u8) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;

    #[test]
    fn encode_reference_setup() {
        // divider 32, mode 0, active-low select, 24-bit frames, input
        // on D1: the MCP3202 wiring from the reference hardware
        let conf = Config::new()
            .divider(ClockDivider::Div32)
            .mode(MODE_0)
            .chip_select(ChipSelect::ActiveLow)
            .input_line(InputLine::D1)
            .word_bits(24)
            .encode();
        assert_eq!(conf, 0x0016_0bd4);
    }

    #[test]
    fn encode_mode_bits() {
        let base = Config::new();
        assert_eq!(base.mode(MODE_0).encode() & 0x3, 0b00);
        assert_eq!(base.mode(MODE_1).encode() & 0x3, 0b01);
        assert_eq!(base.mode(MODE_2).encode() & 0x3, 0b10);
        assert_eq!(base.mode(MODE_3).encode() & 0x3, 0b11);
    }

    #[test]
    fn divided_clock() {
        let config = Config::new().divider(ClockDivider::Div32);
        assert_eq!(config.clock(), Hertz::kHz(1500));
        assert_eq!(ClockDivider::Div1.factor(), 1);
        assert_eq!(ClockDivider::Div32768.factor(), 32768);
    }

    #[test]
    fn validate_width() {
        assert!(Config::new().word_bits(0).validate().is_err());
        assert!(Config::new().word_bits(33).validate().is_err());
        assert!(Config::new().word_bits(1).validate().is_ok());
        assert!(Config::new().word_bits(32).validate().is_ok());
    }

    #[test]
    fn validate_device_limit() {
        let config = Config::new().device_limit(Hertz::kHz(1800));
        // 48 MHz / 32 = 1.5 MHz, under the limit
        assert!(config.divider(ClockDivider::Div32).validate().is_ok());
        // 48 MHz / 16 = 3 MHz, over it
        assert_eq!(
            config.divider(ClockDivider::Div16).validate(),
            Err(Error::UnsupportedConfig(
                "bus clock exceeds the device's rated maximum"
            ))
        );
    }

    #[quickcheck]
    fn encode_keeps_word_length(bits: u8) -> bool {
        let bits = bits % 32 + 1;
        let conf = Config::new().word_bits(bits).encode();
        (conf >> 7) & 0x1f == (bits - 1) as u32
    }

    #[quickcheck]
    fn mask_bounds_any_word(word: u32, bits: u8) -> bool {
        let bits = bits % 32 + 1;
        let masked = word & word_mask(bits);
        bits == 32 || masked < (1 << bits)
    }
}
