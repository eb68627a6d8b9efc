//! Pin numbering for the BeagleBone Black expansion headers.
//!
//! Pins are named the way the board silkscreen names them: header P8 or P9
//! plus a physical position from 1 to 46. Only some positions reach a GPIO
//! line on the SoC; the rest are power, ground, or analog pads, and
//! [PinId::gpio] returns `None` for them.

use core::fmt;
use core::str::FromStr;

/// Number of pin positions on each expansion header.
pub const HEADER_PINS: u8 = 46;

/// Number of GPIO banks on the SoC.
pub(crate) const BANKS: usize = 4;

/// An expansion header on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Header {
    P8,
    P9,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Header::P8 => write!(f, "P8"),
            Header::P9 => write!(f, "P9"),
        }
    }
}

/// A physical pin position on an expansion header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId {
    pub header: Header,
    pub pin: u8,
}

impl PinId {
    #[inline(always)]
    pub const fn new(header: Header, pin: u8) -> Self {
        Self { header, pin }
    }

    /// The GPIO line behind this pin, if it has one.
    pub const fn gpio(self) -> Option<GpioAddr> {
        gpio_map(self.header, self.pin)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.header, self.pin)
    }
}

/// Error parsing a pin name.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ParsePinError;

impl std::error::Error for ParsePinError {}

impl fmt::Display for ParsePinError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected a pin name like P9.14")
    }
}

impl FromStr for PinId {
    type Err = ParsePinError;

    /// Accepts `P9.14`, `P9_14`, or `9.14`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(['p', 'P']).unwrap_or(s);
        let (header, pin) = s.split_once(['.', '_']).ok_or(ParsePinError)?;
        let header = match header {
            "8" => Header::P8,
            "9" => Header::P9,
            _ => return Err(ParsePinError),
        };
        let pin = pin.parse().map_err(|_| ParsePinError)?;
        if pin == 0 || pin > HEADER_PINS {
            return Err(ParsePinError);
        }
        Ok(PinId::new(header, pin))
    }
}

/// A GPIO line as the controller sees it: bank and bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GpioAddr {
    /// GPIO bank, 0 to 3.
    pub bank: u8,
    /// Bit within the bank, 0 to 31.
    pub bit: u8,
}

const fn addr(bank: u8, bit: u8) -> Option<GpioAddr> {
    Some(GpioAddr { bank, bit })
}

// GPIO routing for the stock pin mux. Positions that carry power, ground,
// or the ADC inputs map to nothing.
const fn gpio_map(header: Header, pin: u8) -> Option<GpioAddr> {
    match header {
        Header::P8 => match pin {
            3 => addr(1, 6),
            4 => addr(1, 7),
            5 => addr(1, 2),
            6 => addr(1, 3),
            7 => addr(2, 2),
            8 => addr(2, 3),
            9 => addr(2, 5),
            10 => addr(2, 4),
            11 => addr(1, 13),
            12 => addr(1, 12),
            13 => addr(0, 23),
            14 => addr(0, 26),
            15 => addr(1, 15),
            16 => addr(1, 14),
            17 => addr(0, 27),
            18 => addr(2, 1),
            19 => addr(0, 22),
            20 => addr(1, 31),
            21 => addr(1, 30),
            22 => addr(1, 5),
            23 => addr(1, 4),
            24 => addr(1, 1),
            25 => addr(1, 0),
            26 => addr(1, 29),
            27 => addr(2, 22),
            28 => addr(2, 24),
            29 => addr(2, 23),
            30 => addr(2, 25),
            31 => addr(0, 10),
            32 => addr(0, 11),
            33 => addr(0, 9),
            34 => addr(2, 17),
            35 => addr(0, 8),
            36 => addr(2, 16),
            37 => addr(2, 14),
            38 => addr(2, 15),
            39 => addr(2, 12),
            40 => addr(2, 13),
            41 => addr(2, 10),
            42 => addr(2, 11),
            43 => addr(2, 8),
            44 => addr(2, 9),
            45 => addr(2, 6),
            46 => addr(2, 7),
            _ => None,
        },
        Header::P9 => match pin {
            11 => addr(0, 30),
            12 => addr(1, 28),
            13 => addr(0, 31),
            14 => addr(1, 18),
            15 => addr(1, 16),
            16 => addr(1, 19),
            17 => addr(0, 5),
            18 => addr(0, 4),
            19 => addr(0, 13),
            20 => addr(0, 12),
            21 => addr(0, 3),
            22 => addr(0, 2),
            23 => addr(1, 17),
            24 => addr(0, 15),
            25 => addr(3, 21),
            26 => addr(0, 14),
            27 => addr(3, 19),
            28 => addr(3, 17),
            29 => addr(3, 15),
            30 => addr(3, 16),
            31 => addr(3, 14),
            41 => addr(0, 20),
            42 => addr(0, 7),
            _ => None,
        },
    }
}
