//! Userspace control of BeagleBone Black header pins.
//!
//! This crate covers two usage patterns: driving individual GPIO lines on
//! the P8/P9 expansion headers, and running master transactions on the two
//! McSPI buses. It does not touch `/dev/mem` itself; all register traffic
//! goes through a [driver::Driver] implementation supplied by the caller.
//! A simulated driver lives in [sim] for tests and demos.
//!
//! Everything hangs off an [Io], which maps the peripherals once per
//! process and releases them when dropped:
//!
//! ```no_run
//! use bbio::board::{Header, PinId};
//! use bbio::gpio::{Direction, Level};
//!
//! let io = bbio::Io::init(bbio::sim::SimDriver::new())?;
//! let mut led = io.claim(PinId::new(Header::P9, 14), Direction::Output)?;
//! led.set(Level::High)?;
//! # Ok::<(), bbio::Error>(())
//! ```

pub mod board;
pub mod driver;

mod error;
pub use error::Error;

pub mod gpio;
pub mod io;
pub mod runner;
pub mod sim;
pub mod spi;
pub mod time;

pub use io::Io;
