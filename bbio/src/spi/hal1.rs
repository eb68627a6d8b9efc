use embedded_hal::spi as hal1;

use crate::driver::Driver;
use crate::Error;

use super::Port;

impl<D: Driver> hal1::ErrorType for Port<'_, D> {
    type Error = Error;
}

// Each call is one chip-select assertion; words are the port's configured
// width, carried in the low bits of each u32.
impl<D: Driver> hal1::SpiBus<u32> for Port<'_, D> {
    #[inline(always)]
    fn read(&mut self, words: &mut [u32]) -> Result<(), Self::Error> {
        Port::read(self, words)
    }

    #[inline(always)]
    fn write(&mut self, words: &[u32]) -> Result<(), Self::Error> {
        Port::write(self, words)
    }

    #[inline(always)]
    fn transfer(&mut self, read: &mut [u32], write: &[u32]) -> Result<(), Self::Error> {
        Port::transfer(self, read, write)
    }

    #[inline(always)]
    fn transfer_in_place(&mut self, words: &mut [u32]) -> Result<(), Self::Error> {
        Port::transfer_in_place(self, words)
    }

    #[inline(always)]
    fn flush(&mut self) -> Result<(), Self::Error> {
        // exchanges block until the shift completes; nothing is buffered
        Ok(())
    }
}
