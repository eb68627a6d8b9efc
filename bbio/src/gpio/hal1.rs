use embedded_hal::digital as hal1;

use crate::driver::Driver;
use crate::Error;

use super::{Level, PinHandle};

impl From<hal1::PinState> for Level {
    #[inline(always)]
    fn from(value: hal1::PinState) -> Self {
        match value {
            hal1::PinState::Low => Self::Low,
            hal1::PinState::High => Self::High,
        }
    }
}

impl From<Level> for hal1::PinState {
    #[inline(always)]
    fn from(value: Level) -> Self {
        match value {
            Level::Low => Self::Low,
            Level::High => Self::High,
        }
    }
}

impl<D: Driver> hal1::ErrorType for PinHandle<'_, D> {
    type Error = Error;
}

impl<D: Driver> hal1::InputPin for PinHandle<'_, D> {
    #[inline(always)]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        PinHandle::is_high(self)
    }

    #[inline(always)]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        PinHandle::is_low(self)
    }
}

impl<D: Driver> hal1::OutputPin for PinHandle<'_, D> {
    #[inline(always)]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        PinHandle::set_low(self)
    }

    #[inline(always)]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        PinHandle::set_high(self)
    }

    #[inline(always)]
    fn set_state(&mut self, state: hal1::PinState) -> Result<(), Self::Error> {
        PinHandle::set(self, state.into())
    }
}

impl<D: Driver> hal1::StatefulOutputPin for PinHandle<'_, D> {
    #[inline(always)]
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(PinHandle::get_state(self)?.is_high())
    }

    #[inline(always)]
    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(PinHandle::get_state(self)?.is_low())
    }

    #[inline(always)]
    fn toggle(&mut self) -> Result<(), Self::Error> {
        PinHandle::toggle(self)
    }
}
