//! One [`GpioPort`] pin as an `embedded-hal` [`OutputPin`].

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::app::ports::{GpioPort, Level, PinMode};
use crate::pins::Pin;

pub struct PortPin<G> {
    port: G,
    pin: Pin,
}

impl<G: GpioPort> PortPin<G> {
    /// Claims `pin` as an output.
    pub fn new(mut port: G, pin: Pin) -> Self {
        port.pin_mode(pin, PinMode::Output);
        Self { port, pin }
    }

    pub fn pin(&self) -> Pin {
        self.pin
    }

    pub fn port(&self) -> &G {
        &self.port
    }
}

impl<G> ErrorType for PortPin<G> {
    type Error = Infallible;
}

impl<G: GpioPort> OutputPin for PortPin<G> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.port.digital_write(self.pin, Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.port.digital_write(self.pin, Level::High);
        Ok(())
    }
}
