//! Raspberry Pi pin adapters (enabled by the `hardware` feature).
//!
//! Thin wrappers mapping `rppal` GPIO pins onto the crate's [`GpioPin`] and
//! [`InputPin`] traits, so the sensor drivers run unchanged on the
//! installation's Pi. Pin numbers are BCM, matching the wiring sheet.
//! [`crate::clock::SystemClock`] already serves as the clock on the Pi.

use crate::sensor::{GpioPin, InputPin, SensorError};
use rppal::gpio::Gpio;

pub struct PiTriggerPin {
    pin: rppal::gpio::OutputPin,
}

pub struct PiEchoPin {
    pin: rppal::gpio::InputPin,
}

impl PiTriggerPin {
    pub fn new(gpio: &Gpio, bcm: u8) -> Result<Self, SensorError> {
        let pin = gpio
            .get(bcm)
            .map_err(|e| SensorError(e.to_string()))?
            .into_output_low();
        Ok(Self { pin })
    }
}

impl PiEchoPin {
    pub fn new(gpio: &Gpio, bcm: u8) -> Result<Self, SensorError> {
        let pin = gpio
            .get(bcm)
            .map_err(|e| SensorError(e.to_string()))?
            .into_input_pulldown();
        Ok(Self { pin })
    }
}

impl GpioPin for PiTriggerPin {
    fn set_high(&mut self) -> Result<(), SensorError> {
        self.pin.set_high();
        Ok(())
    }
    fn set_low(&mut self) -> Result<(), SensorError> {
        self.pin.set_low();
        Ok(())
    }
}

impl InputPin for PiEchoPin {
    fn is_high(&self) -> Result<bool, SensorError> {
        Ok(self.pin.is_high())
    }
}
