//! # Ultrasonic Hoop Sensors
//!
//! Each hoop carries an HC-SR04-style ultrasonic sensor pointed across the
//! rim: a ball passing through reflects the ping at close range. This module
//! drives the trigger/echo pin pair and converts echo pulse width to
//! distance.
//!
//! The pins come in through the [`GpioPin`]/[`InputPin`] traits so the
//! drivers stay testable off-hardware; the `hardware` feature provides
//! `rppal`-backed implementations in [`crate::rpi`].
//!
//! ## Cross-talk
//! The three MVP hoops sit close together on one wall. Triggering them one
//! after another lets sensor B hear sensor A's ping, so [`HoopArray`] fires
//! all three triggers in the same instant and then polls all three echo pins
//! cooperatively inside a single bounded window — one "simultaneous" reading
//! per call, with each sensor's pulse timed independently.

use crate::clock::Clock;
use crate::config::SensorConfig;
use crate::cooldown::Cooldown;
use crate::{Pattern, NUM_HOOPS};
use thiserror::Error;
use tracing::trace;

/// Speed of sound in centimeters per microsecond.
pub const SOUND_SPEED_CM_PER_US: f32 = 0.0343;

/// Error raised by a hardware pin implementation.
#[derive(Error, Debug)]
#[error("sensor pin error: {0}")]
pub struct SensorError(pub String);

/// Output pin (sensor trigger).
pub trait GpioPin {
    fn set_high(&mut self) -> Result<(), SensorError>;
    fn set_low(&mut self) -> Result<(), SensorError>;
}

/// Input pin (sensor echo).
pub trait InputPin {
    fn is_high(&self) -> Result<bool, SensorError>;
}

/// Busy-wait for `us` microseconds against the monotonic clock.
///
/// The control loop is the only thing running on the target, so a
/// microsecond-scale spin is cheaper and more precise than yielding.
fn spin_us(clock: &impl Clock, us: u32) {
    let t0 = clock.now_micros();
    while clock.now_micros().wrapping_sub(t0) < us {}
}

/// Convert an echo pulse width to centimeters (out and back, so half).
fn pulse_to_cm(duration_us: u32) -> f32 {
    duration_us as f32 * SOUND_SPEED_CM_PER_US / 2.0
}

/// Where one echo pin stands inside a polling window.
#[derive(Clone, Copy)]
enum EchoPhase {
    WaitRise,
    High { rise: u32 },
    Done { duration_us: u32 },
    TimedOut,
}

/// A single hoop's ultrasonic sensor with its own debounce cooldown.
pub struct BasketSensor<TRIG, ECHO> {
    trig_pin: TRIG,
    echo_pin: ECHO,
    cooldown: Cooldown,
    config: SensorConfig,
}

impl<TRIG, ECHO> BasketSensor<TRIG, ECHO>
where
    TRIG: GpioPin,
    ECHO: InputPin,
{
    pub fn new(trig_pin: TRIG, echo_pin: ECHO, config: SensorConfig, clock: &impl Clock) -> Self {
        Self {
            trig_pin,
            echo_pin,
            cooldown: Cooldown::new(clock),
            config,
        }
    }

    /// 2 µs settle low, 10 µs trigger high, low again.
    fn trigger_pulse(&mut self, clock: &impl Clock) -> Result<(), SensorError> {
        self.trig_pin.set_low()?;
        spin_us(clock, 2);
        self.trig_pin.set_high()?;
        spin_us(clock, 10);
        self.trig_pin.set_low()?;
        Ok(())
    }

    /// Fire the trigger and measure the echo.
    ///
    /// Returns `Ok(None)` when the echo never rises or never falls inside
    /// the configured timeout — "nothing in range this cycle", not a fault.
    pub fn measure_distance(&mut self, clock: &impl Clock) -> Result<Option<f32>, SensorError> {
        self.trigger_pulse(clock)?;
        let timeout_us = self.config.echo_timeout_us;

        // Wait for the echo pulse to start
        let sent = clock.now_micros();
        let rise = loop {
            let now = clock.now_micros();
            if self.echo_pin.is_high()? {
                break now;
            }
            if now.wrapping_sub(sent) > timeout_us {
                trace!("echo never rose, no reading");
                return Ok(None);
            }
        };

        // Measure the pulse width
        let duration_us = loop {
            let now = clock.now_micros();
            if !self.echo_pin.is_high()? {
                break now.wrapping_sub(rise);
            }
            if now.wrapping_sub(rise) > timeout_us {
                trace!("echo never fell, no reading");
                return Ok(None);
            }
        };

        Ok(Some(pulse_to_cm(duration_us)))
    }

    /// One debounced detection check.
    ///
    /// While on cooldown the sensor is not even fired. Off cooldown, a
    /// reading strictly inside `(min_valid_cm, threshold_cm)` counts as a
    /// ball and opens a new cooldown window.
    pub fn ball_detected(&mut self, clock: &impl Clock) -> Result<bool, SensorError> {
        self.cooldown.update(clock);
        if self.cooldown.is_active() {
            return Ok(false);
        }

        match self.measure_distance(clock)? {
            Some(distance_cm)
                if distance_cm > self.config.min_valid_cm
                    && distance_cm < self.config.threshold_cm =>
            {
                trace!(distance_cm, "ball detected");
                self.cooldown.start(self.config.cooldown_ms, clock);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }
}

/// The three MVP hoop sensors, read as one unit.
pub struct HoopArray<TRIG, ECHO> {
    trig_pins: [TRIG; NUM_HOOPS],
    echo_pins: [ECHO; NUM_HOOPS],
    config: SensorConfig,
}

impl<TRIG, ECHO> HoopArray<TRIG, ECHO>
where
    TRIG: GpioPin,
    ECHO: InputPin,
{
    pub fn new(trig_pins: [TRIG; NUM_HOOPS], echo_pins: [ECHO; NUM_HOOPS], config: SensorConfig) -> Self {
        Self {
            trig_pins,
            echo_pins,
            config,
        }
    }

    /// Fire every trigger in the same instant.
    fn trigger_all(&mut self, clock: &impl Clock) -> Result<(), SensorError> {
        for pin in &mut self.trig_pins {
            pin.set_low()?;
        }
        spin_us(clock, 2);
        for pin in &mut self.trig_pins {
            pin.set_high()?;
        }
        spin_us(clock, 10);
        for pin in &mut self.trig_pins {
            pin.set_low()?;
        }
        Ok(())
    }

    /// One simultaneous reading across all three hoops.
    ///
    /// All triggers fire together, then the echo pins are polled
    /// cooperatively: each sensor's pulse start and end are recorded
    /// independently inside one bounded window. A sensor whose pulse never
    /// completes contributes no bit. Bit *i* of the result is set when hoop
    /// *i* saw something strictly inside `(min_valid_cm, threshold_cm)`.
    pub fn check_sensors(&mut self, clock: &impl Clock) -> Result<Pattern, SensorError> {
        self.trigger_all(clock)?;
        let timeout_us = self.config.echo_timeout_us;

        let sent = clock.now_micros();
        let mut phases = [EchoPhase::WaitRise; NUM_HOOPS];
        loop {
            let now = clock.now_micros();
            let mut pending = false;
            for (i, phase) in phases.iter_mut().enumerate() {
                match *phase {
                    EchoPhase::WaitRise => {
                        if self.echo_pins[i].is_high()? {
                            *phase = EchoPhase::High { rise: now };
                            pending = true;
                        } else if now.wrapping_sub(sent) > timeout_us {
                            *phase = EchoPhase::TimedOut;
                        } else {
                            pending = true;
                        }
                    }
                    EchoPhase::High { rise } => {
                        if !self.echo_pins[i].is_high()? {
                            *phase = EchoPhase::Done {
                                duration_us: now.wrapping_sub(rise),
                            };
                        } else if now.wrapping_sub(rise) > timeout_us {
                            *phase = EchoPhase::TimedOut;
                        } else {
                            pending = true;
                        }
                    }
                    EchoPhase::Done { .. } | EchoPhase::TimedOut => {}
                }
            }
            if !pending {
                break;
            }
        }

        let mut detected = Pattern::NONE;
        for (i, phase) in phases.iter().enumerate() {
            if let EchoPhase::Done { duration_us } = *phase {
                let distance_cm = pulse_to_cm(duration_us);
                if distance_cm > self.config.min_valid_cm && distance_cm < self.config.threshold_cm
                {
                    detected |= Pattern::single(i);
                }
            }
        }
        if !detected.is_empty() {
            trace!(detected = %detected, "simultaneous reading");
        }
        Ok(detected)
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }
}
