//! Driving real PWM peripherals through `embedded-hal`.

use crate::{control::Output, Control, Error, Model};
use embedded_hal::Pwm;
use num_traits::{FromPrimitive, ToPrimitive};

/// Three-phase PWM output stage.
pub trait PwmOutput {
    /// Apply the duty ratios (0 to 1) of phases a, b and c.
    fn drive(&mut self, d_abc: [f64; 3]) -> Result<(), Error>;

    fn enable(&mut self);

    fn disable(&mut self);
}

/// Three channels of an `embedded-hal` PWM timer.
pub struct HalPwm<T, C> {
    pub pwm: T,
    pub channels: [C; 3],
}

impl<T, C> HalPwm<T, C> {
    pub fn new(pwm: T, channels: [C; 3]) -> Self {
        Self { pwm, channels }
    }
}

impl<T, C> PwmOutput for HalPwm<T, C>
where
    T: Pwm<Channel = C>,
    T::Duty: FromPrimitive + ToPrimitive,
    C: Clone,
{
    fn drive(&mut self, d_abc: [f64; 3]) -> Result<(), Error> {
        let max_duty = self
            .pwm
            .get_max_duty()
            .to_f64()
            .ok_or(Error::Duty(1.))?;

        for (channel, d) in self.channels.iter().cloned().zip(d_abc) {
            let duty = T::Duty::from_f64((max_duty * d.clamp(0., 1.)).round()).ok_or(Error::Duty(d))?;
            self.pwm.set_duty(channel, duty);
        }
        Ok(())
    }

    fn enable(&mut self) {
        for channel in self.channels.iter().cloned() {
            self.pwm.enable(channel);
        }
    }

    fn disable(&mut self) {
        for channel in self.channels.iter().cloned() {
            self.pwm.disable(channel);
        }
    }
}

/// A controller running against measured feedback and a PWM output stage.
pub struct Motor<M, C, P> {
    pub model: M,
    pub control: C,
    pub output: P,
    is_armed: bool,
}

impl<M, C, P> Motor<M, C, P>
where
    M: Model,
    C: Control<M>,
    P: PwmOutput,
{
    pub fn new(model: M, control: C, output: P) -> Self {
        Self {
            model,
            control,
            output,
            is_armed: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.is_armed
    }

    pub fn arm(&mut self) {
        self.output.enable();
        self.is_armed = true;
    }

    pub fn disarm(&mut self) {
        self.output.disable();
        self.is_armed = false;
    }

    /// Run one controller execution and write its duty ratios.
    pub fn step(&mut self) -> Result<Output, Error> {
        if !self.is_armed {
            return Err(Error::NotArmed);
        }

        let output = self.control.control(&mut self.model);
        self.output.drive(output.d_abc_ref)?;
        Ok(output)
    }
}
