//! Camera power sequencing. The sensor has to be powered and out of reset before the CSI-2 link
//! can leave stop state.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

/// Time the reset line is held after power up, in milliseconds.
pub const RESET_HOLD_MS: u16 = 1;

/// Time the sensor needs after reset before it starts streaming, in milliseconds.
pub const STARTUP_MS: u16 = 20;

/// Power down (active high) and reset (active low) lines of the camera module.
pub struct CameraPower<PWDN, RST> {
    pwdn: PWDN,
    reset: RST,
}

impl<PWDN, RST, E> CameraPower<PWDN, RST>
where
    PWDN: OutputPin<Error = E>,
    RST: OutputPin<Error = E>,
{
    pub fn new(pwdn: PWDN, reset: RST) -> Self {
        CameraPower { pwdn, reset }
    }

    /// Power the camera and release it from reset.
    pub fn power_up<D: DelayMs<u16>>(&mut self, delay: &mut D) -> Result<(), E> {
        self.reset.set_low()?;
        self.pwdn.set_low()?;
        delay.delay_ms(RESET_HOLD_MS);
        self.reset.set_high()?;
        delay.delay_ms(STARTUP_MS);
        Ok(())
    }

    /// Hold the camera in reset and power it down.
    pub fn power_down(&mut self) -> Result<(), E> {
        self.reset.set_low()?;
        self.pwdn.set_high()
    }

    pub fn release(self) -> (PWDN, RST) {
        (self.pwdn, self.reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;

    /// Pin writes and delays, in order.
    #[derive(Debug, Eq, PartialEq)]
    enum Event {
        Pwdn(bool),
        Reset(bool),
        Delay(u16),
    }

    struct Pin<'a> {
        log: &'a RefCell<Vec<Event>>,
        make: fn(bool) -> Event,
    }

    impl OutputPin for Pin<'_> {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.make)(false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.make)(true));
            Ok(())
        }
    }

    struct Delay<'a>(&'a RefCell<Vec<Event>>);

    impl DelayMs<u16> for Delay<'_> {
        fn delay_ms(&mut self, ms: u16) {
            self.0.borrow_mut().push(Event::Delay(ms));
        }
    }

    fn camera(log: &RefCell<Vec<Event>>) -> CameraPower<Pin<'_>, Pin<'_>> {
        CameraPower::new(
            Pin {
                log,
                make: Event::Pwdn,
            },
            Pin {
                log,
                make: Event::Reset,
            },
        )
    }

    #[test]
    fn power_up_releases_reset_after_power() {
        let log = RefCell::new(Vec::new());
        let mut cam = camera(&log);
        cam.power_up(&mut Delay(&log)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Reset(false),
                Event::Pwdn(false),
                Event::Delay(RESET_HOLD_MS),
                Event::Reset(true),
                Event::Delay(STARTUP_MS),
            ]
        );
    }

    #[test]
    fn power_down_asserts_reset_first() {
        let log = RefCell::new(Vec::new());
        let mut cam = camera(&log);
        cam.power_down().unwrap();
        assert_eq!(*log.borrow(), vec![Event::Reset(false), Event::Pwdn(true)]);
    }
}
