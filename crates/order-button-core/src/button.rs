//! Push-button edge detection.

use embedded_hal::digital::InputPin;

/// What a single poll of the button observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Newly pressed since the last release
    Pressed,
    /// Still held after a press was already reported
    Held,
    /// Not pressed
    Released,
}

/// Reports a press once per physical press.
///
/// The button is active low. After a press is reported, further polls that
/// still read low are [`ButtonEvent::Held`] until a high reading re-arms it.
pub struct PressDetector<P> {
    pin: P,
    armed: bool,
}

impl<P: InputPin> PressDetector<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, armed: true }
    }

    /// Samples the pin. A read error counts as released.
    pub fn poll(&mut self) -> ButtonEvent {
        let pressed = self.pin.is_low().unwrap_or(false);
        match (pressed, self.armed) {
            (true, true) => {
                self.armed = false;
                ButtonEvent::Pressed
            }
            (true, false) => ButtonEvent::Held,
            (false, _) => {
                self.armed = true;
                ButtonEvent::Released
            }
        }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}
