//! `LampDriver` über drei embedded-hal Ausgänge

use embedded_hal::digital::{OutputPin, PinState};

use crate::traits::{LampDriver, LampError};
use crate::types::Lamp;

/// Drei GPIO-Ausgänge: Front, Tagfahrlicht, Rücklicht
pub struct OutputPins<F, D, R> {
    front: F,
    drl: D,
    rear: R,
}

impl<F, D, R> OutputPins<F, D, R>
where
    F: OutputPin,
    D: OutputPin,
    R: OutputPin,
{
    pub fn new(front: F, drl: D, rear: R) -> Self {
        Self { front, drl, rear }
    }

    pub fn release(self) -> (F, D, R) {
        (self.front, self.drl, self.rear)
    }
}

impl<F, D, R> LampDriver for OutputPins<F, D, R>
where
    F: OutputPin,
    D: OutputPin,
    R: OutputPin,
{
    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), LampError> {
        let state = PinState::from(on);
        match lamp {
            Lamp::Front => self.front.set_state(state).map_err(|_| LampError::WriteFailed),
            Lamp::Drl => self.drl.set_state(state).map_err(|_| LampError::WriteFailed),
            Lamp::Rear => self.rear.set_state(state).map_err(|_| LampError::WriteFailed),
        }
    }
}
