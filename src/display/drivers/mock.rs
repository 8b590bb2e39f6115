/*
 *  display/drivers/mock.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::{Arc, Mutex};

use crate::display::error::DisplayError;
use crate::display::framebuffer::PanelFrame;
use crate::display::drivers::PanelDriver;

#[derive(Default)]
struct MockState {
    flush_count: usize,
    last_frame: Option<PanelFrame>,
}

/// Driver that records what was flushed instead of lighting pixels.
/// The shared state handle survives the driver being boxed, so tests can
/// keep a probe after handing the driver to a display.
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

/// Test-side view into a `MockDriver`'s recorded flushes.
#[derive(Clone)]
pub struct MockProbe {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        MockDriver {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn probe(&self) -> MockProbe {
        MockProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProbe {
    pub fn flush_count(&self) -> usize {
        self.state.lock().unwrap().flush_count
    }

    pub fn last_frame(&self) -> Option<PanelFrame> {
        self.state.lock().unwrap().last_frame.clone()
    }
}

impl PanelDriver for MockDriver {
    fn flush(&mut self, frame: &PanelFrame) -> Result<(), DisplayError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DisplayError::Driver("mock state poisoned".into()))?;
        state.flush_count += 1;
        state.last_frame = Some(frame.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PEN_BLUE;
    use embedded_graphics::prelude::*;

    #[test]
    fn records_flushes() {
        let mut driver = MockDriver::new();
        let probe = driver.probe();
        assert_eq!(probe.flush_count(), 0);
        assert!(probe.last_frame().is_none());

        let mut frame = PanelFrame::new();
        frame
            .draw_iter([Pixel(Point::new(1, 1), PEN_BLUE)])
            .unwrap();
        driver.flush(&frame).unwrap();
        driver.flush(&frame).unwrap();

        assert_eq!(probe.flush_count(), 2);
        let seen = probe.last_frame().unwrap();
        assert_eq!(seen.pixel(1, 1), Some(PEN_BLUE));
    }
}
