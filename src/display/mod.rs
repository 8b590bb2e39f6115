/*
 *  display/mod.rs
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

pub mod components;
pub mod drivers;
pub mod error;
pub mod framebuffer;

use std::time::Duration;

use embedded_graphics::mono_font::ascii::FONT_4X6;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::warn;

use crate::display::drivers::PanelDriver;
use crate::display::error::DisplayError;
use crate::display::framebuffer::PanelFrame;

/// The panel: one frame buffer plus the driver that lights it up.
/// Shared between tasks behind `Arc<tokio::sync::Mutex<..>>`.
pub struct PanelDisplay {
    frame: PanelFrame,
    driver: Box<dyn PanelDriver + Send>,
}

impl PanelDisplay {
    pub fn new(driver: Box<dyn PanelDriver + Send>) -> Self {
        PanelDisplay {
            frame: PanelFrame::new(),
            driver,
        }
    }

    pub fn frame_mut(&mut self) -> &mut PanelFrame {
        &mut self.frame
    }

    pub fn frame(&self) -> &PanelFrame {
        &self.frame
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Push the current frame to the driver.
    pub fn flush(&mut self) -> Result<(), DisplayError> {
        self.driver.flush(&self.frame)
    }

    /// Blank the frame buffer without flushing.
    pub fn clear(&mut self) {
        self.frame.remove_clip();
        self.frame.clear_black();
    }

    /// Blank the panel and push it out immediately.
    pub fn clear_and_flush(&mut self) -> Result<(), DisplayError> {
        self.clear();
        self.flush()
    }

    /// Draw a line of small text at the given origin without clearing first.
    pub fn draw_small_text(&mut self, text: &str, origin: Point, pen: Rgb888) {
        let style = MonoTextStyle::new(&FONT_4X6, pen);
        // Infallible against the frame buffer
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.frame);
    }

    /// Clear the panel, show a line of small text, and hold it for `hold`.
    /// Used for the startup splash.
    pub async fn show_static_message(&mut self, text: &str, pen: Rgb888, hold: Duration) {
        self.clear();
        self.draw_small_text(text, Point::new(1, 2), pen);
        if let Err(e) = self.flush() {
            warn!("flush failed showing '{}': {}", text, e);
        }
        tokio::time::sleep(hold).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PEN_BLACK, PEN_YELLOW};
    use crate::display::drivers::mock::MockDriver;

    #[test]
    fn clear_and_flush_blanks_panel() {
        let driver = MockDriver::new();
        let probe = driver.probe();
        let mut display = PanelDisplay::new(Box::new(driver));

        display.draw_small_text("hi", Point::new(0, 0), PEN_YELLOW);
        assert!(display.frame().as_slice().iter().any(|c| *c == PEN_YELLOW));

        display.clear_and_flush().unwrap();
        assert_eq!(probe.flush_count(), 1);
        let frame = probe.last_frame().unwrap();
        assert!(frame.as_slice().iter().all(|c| *c == PEN_BLACK));
    }

    #[test]
    fn small_text_lights_pixels() {
        let mut display = PanelDisplay::new(Box::new(MockDriver::new()));
        display.draw_small_text("0", Point::new(0, 0), PEN_YELLOW);
        let lit = display
            .frame()
            .as_slice()
            .iter()
            .filter(|c| **c == PEN_YELLOW)
            .count();
        assert!(lit > 0);
    }
}
