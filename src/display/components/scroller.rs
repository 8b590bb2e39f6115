/*
 *  display/components/scroller.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Right-to-left message scroller. A message of pixel width W enters from
 *  the right edge and leaves on the left, one pixel per frame, for exactly
 *  W plus panel-width frames.
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

use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::warn;
use tokio::sync::Mutex;

use crate::constants::PANEL_WIDTH;
use crate::display::PanelDisplay;

/// Pixel width of `text` in the 4x6 panel font (4 columns per glyph,
/// advance included).
pub fn measure_text(text: &str) -> i32 {
    text.chars().count() as i32 * 4
}

/// Scroll `text` across the panel once. Clears and redraws the whole frame
/// each step; returns when the tail has left the panel.
pub async fn scroll_msg(
    display: &Mutex<PanelDisplay>,
    text: &str,
    pen: Rgb888,
    step_delay: Duration,
) {
    let width = measure_text(text);
    let mut x = PANEL_WIDTH as i32;
    while x > -width {
        {
            let mut display = display.lock().await;
            display.clear();
            display.draw_small_text(text, Point::new(x, 2), pen);
            if let Err(e) = display.flush() {
                warn!("scroll flush failed: {}", e);
            }
        }
        x -= 1;
        if !step_delay.is_zero() {
            tokio::time::sleep(step_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PEN_YELLOW;
    use crate::display::drivers::mock::MockDriver;

    #[test]
    fn measures_in_font_columns() {
        assert_eq!(measure_text(""), 0);
        assert_eq!(measure_text("ABC"), 12);
    }

    #[tokio::test]
    async fn one_pass_is_width_plus_panel_frames() {
        let driver = MockDriver::new();
        let probe = driver.probe();
        let display = Mutex::new(PanelDisplay::new(Box::new(driver)));

        scroll_msg(&display, "ABC", PEN_YELLOW, Duration::ZERO).await;

        assert_eq!(
            probe.flush_count() as i32,
            measure_text("ABC") + PANEL_WIDTH as i32
        );
    }
}
