/*
 *  display/components/clock.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  The clock face: six rolling digits, two blinking colons, and the date
 *  line underneath.
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

use std::time::{Duration, Instant};

use chrono::Timelike;
use embedded_graphics::mono_font::ascii::FONT_4X6;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use log::warn;

use crate::clock_font::{panel_font, ClockFontData};
use crate::constants::{
    CLOCK_CYCLE_MS, CLOCK_DIGITS_X, CLOCK_Y, COLON_HM_X, COLON_MS_X, COLON_WIDTH, DATE_Y,
    DIGIT_HEIGHT, PANEL_WIDTH, PEN_BLACK, PEN_GREY, PEN_YELLOW, ROLL_FRAMES, ROLL_STEP_MS,
};
use crate::context::PanelContext;
use crate::display::components::rolling::{blit_glyph, scroll_digit, show_digit, RollStep};
use crate::display::framebuffer::PanelFrame;
use crate::timeutil::{effective_time, format_date, time_digits};

/// The rolling clock. Holds the glyphs and the digits currently on screen.
pub struct RollingClock {
    font: ClockFontData<'static>,
    shown: Option<[u8; 6]>,
}

impl RollingClock {
    pub fn new() -> Self {
        RollingClock {
            font: panel_font(),
            shown: None,
        }
    }

    /// Render one sub-frame of the transition from `old` to `new` digits.
    /// Slots whose digit is unchanged are drawn at rest; changed slots get
    /// the roll animation at `step`. Pure frame-buffer work, no timing.
    pub fn render_frame_step(
        &self,
        frame: &mut PanelFrame,
        old: &[u8; 6],
        new: &[u8; 6],
        step: u8,
        colon_on: bool,
        date: &str,
    ) {
        for (slot, x) in CLOCK_DIGITS_X.iter().enumerate() {
            if old[slot] == new[slot] {
                show_digit(frame, &self.font, PEN_YELLOW, new[slot], *x, CLOCK_Y);
            } else {
                scroll_digit(
                    frame,
                    &self.font,
                    PEN_YELLOW,
                    RollStep {
                        x: *x,
                        y: CLOCK_Y,
                        old: old[slot],
                        new: new[slot],
                        frame: step,
                        reverse: false,
                    },
                );
            }
        }
        self.draw_colons(frame, colon_on);
        self.draw_date(frame, date);
    }

    fn draw_colons(&self, frame: &mut PanelFrame, on: bool) {
        let pen = if on { PEN_YELLOW } else { PEN_BLACK };
        for x in [COLON_HM_X, COLON_MS_X] {
            frame.fill_rect(
                Rectangle::new(Point::new(x, CLOCK_Y), Size::new(COLON_WIDTH, DIGIT_HEIGHT)),
                PEN_BLACK,
            );
            blit_glyph(frame, self.font.colon(), pen, Point::new(x, CLOCK_Y));
        }
    }

    fn draw_date(&self, frame: &mut PanelFrame, date: &str) {
        frame.fill_rect(
            Rectangle::new(Point::new(0, DATE_Y), Size::new(PANEL_WIDTH, 6)),
            PEN_BLACK,
        );
        let width = date.len() as i32 * 4;
        let x = ((PANEL_WIDTH as i32 - width) / 2).max(0);
        let style = MonoTextStyle::new(&FONT_4X6, PEN_GREY);
        let _ = Text::with_baseline(date, Point::new(x, DATE_Y), style, Baseline::Top).draw(frame);
    }

    /// Run the clock until the caller cancels it. Once per second: work out
    /// the new digit set, roll the changed slots over six frames, then sleep
    /// out the remainder of the cycle.
    pub async fn run(&mut self, ctx: &PanelContext) {
        // Start static; digits only roll on changes seen while running
        self.shown = None;
        loop {
            let cycle_start = Instant::now();
            let dt = ctx.clock.now().naive_local();
            let new = time_digits(dt, ctx.settings.bst);
            let old = self.shown.unwrap_or(new);
            let shown = effective_time(dt, ctx.settings.bst);
            let colon_on = shown.second() % 2 == 0;
            let date = format_date(shown.date());

            for step in 0..ROLL_FRAMES {
                {
                    let mut display = ctx.display.lock().await;
                    self.render_frame_step(display.frame_mut(), &old, &new, step, colon_on, &date);
                    if let Err(e) = display.flush() {
                        warn!("clock flush failed: {}", e);
                    }
                }
                tokio::time::sleep(Duration::from_millis(ROLL_STEP_MS)).await;
            }
            self.shown = Some(new);

            let elapsed = cycle_start.elapsed();
            let cycle = Duration::from_millis(CLOCK_CYCLE_MS);
            if elapsed < cycle {
                tokio::time::sleep(cycle - elapsed).await;
            }
        }
    }
}

impl Default for RollingClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_digits_render_identically_across_steps() {
        let clock = RollingClock::new();
        let digits = [1, 2, 3, 4, 5, 6];

        let mut first = PanelFrame::new();
        clock.render_frame_step(&mut first, &digits, &digits, 0, true, "20 Sep 2023");
        for step in 1..ROLL_FRAMES {
            let mut frame = PanelFrame::new();
            clock.render_frame_step(&mut frame, &digits, &digits, step, true, "20 Sep 2023");
            assert_eq!(frame.as_slice(), first.as_slice(), "step {}", step);
        }
    }

    #[test]
    fn changed_slot_settles_on_new_digit() {
        let clock = RollingClock::new();
        let old = [1, 2, 3, 4, 5, 6];
        let new = [1, 2, 3, 4, 5, 7];

        let mut animated = PanelFrame::new();
        for step in 0..ROLL_FRAMES {
            clock.render_frame_step(&mut animated, &old, &new, step, false, "01 Jan 2024");
        }
        let mut settled = PanelFrame::new();
        clock.render_frame_step(&mut settled, &new, &new, 0, false, "01 Jan 2024");
        assert_eq!(animated.as_slice(), settled.as_slice());
    }

    #[test]
    fn colon_blinks() {
        let clock = RollingClock::new();
        let digits = [0, 0, 0, 0, 0, 0];
        let mut on = PanelFrame::new();
        clock.render_frame_step(&mut on, &digits, &digits, 0, true, "");
        let mut off = PanelFrame::new();
        clock.render_frame_step(&mut off, &digits, &digits, 0, false, "");
        // Colon dots sit at rows 1 and 4 of the cell
        assert_eq!(on.pixel(COLON_HM_X, CLOCK_Y + 1), Some(PEN_YELLOW));
        assert_eq!(off.pixel(COLON_HM_X, CLOCK_Y + 1), Some(PEN_BLACK));
    }
}
