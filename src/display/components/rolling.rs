/*
 *  display/components/rolling.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  The digit-roll primitive: a changed digit scrolls vertically through
 *  its cell over six frames, old glyph out, new glyph in.
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

use embedded_graphics::image::{GetPixel, ImageRaw};
use embedded_graphics::pixelcolor::{BinaryColor, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::clock_font::ClockFontData;
use crate::constants::{PEN_BLACK, ROLL_FRAMES};
use crate::display::framebuffer::PanelFrame;

/// One frame of a single digit's roll animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollStep {
    pub x: i32,
    pub y: i32,
    pub old: u8,
    pub new: u8,
    /// Frame index 0..ROLL_FRAMES. At the final frame the new digit sits
    /// exactly in the cell.
    pub frame: u8,
    /// Roll downward instead of upward.
    pub reverse: bool,
}

/// Paint a glyph's lit pixels in `pen` at the given origin. Unlit glyph
/// pixels are left alone so the caller controls the background.
pub fn blit_glyph(
    frame: &mut PanelFrame,
    glyph: &ImageRaw<'_, BinaryColor>,
    pen: Rgb888,
    origin: Point,
) {
    let size = glyph.size();
    for gy in 0..size.height as i32 {
        for gx in 0..size.width as i32 {
            if glyph.pixel(Point::new(gx, gy)) == Some(BinaryColor::On) {
                let _ = frame.draw_iter([Pixel(origin + Point::new(gx, gy), pen)]);
            }
        }
    }
}

fn cell_rect(font: &ClockFontData<'_>, x: i32, y: i32) -> Rectangle {
    Rectangle::new(
        Point::new(x, y),
        Size::new(font.digit_width, font.digit_height),
    )
}

/// Draw a digit at rest in its cell.
pub fn show_digit(
    frame: &mut PanelFrame,
    font: &ClockFontData<'_>,
    pen: Rgb888,
    digit: u8,
    x: i32,
    y: i32,
) {
    let Some(glyph) = font.digit(digit) else {
        return;
    };
    frame.fill_rect(cell_rect(font, x, y), PEN_BLACK);
    blit_glyph(frame, glyph, pen, Point::new(x, y));
}

/// Draw one frame of a digit roll. The cell is clipped so the moving
/// glyphs never bleed into neighbouring slots or the date line.
pub fn scroll_digit(frame: &mut PanelFrame, font: &ClockFontData<'_>, pen: Rgb888, step: RollStep) {
    debug_assert!(step.frame < ROLL_FRAMES);
    debug_assert!(step.old < 10 && step.new < 10);
    let (Some(old_glyph), Some(new_glyph)) = (font.digit(step.old), font.digit(step.new)) else {
        return;
    };

    let cell = cell_rect(font, step.x, step.y);
    let height = font.digit_height as i32;
    let shift = step.frame as i32 + 1;

    frame.set_clip(cell);
    frame.fill_rect(cell, PEN_BLACK);
    if step.reverse {
        blit_glyph(frame, old_glyph, pen, Point::new(step.x, step.y + shift));
        blit_glyph(
            frame,
            new_glyph,
            pen,
            Point::new(step.x, step.y - height + shift),
        );
    } else {
        blit_glyph(frame, old_glyph, pen, Point::new(step.x, step.y - shift));
        blit_glyph(
            frame,
            new_glyph,
            pen,
            Point::new(step.x, step.y + height - shift),
        );
    }
    frame.remove_clip();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock_font::panel_font;
    use crate::constants::PEN_YELLOW;

    fn run_roll(reverse: bool) -> (PanelFrame, PanelFrame) {
        let font = panel_font();
        let (x, y) = (10, 2);

        let mut animated = PanelFrame::new();
        show_digit(&mut animated, &font, PEN_YELLOW, 3, x, y);
        for f in 0..ROLL_FRAMES {
            scroll_digit(
                &mut animated,
                &font,
                PEN_YELLOW,
                RollStep {
                    x,
                    y,
                    old: 3,
                    new: 4,
                    frame: f,
                    reverse,
                },
            );
        }

        let mut settled = PanelFrame::new();
        show_digit(&mut settled, &font, PEN_YELLOW, 4, x, y);
        (animated, settled)
    }

    #[test]
    fn roll_lands_on_new_digit() {
        let (animated, settled) = run_roll(false);
        assert_eq!(animated.as_slice(), settled.as_slice());
    }

    #[test]
    fn reverse_roll_lands_on_new_digit() {
        let (animated, settled) = run_roll(true);
        assert_eq!(animated.as_slice(), settled.as_slice());
    }

    #[test]
    fn roll_stays_inside_cell() {
        let font = panel_font();
        let (x, y) = (20, 3);
        let mut frame = PanelFrame::new();
        scroll_digit(
            &mut frame,
            &font,
            PEN_YELLOW,
            RollStep {
                x,
                y,
                old: 8,
                new: 1,
                frame: 2,
                reverse: false,
            },
        );
        for py in 0..crate::constants::PANEL_HEIGHT as i32 {
            for px in 0..crate::constants::PANEL_WIDTH as i32 {
                let inside = px >= x
                    && px < x + font.digit_width as i32
                    && py >= y
                    && py < y + font.digit_height as i32;
                if !inside {
                    assert_eq!(frame.pixel(px, py), Some(PEN_BLACK), "leak at {},{}", px, py);
                }
            }
        }
    }
}
