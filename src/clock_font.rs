/*
 *  clock_font.rs
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

use embedded_graphics::{image::ImageRaw, pixelcolor::BinaryColor};

use crate::constants::{COLON_WIDTH, DIGIT_HEIGHT, DIGIT_WIDTH};

/// All the bitmap data needed to draw the clock face. Digits are fixed-cell
/// glyphs so the roll animation can treat every slot identically.
pub struct ClockFontData<'a> {
    pub digit_width: u32,
    pub digit_height: u32,
    digits: [ImageRaw<'a, BinaryColor>; 10],
    colon: ImageRaw<'a, BinaryColor>,
}

impl<'a> ClockFontData<'a> {
    pub fn new(
        digit_width: u32,
        digit_height: u32,
        digits: [ImageRaw<'a, BinaryColor>; 10],
        colon: ImageRaw<'a, BinaryColor>,
    ) -> Self {
        ClockFontData {
            digit_width,
            digit_height,
            digits,
            colon,
        }
    }

    /// The glyph for a digit value 0-9, or `None` outside that range.
    pub fn digit(&self, value: u8) -> Option<&ImageRaw<'a, BinaryColor>> {
        self.digits.get(value as usize)
    }

    pub fn colon(&self) -> &ImageRaw<'a, BinaryColor> {
        &self.colon
    }
}

// 5x6 digit glyphs, one byte per row, bits MSB-first.
const DIGIT_ROWS: [[u8; 6]; 10] = [
    [0x70, 0x88, 0x88, 0x88, 0x88, 0x70], // 0
    [0x20, 0x60, 0x20, 0x20, 0x20, 0x70], // 1
    [0x70, 0x88, 0x08, 0x30, 0x40, 0xf8], // 2
    [0xf8, 0x10, 0x20, 0x10, 0x88, 0x70], // 3
    [0x10, 0x30, 0x50, 0x90, 0xf8, 0x10], // 4
    [0xf8, 0x80, 0xf0, 0x08, 0x88, 0x70], // 5
    [0x30, 0x40, 0x80, 0xf0, 0x88, 0x70], // 6
    [0xf8, 0x08, 0x10, 0x20, 0x40, 0x40], // 7
    [0x70, 0x88, 0x70, 0x88, 0x88, 0x70], // 8
    [0x70, 0x88, 0x78, 0x08, 0x10, 0x60], // 9
];

// 2x6 colon cell, dots on rows 1 and 4.
const COLON_ROWS: [u8; 6] = [0x00, 0x80, 0x00, 0x00, 0x80, 0x00];

/// The built-in panel font used by the rolling clock.
pub fn panel_font() -> ClockFontData<'static> {
    let digits = [
        ImageRaw::new(&DIGIT_ROWS[0], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[1], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[2], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[3], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[4], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[5], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[6], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[7], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[8], DIGIT_WIDTH),
        ImageRaw::new(&DIGIT_ROWS[9], DIGIT_WIDTH),
    ];
    let colon = ImageRaw::new(&COLON_ROWS, COLON_WIDTH);
    ClockFontData::new(DIGIT_WIDTH, DIGIT_HEIGHT, digits, colon)
}
