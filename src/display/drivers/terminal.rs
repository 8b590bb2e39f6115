/*
 *  display/drivers/terminal.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Renders the panel into the controlling terminal with ANSI true-colour
 *  escapes. Handy on a desk when the real matrix is somewhere else.
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

use std::io::{self, Write};

use embedded_graphics::prelude::*;

use crate::constants::{PANEL_HEIGHT, PANEL_WIDTH, PEN_BLACK};
use crate::display::error::DisplayError;
use crate::display::framebuffer::PanelFrame;
use crate::display::drivers::PanelDriver;

pub struct TerminalDriver {
    out: io::Stdout,
    first_flush: bool,
}

impl TerminalDriver {
    pub fn new() -> Self {
        TerminalDriver {
            out: io::stdout(),
            first_flush: true,
        }
    }
}

impl Default for TerminalDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelDriver for TerminalDriver {
    fn flush(&mut self, frame: &PanelFrame) -> Result<(), DisplayError> {
        let mut buf = String::with_capacity(8 * 1024);
        if self.first_flush {
            // Clear once, then home the cursor on every frame
            buf.push_str("\x1b[2J");
            self.first_flush = false;
        }
        buf.push_str("\x1b[H");
        for y in 0..PANEL_HEIGHT as i32 {
            for x in 0..PANEL_WIDTH as i32 {
                // pixel() is total inside the panel bounds
                let c = frame.pixel(x, y).unwrap_or(PEN_BLACK);
                buf.push_str(&format!(
                    "\x1b[48;2;{};{};{}m  ",
                    c.r(),
                    c.g(),
                    c.b()
                ));
            }
            buf.push_str("\x1b[0m\r\n");
        }
        let mut lock = self.out.lock();
        lock.write_all(buf.as_bytes())?;
        lock.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}
