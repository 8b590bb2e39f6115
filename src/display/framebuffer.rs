/*
 *  display/framebuffer.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  RGB frame buffer with an optional clip rectangle, sized to the panel.
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

use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::primitives::{ContainsPoint, PointsIter, Rectangle};

use crate::constants::{PANEL_HEIGHT, PANEL_WIDTH, PEN_BLACK};

/// In-memory pixel buffer for the panel. All drawing goes through the
/// embedded-graphics `DrawTarget` impl; a driver flushes the finished frame
/// to whatever is actually attached.
#[derive(Clone)]
pub struct PanelFrame {
    pixels: Vec<Rgb888>,
    clip: Option<Rectangle>,
}

impl PanelFrame {
    pub fn new() -> Self {
        PanelFrame {
            pixels: vec![PEN_BLACK; (PANEL_WIDTH * PANEL_HEIGHT) as usize],
            clip: None,
        }
    }

    /// Restrict subsequent drawing to `rect`. Pixels outside are discarded.
    pub fn set_clip(&mut self, rect: Rectangle) {
        self.clip = Some(rect);
    }

    /// Remove the clip rectangle.
    pub fn remove_clip(&mut self) {
        self.clip = None;
    }

    /// Fill the whole buffer with black, ignoring any clip.
    pub fn clear_black(&mut self) {
        self.pixels.fill(PEN_BLACK);
    }

    /// Fill a rectangle, honouring the clip.
    pub fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) {
        let points: Vec<Point> = rect.points().collect();
        // draw_iter applies clip and bounds checks
        let _ = self.draw_iter(points.into_iter().map(|p| Pixel(p, color)));
    }

    /// Read back a pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        if x < 0 || y < 0 || x >= PANEL_WIDTH as i32 || y >= PANEL_HEIGHT as i32 {
            return None;
        }
        Some(self.pixels[(y as u32 * PANEL_WIDTH + x as u32) as usize])
    }

    pub fn as_slice(&self) -> &[Rgb888] {
        &self.pixels
    }

    fn in_clip(&self, p: Point) -> bool {
        match &self.clip {
            Some(rect) => rect.contains(p),
            None => true,
        }
    }
}

impl Default for PanelFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for PanelFrame {
    fn size(&self) -> Size {
        Size::new(PANEL_WIDTH, PANEL_HEIGHT)
    }
}

impl DrawTarget for PanelFrame {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if !self.in_clip(p) {
                continue;
            }
            if p.x < 0 || p.y < 0 || p.x >= PANEL_WIDTH as i32 || p.y >= PANEL_HEIGHT as i32 {
                continue;
            }
            self.pixels[(p.y as u32 * PANEL_WIDTH + p.x as u32) as usize] = color;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PEN_YELLOW;

    #[test]
    fn writes_land_in_buffer() {
        let mut frame = PanelFrame::new();
        frame
            .draw_iter([Pixel(Point::new(3, 4), PEN_YELLOW)])
            .unwrap();
        assert_eq!(frame.pixel(3, 4), Some(PEN_YELLOW));
        assert_eq!(frame.pixel(4, 3), Some(PEN_BLACK));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut frame = PanelFrame::new();
        frame
            .draw_iter([
                Pixel(Point::new(-1, 0), PEN_YELLOW),
                Pixel(Point::new(0, -1), PEN_YELLOW),
                Pixel(Point::new(PANEL_WIDTH as i32, 0), PEN_YELLOW),
                Pixel(Point::new(0, PANEL_HEIGHT as i32), PEN_YELLOW),
            ])
            .unwrap();
        assert!(frame.as_slice().iter().all(|c| *c == PEN_BLACK));
    }

    #[test]
    fn clip_discards_outside_pixels() {
        let mut frame = PanelFrame::new();
        frame.set_clip(Rectangle::new(Point::new(2, 2), Size::new(2, 2)));
        frame
            .draw_iter([
                Pixel(Point::new(2, 2), PEN_YELLOW),
                Pixel(Point::new(3, 3), PEN_YELLOW),
                Pixel(Point::new(4, 2), PEN_YELLOW),
                Pixel(Point::new(1, 2), PEN_YELLOW),
            ])
            .unwrap();
        assert_eq!(frame.pixel(2, 2), Some(PEN_YELLOW));
        assert_eq!(frame.pixel(3, 3), Some(PEN_YELLOW));
        assert_eq!(frame.pixel(4, 2), Some(PEN_BLACK));
        assert_eq!(frame.pixel(1, 2), Some(PEN_BLACK));

        frame.remove_clip();
        frame
            .draw_iter([Pixel(Point::new(4, 2), PEN_YELLOW)])
            .unwrap();
        assert_eq!(frame.pixel(4, 2), Some(PEN_YELLOW));
    }

    #[test]
    fn fill_rect_honours_clip() {
        let mut frame = PanelFrame::new();
        frame.set_clip(Rectangle::new(Point::new(0, 0), Size::new(1, 1)));
        frame.fill_rect(
            Rectangle::new(Point::new(0, 0), Size::new(5, 5)),
            PEN_YELLOW,
        );
        assert_eq!(frame.pixel(0, 0), Some(PEN_YELLOW));
        assert_eq!(frame.pixel(1, 1), Some(PEN_BLACK));
    }
}
