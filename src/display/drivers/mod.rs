/*
 *  display/drivers/mod.rs
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

pub mod mock;
pub mod terminal;

use serde::{Deserialize, Serialize};

use crate::display::error::DisplayError;
use crate::display::framebuffer::PanelFrame;

/// Output stage of the display pipeline. Everything is drawn into a
/// `PanelFrame`; a driver only has to get the finished frame onto whatever
/// hardware (or stand-in) is attached.
pub trait PanelDriver: Send {
    fn flush(&mut self, frame: &PanelFrame) -> Result<(), DisplayError>;

    /// A short name for log lines.
    fn name(&self) -> &'static str;
}

/// Which driver to attach, selectable from config or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// No output, records flushes. Used by the test suite.
    Mock,
    /// ANSI true-colour rendering in the controlling terminal.
    Terminal,
}

impl std::str::FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(DriverKind::Mock),
            "terminal" => Ok(DriverKind::Terminal),
            other => Err(format!("unknown driver '{}'", other)),
        }
    }
}

/// Build the configured driver.
pub fn create_driver(kind: DriverKind) -> Box<dyn PanelDriver + Send> {
    match kind {
        DriverKind::Mock => Box::new(mock::MockDriver::new()),
        DriverKind::Terminal => Box::new(terminal::TerminalDriver::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_kind_parses() {
        assert_eq!("mock".parse::<DriverKind>(), Ok(DriverKind::Mock));
        assert_eq!("Terminal".parse::<DriverKind>(), Ok(DriverKind::Terminal));
        assert!("ssd1322".parse::<DriverKind>().is_err());
    }
}
