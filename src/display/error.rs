/*
 *  display/error.rs
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

use thiserror::Error;

/// Errors surfaced by panel drivers while pushing a frame out.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("driver error: {0}")]
    Driver(String),
}
