/*
 *  context.rs
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

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::OnlineCache;
use crate::config::Settings;
use crate::display::PanelDisplay;
use crate::timeutil::ClockSource;

/// Shared handles every display routine needs: the panel, the online
/// cache, the clock, and the resolved settings.
#[derive(Clone)]
pub struct PanelContext {
    pub display: Arc<Mutex<PanelDisplay>>,
    pub cache: Arc<OnlineCache>,
    pub clock: Arc<dyn ClockSource>,
    pub settings: Settings,
}
