/*
 *  liveshow.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  The live show: announced with a scroll, then a looping reverse-roll
 *  flourish until show-stop arrives on the command channel.
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

use log::{info, warn};
use tokio::sync::mpsc;

use crate::clock_font::panel_font;
use crate::commands::ShowCommand;
use crate::constants::{CLOCK_DIGITS_X, CLOCK_Y, PEN_YELLOW, ROLL_FRAMES, ROLL_STEP_MS};
use crate::context::PanelContext;
use crate::display::components::rolling::{scroll_digit, show_digit, RollStep};
use crate::display::components::scroller::scroll_msg;

/// One downward roll of every digit slot, counting 9 down to 0 in step.
async fn rewind_flourish(ctx: &PanelContext) {
    let font = panel_font();
    for value in (1..10u8).rev() {
        let next = value - 1;
        for frame in 0..ROLL_FRAMES {
            {
                let mut display = ctx.display.lock().await;
                for x in CLOCK_DIGITS_X {
                    scroll_digit(
                        display.frame_mut(),
                        &font,
                        PEN_YELLOW,
                        RollStep {
                            x,
                            y: CLOCK_Y,
                            old: value,
                            new: next,
                            frame,
                            reverse: true,
                        },
                    );
                }
                if let Err(e) = display.flush() {
                    warn!("show flush failed: {}", e);
                }
            }
            tokio::time::sleep(Duration::from_millis(ROLL_STEP_MS)).await;
        }
    }
    // Settle on zeros before the next pass
    let mut display = ctx.display.lock().await;
    for x in CLOCK_DIGITS_X {
        show_digit(display.frame_mut(), &font, PEN_YELLOW, 0, x, CLOCK_Y);
    }
    if let Err(e) = display.flush() {
        warn!("show flush failed: {}", e);
    }
}

async fn show_loop(ctx: &PanelContext) {
    scroll_msg(&ctx.display, "Show start", PEN_YELLOW, ctx.settings.scroll_step).await;
    loop {
        rewind_flourish(ctx).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// Run the show until a show-stop arrives (or the command channel closes).
pub async fn run(ctx: &PanelContext, cmd_rx: &mut mpsc::Receiver<ShowCommand>) {
    info!("live show starting");
    tokio::select! {
        _ = show_loop(ctx) => {}
        _ = wait_for_show_stop(cmd_rx) => {}
    }
    {
        let mut display = ctx.display.lock().await;
        if let Err(e) = display.clear_and_flush() {
            warn!("clear after show failed: {}", e);
        }
    }
    info!("live show finished");
}

async fn wait_for_show_stop(cmd_rx: &mut mpsc::Receiver<ShowCommand>) {
    loop {
        match cmd_rx.recv().await {
            Some(ShowCommand::Stop) | None => return,
            Some(ShowCommand::Start) => warn!("show-start ignored: show already running"),
        }
    }
}
