/*
 *  attract.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Attract mode: cycle the display routines in a freshly shuffled order
 *  each round, dwelling on the clock and letting the scrollers finish a
 *  full pass. A show-start command interrupts whatever is running.
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

use log::{debug, info, warn};
use rand::Rng;
use tokio::sync::mpsc;

use crate::commands::ShowCommand;
use crate::constants::PEN_YELLOW;
use crate::context::PanelContext;
use crate::display::components::clock::RollingClock;
use crate::display::components::scroller::scroll_msg;
use crate::liveshow;
use crate::transit::{format_bus_times, format_line_status};

/// The attract-mode routines, in their fixed declaration order. Rounds
/// run them in a shuffled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routine {
    Clock,
    CustomMessage,
    NextBuses,
    LineStatus,
}

/// One scheduled task: the routine plus its dwell. `None` means the
/// routine runs to completion (a full scroll pass); `Some` routines are
/// cancelled when the dwell lapses.
#[derive(Debug, Clone, Copy)]
struct TaskDescriptor {
    routine: Routine,
    dwell: Option<Duration>,
}

fn task_list(change_interval: Duration) -> [TaskDescriptor; 4] {
    [
        TaskDescriptor {
            routine: Routine::Clock,
            dwell: Some(change_interval),
        },
        TaskDescriptor {
            routine: Routine::CustomMessage,
            dwell: None,
        },
        TaskDescriptor {
            routine: Routine::NextBuses,
            dwell: None,
        },
        TaskDescriptor {
            routine: Routine::LineStatus,
            dwell: None,
        },
    ]
}

/// Produce the play order for one round: a Fisher-Yates shuffle of
/// `0..n`, then, if the round would open with the task the previous
/// round closed on, swap the head with the middle element.
pub fn shuffle_round<R: Rng>(rng: &mut R, n: usize, prev_last: Option<usize>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.random_range(0..=i);
        order.swap(i, j);
    }
    if n > 1 && prev_last == Some(order[0]) {
        order.swap(0, n / 2);
    }
    order
}

/// Dwell plus up to twenty percent of random jitter.
fn jittered_dwell<R: Rng>(rng: &mut R, dwell: Duration) -> Duration {
    let jitter_ms = rng.random_range(0..=dwell.as_millis() as u64 / 5);
    dwell + Duration::from_millis(jitter_ms)
}

/// Resolve a show-start from the command channel. Stray show-stops are
/// logged and dropped; a closed channel parks forever so attract mode
/// keeps running without a controller attached.
async fn wait_for_show_start(cmd_rx: &mut mpsc::Receiver<ShowCommand>) {
    loop {
        match cmd_rx.recv().await {
            Some(ShowCommand::Start) => return,
            Some(ShowCommand::Stop) => warn!("show-stop ignored: no show is running"),
            None => std::future::pending::<()>().await,
        }
    }
}

async fn run_task(ctx: &PanelContext, clock: &mut RollingClock, task: TaskDescriptor) {
    match task.dwell {
        Some(dwell) => {
            let dwell = {
                let mut rng = rand::rng();
                jittered_dwell(&mut rng, dwell)
            };
            debug!("{:?} dwell {:?}", task.routine, dwell);
            let _ = tokio::time::timeout(dwell, run_routine(ctx, clock, task.routine)).await;
        }
        None => run_routine(ctx, clock, task.routine).await,
    }
}

async fn run_routine(ctx: &PanelContext, clock: &mut RollingClock, routine: Routine) {
    match routine {
        // The clock never returns on its own; its task carries a dwell
        Routine::Clock => clock.run(ctx).await,
        Routine::CustomMessage => {
            let text = ctx
                .cache
                .custom_message()
                .unwrap_or_else(|| ctx.settings.default_custom_message.clone());
            scroll_msg(&ctx.display, &text, PEN_YELLOW, ctx.settings.scroll_step).await;
        }
        Routine::NextBuses => {
            let text = match ctx.cache.next_buses() {
                Some(times) if !times.is_empty() => {
                    format_bus_times(&ctx.settings.transit.bus_line, &times)
                }
                _ => "No buses due for hours".to_owned(),
            };
            scroll_msg(&ctx.display, &text, PEN_YELLOW, ctx.settings.scroll_step).await;
        }
        Routine::LineStatus => {
            match ctx.cache.line_status() {
                Some(status) => {
                    let text = format_line_status(&ctx.settings.transit.line_label, &status);
                    scroll_msg(&ctx.display, &text, PEN_YELLOW, ctx.settings.scroll_step).await;
                }
                // Nothing fresh to report, give the turn back
                None => info!("line status unavailable, skipping turn"),
            }
        }
    }
}

/// The attract loop. Runs until cancelled by the caller.
pub async fn run_attract(ctx: PanelContext, mut cmd_rx: mpsc::Receiver<ShowCommand>) {
    let tasks = task_list(ctx.settings.change_interval);
    let mut clock = RollingClock::new();
    let mut prev_last: Option<usize> = None;

    loop {
        let order = {
            let mut rng = rand::rng();
            shuffle_round(&mut rng, tasks.len(), prev_last)
        };
        prev_last = order.last().copied();
        debug!("attract round order: {:?}", order);

        for idx in order {
            let task = tasks[idx];
            info!("attract: {:?}", task.routine);
            {
                let mut display = ctx.display.lock().await;
                if let Err(e) = display.clear_and_flush() {
                    warn!("clear between routines failed: {}", e);
                }
            }

            let mut show_requested = false;
            tokio::select! {
                _ = run_task(&ctx, &mut clock, task) => {}
                _ = wait_for_show_start(&mut cmd_rx) => { show_requested = true; }
            }
            if show_requested {
                info!("attract interrupted: show starting");
                liveshow::run(&ctx, &mut cmd_rx).await;
                info!("show over, resuming attract mode");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut seen = vec![false; n];
        for &i in order {
            if i >= n || seen[i] {
                return false;
            }
            seen[i] = true;
        }
        order.len() == n
    }

    #[test]
    fn rounds_are_permutations() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut prev_last = None;
        for _ in 0..200 {
            let order = shuffle_round(&mut rng, 4, prev_last);
            assert!(is_permutation(&order, 4), "bad round {:?}", order);
            prev_last = order.last().copied();
        }
    }

    #[test]
    fn round_never_opens_with_previous_closer() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut prev_last: Option<usize> = None;
        for _ in 0..500 {
            let order = shuffle_round(&mut rng, 4, prev_last);
            if let Some(last) = prev_last {
                assert_ne!(order[0], last, "round opened with previous closer");
            }
            prev_last = order.last().copied();
        }
    }

    #[test]
    fn single_task_round_is_trivial() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(shuffle_round(&mut rng, 1, Some(0)), vec![0]);
    }

    #[test]
    fn jitter_stays_within_a_fifth() {
        let mut rng = StdRng::seed_from_u64(9);
        let dwell = Duration::from_secs(6);
        for _ in 0..100 {
            let d = jittered_dwell(&mut rng, dwell);
            assert!(d >= dwell);
            assert!(d <= dwell + Duration::from_millis(1200));
        }
    }
}
