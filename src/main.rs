/*
 *  main.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  A clock with digits that roll like a mechanical reel, plus scrolling
 *  bus, tube, and custom messages in an attract-mode rotation. A live
 *  show can be started and stopped over stdin.
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
use std::time::Duration;

use env_logger::Env;
use log::info;
use tokio::sync::{mpsc, Mutex as TokMutex};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

mod attract;
mod cache;
mod clock_font;
mod commands;
mod config;
mod constants;
mod context;
mod display;
mod liveshow;
mod net;
mod timesync;
mod timeutil;
mod transit;

use cache::OnlineCache;
use constants::PEN_BLUE;
use context::PanelContext;
use display::drivers::create_driver;
use display::PanelDisplay;
use timesync::SystemTimeSync;
use timeutil::{ClockSource, SystemClock};
use transit::{HttpFetcher, TransitClient};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Wait for SIGINT, SIGTERM, or SIGHUP so the panel can be blanked on the
/// way out.
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load()?;
    let settings = cfg.resolve();

    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("{} starting", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let clock: Arc<dyn ClockSource> = Arc::new(SystemClock);
    let driver = create_driver(settings.driver);
    let display = Arc::new(TokMutex::new(PanelDisplay::new(driver)));
    let cache = Arc::new(OnlineCache::new(settings.ttls, clock.clone()));

    let ctx = PanelContext {
        display,
        cache,
        clock,
        settings,
    };

    {
        let mut display = ctx.display.lock().await;
        info!("driver: {}", display.driver_name());
        display
            .show_static_message("PanelClock", PEN_BLUE, Duration::from_millis(600))
            .await;
        display
            .show_static_message("Syncing..", PEN_BLUE, Duration::from_millis(200))
            .await;
    }

    // Stock the cache before anything draws, then keep it topped up in
    // the background.
    let client = TransitClient::new(HttpFetcher::new()?, ctx.settings.transit.clone());
    info!("updating cache at startup (blocking)");
    client.update_all_cache(&ctx.cache).await;
    {
        let mut display = ctx.display.lock().await;
        display.clear_and_flush()?;
    }

    let refresh_ctx = ctx.clone();
    tokio::spawn(async move {
        client
            .refresh_periodically(&refresh_ctx.cache, refresh_ctx.settings.cache_refresh)
            .await;
    });

    tokio::spawn(timesync::sync_periodically(
        SystemTimeSync,
        ctx.clock.clone(),
    ));

    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    tokio::spawn(commands::read_commands(cmd_tx));

    tokio::select! {
        _ = signal_handler() => {}
        _ = attract::run_attract(ctx.clone(), cmd_rx) => {
            info!("attract loop ended");
        }
    }

    info!("Main application exiting. Clearing panel.");
    let mut display = ctx.display.lock().await;
    let _ = display.clear_and_flush();

    Ok(())
}
