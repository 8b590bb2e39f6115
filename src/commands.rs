/*
 *  commands.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Line-oriented command channel on stdin. A controller (or a human with
 *  a keyboard) can interrupt attract mode for a live show and end it
 *  again.
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

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    Start,
    Stop,
}

/// Parse one command line. Unknown input yields `None`.
pub fn parse_command(line: &str) -> Option<ShowCommand> {
    match line.trim() {
        "show-start" => Some(ShowCommand::Start),
        "show-stop" => Some(ShowCommand::Stop),
        _ => None,
    }
}

/// Read stdin line by line and forward recognised commands. Runs until
/// stdin closes; unknown tokens are logged and dropped.
pub async fn read_commands(tx: mpsc::Sender<ShowCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(cmd) => {
                        info!("command received: {:?}", cmd);
                        if tx.send(cmd).await.is_err() {
                            return;
                        }
                    }
                    None => warn!("ignoring unknown command '{}'", line.trim()),
                }
            }
            Ok(None) => {
                info!("command channel closed");
                return;
            }
            Err(e) => {
                warn!("error reading command channel: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_commands_parse() {
        assert_eq!(parse_command("show-start"), Some(ShowCommand::Start));
        assert_eq!(parse_command("  show-stop \n"), Some(ShowCommand::Stop));
    }

    #[test]
    fn unknown_input_is_dropped() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("show-pause"), None);
        assert_eq!(parse_command("SHOW-START"), None);
    }
}
