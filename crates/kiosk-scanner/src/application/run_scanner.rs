//! Interactive scanner loop.
//!
//! Input lines and the frame ticker are multiplexed in one `select!`.  Input
//! is polled first, so a `cancel` typed while a frame is due is applied
//! before that frame is pulled; any decode that still arrives afterwards is
//! discarded by the state machine.
//!
//! ```text
//! loop select! (biased) {
//!     line  → parse_command → controller.apply → redraw
//!     tick  (only while streaming) → controller.tick → redraw on effect
//! }
//! ```
//!
//! The loop ends on `quit`, end of input, or after a logout.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use kiosk_core::ScanEffect;

use crate::application::devices::{Camera, Navigator, QrDecoder};
use crate::application::scanner_controller::ScannerController;
use crate::application::screen::{render_screen, HELP};
use crate::domain::{parse_command, Command, CommandError};

enum Step {
    Line(Option<String>),
    Tick,
}

/// Runs the scanner until `quit`, end of `input`, or logout.
///
/// The camera is released before returning.
///
/// # Errors
///
/// Returns an error if reading `input` or writing to `out` fails.
pub async fn run_scanner<C, D, N, R, W>(
    controller: &mut ScannerController<C, D, N>,
    input: R,
    out: &mut W,
    frame_interval: Duration,
) -> anyhow::Result<()>
where
    C: Camera,
    D: QrDecoder,
    N: Navigator,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    draw(out, controller)?;

    loop {
        let step = tokio::select! {
            biased;
            line = lines.next_line() => Step::Line(line.context("failed to read command input")?),
            _ = ticker.tick(), if controller.is_streaming() => Step::Tick,
        };

        match step {
            Step::Line(None) => {
                info!("command input closed");
                break;
            }
            Step::Line(Some(line)) => match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => writeln!(out, "{HELP}").context("failed to write help")?,
                Ok(command) => {
                    if matches!(command, Command::Decode(_)) && !controller.state().is_scanning() {
                        writeln!(out, "Not scanning; type 'scan' first.")
                            .context("failed to write screen")?;
                        continue;
                    }
                    let effect = controller.apply(command);
                    draw(out, controller)?;
                    if effect == Some(ScanEffect::Logout) {
                        break;
                    }
                }
                Err(CommandError::Empty) => {}
                Err(e) => writeln!(out, "{e}").context("failed to write screen")?,
            },
            Step::Tick => {
                if controller.tick().is_some() {
                    draw(out, controller)?;
                } else {
                    debug!("no code in frame");
                }
            }
        }
    }

    controller.cancel();
    Ok(())
}

fn draw<C, D, N, W>(out: &mut W, controller: &ScannerController<C, D, N>) -> anyhow::Result<()>
where
    C: Camera,
    D: QrDecoder,
    N: Navigator,
    W: Write,
{
    let screen = render_screen(controller.state(), controller.has_camera());
    writeln!(out, "{screen}").context("failed to write screen")?;
    out.flush().context("failed to flush screen")?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
