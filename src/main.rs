//! Pinch Bloom entry point
//!
//! Native builds run a headless scripted session: a synthetic hand pinches,
//! waits for the second stage, then raises an open hand. Time is virtual, so
//! the whole narrative plays out instantly. Pass a settings JSON path as the
//! first argument to override tunables; set `RUST_LOG=debug` for detail.

use pinch_bloom::Settings;
use pinch_bloom::platform::{Clock, VirtualClock};
use pinch_bloom::sim::gesture::synthetic::{pinching, raised, resting};
use pinch_bloom::sim::{Millis, Session, Stage, TrackingFrame};
use pinch_bloom::ui::{HeadlessRenderer, RecordingUi};

/// Display refresh period (~60 Hz)
const FRAME_MS: Millis = 16;
/// Tracker delivers a result every other display frame (~30 Hz)
const TRACKING_EVERY: u64 = 2;
/// Give up if the script stalls
const SCRIPT_LIMIT_MS: Millis = 120_000;
/// How long to watch the finale
const FINALE_WATCH_MS: Millis = 5_000;

fn main() {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    log::info!("Pinch Bloom (headless) starting...");

    let mut session = match Session::new(settings) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Cannot start session: {e}");
            std::process::exit(1);
        }
    };
    let clock = VirtualClock::new(0);
    let mut ui = RecordingUi::new();
    let mut renderer = HeadlessRenderer::default();

    let mut finale_since: Option<Millis> = None;
    let mut frame_index = 0u64;
    let mut peak_alive = 0;

    while clock.now_ms() < SCRIPT_LIMIT_MS {
        let now = clock.advance(FRAME_MS);
        session.frame(now, &mut ui, &mut renderer);
        peak_alive = peak_alive.max(renderer.last_alive);

        if frame_index % TRACKING_EVERY == 0 {
            let hand = match session.stage() {
                Stage::One => pinching(0.03),
                Stage::Two => raised(0.25, 0.35),
                Stage::Three => resting(),
            };
            let tracking = if session.machine().is_locked() {
                TrackingFrame::empty()
            } else {
                TrackingFrame::with_hand(hand)
            };
            session.on_tracking_frame(&tracking, now, &mut ui);
        }
        frame_index += 1;

        if session.stage() == Stage::Three {
            let since = *finale_since.get_or_insert(now);
            if now - since >= FINALE_WATCH_MS {
                break;
            }
        }
    }

    log::info!(
        "Finished at {} ms: stage {}, {} frames, {} ticks, {} buffer uploads, peak {} particles",
        clock.now_ms(),
        session.stage().id(),
        session.frames(),
        session.ticks(),
        renderer.uploads,
        peak_alive
    );
    println!(
        "stage {} reached after {} ms (peak {} live particles)",
        session.stage().id(),
        clock.now_ms(),
        peak_alive
    );
}
