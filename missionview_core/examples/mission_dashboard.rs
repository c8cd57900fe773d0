//! Mission Dashboard Demo
//! ======================
//!
//! Plays the Mars sortie in real time inside the terminal dashboard.
//! Press `s` to start, space to pause, `r` to reset, `q` to quit.
//!
//! Run:
//! ```bash
//! cargo run --example mission_dashboard --features dashboard
//! ```

use std::thread;
use std::time::{Duration, Instant};

use missionview_core::dashboard::MissionDashboard;
use missionview_core::{MissionConfig, PlaybackSession};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (frame_tx, frame_rx) = crossbeam::channel::bounded(64);
    let (cmd_tx, cmd_rx) = crossbeam::channel::unbounded();

    let config = MissionConfig::default();
    let table = config.phases.clone();

    // Tick loop: ~30 fps until the dashboard hangs up
    let ticker = thread::spawn(move || {
        let start = Instant::now();
        let mut session = PlaybackSession::new(config);
        loop {
            let now = start.elapsed();
            while let Ok(command) = cmd_rx.try_recv() {
                session.handle(command, now);
            }
            let frame = session.tick(now).clone();
            if frame_tx.send(frame).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(33));
        }
    });

    let mut dashboard = MissionDashboard::new(frame_rx, cmd_tx, table);
    dashboard.run()?;
    drop(dashboard);

    let _ = ticker.join();
    Ok(())
}
