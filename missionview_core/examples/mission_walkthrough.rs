//! Mission Walkthrough - "Watch the Numbers Move"
//! ================================================
//!
//! Steps the Mars sortie at 2 Hz and prints one line per frame, marking
//! phase transitions, the landing lock and touchdown. Ends with an audit.
//!
//! Run:
//! ```bash
//! cargo run --example mission_walkthrough
//! cargo run --example mission_walkthrough -- mission.json
//! ```

use missionview_core::panels::{self, FlightStatus};
use missionview_core::{MissionAnimator, MissionConfig, PlaybackAudit};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🛰  Mission Walkthrough");
    println!("=======================\n");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            println!("📄 Loading mission: {}\n", path);
            MissionConfig::load(&path)?
        }
        None => MissionConfig::default(),
    };

    let animator = MissionAnimator::new(config);
    let mut audit = PlaybackAudit::new(&animator);
    let total = animator.total_duration();

    println!("📍 {} phases, {:.1}s total\n", animator.plan().table().len(), total);

    let steps = (total * 2.0).ceil() as usize;
    let mut previous = None;
    let mut last_phase = usize::MAX;
    let mut last_status = FlightStatus::Flight;

    for step in 0..=steps {
        let t = step as f64 * 0.5;
        let frame = animator.update(t, previous.as_ref());
        audit.record(&frame);

        if frame.cursor.phase_index != last_phase {
            println!("── {} ──", frame.current_phase_name);
            last_phase = frame.cursor.phase_index;
        }

        let status = panels::flight_status(&frame.telemetry);
        let marker = if status != last_status {
            last_status = status;
            format!("  ◀ {}", status)
        } else {
            String::new()
        };

        println!(
            "  t={:5.1}s  alt {:6.1}m  spd {:5.1}m/s  dist {:7.1}m  batt {:5.1}%  lidar {:>7}{}",
            frame.elapsed_secs,
            frame.telemetry.altitude,
            frame.telemetry.speed,
            frame.telemetry.distance_traveled,
            frame.telemetry.battery_percent,
            frame.telemetry.lidar.points,
            marker
        );

        previous = Some(frame);
    }

    let report = audit.report();
    println!("\n📊 Audit: {} frames, max phase {}, completed: {}", report.frames_checked, report.max_phase_reached, report.completed);
    if report.is_clean() {
        println!("✓ No invariant violations");
    } else {
        for violation in &report.violations {
            println!("✗ {}", violation);
        }
    }

    Ok(())
}
