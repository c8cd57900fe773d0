//! MissionView Playback Simulator CLI
//!
//! Run deterministic playback scenarios, or play a mission in real time.

use anyhow::{bail, Context};
use clap::Parser;
use missionview_core::MissionConfig;
use missionview_env::TokioContext;
use missionview_sim::scenarios::ScenarioId;
use missionview_sim::{
    run_realtime, CommandScript, RealtimeOptions, RerunLogger, ScenarioResult, ScenarioRunner, SimExport, SimFrame,
};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// MissionView deterministic playback CLI
#[derive(Parser, Debug)]
#[command(name = "missionview-sim")]
#[command(about = "Run deterministic playback scenarios for MissionView", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (nominal, pause_resume, reset_midflight, overrun, frame_jitter, resize_storm, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Frame rate in Hz
    #[arg(short, long, default_value = "30")]
    frame_rate: u32,

    /// Mission configuration JSON (defaults to the Mars sortie)
    #[arg(short, long)]
    mission: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export frames to a JSON file (single scenario only)
    #[arg(long)]
    export: Option<String>,

    /// Stream frames to a Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    visualize: bool,

    /// Play the mission once on the wall clock instead of running scenarios
    #[arg(long)]
    realtime: bool,

    /// Play in the terminal dashboard (needs the `dashboard` feature)
    #[arg(long)]
    dashboard: bool,
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder().with_max_level(level);
    let installed = if args.dashboard {
        // The dashboard owns the terminal
        tracing::subscriber::set_global_default(builder.with_writer(std::io::sink).finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("failed to set tracing subscriber")
}

fn load_mission(path: Option<&str>) -> anyhow::Result<MissionConfig> {
    match path {
        Some(path) => {
            let mission =
                MissionConfig::load(path).with_context(|| format!("failed to load mission from {}", path))?;
            info!("Loaded mission {} ({} phases, {:.1}s)", path, mission.phases.len(), mission.phases.total_duration());
            Ok(mission)
        }
        None => Ok(MissionConfig::default()),
    }
}

fn run_live(args: &Args, mission: MissionConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    if args.dashboard {
        #[cfg(feature = "dashboard")]
        {
            let summary = runtime.block_on(missionview_sim::run_with_dashboard(mission, args.frame_rate))?;
            println!("Dashboard closed after {} frames", summary.frames);
            return Ok(());
        }
        #[cfg(not(feature = "dashboard"))]
        bail!("the dashboard is not available (compile with --features dashboard)");
    }

    let ctx = TokioContext::new();
    let mut script = CommandScript::play_at_start();
    let options = RealtimeOptions {
        frame_rate_hz: args.frame_rate,
        stop_on_complete: true,
        deadline_secs: Some(mission.phases.total_duration() + 5.0),
    };

    let mut last_phase = usize::MAX;
    let summary = runtime.block_on(run_realtime(&ctx, mission, &mut script, options, |frame| {
        if frame.phase_index() != last_phase {
            last_phase = frame.phase_index();
            info!(
                "[{:>5.1}s] {:<24} alt {:>5.1}m  spd {:>4.1}m/s  bat {:>5.1}%",
                frame.elapsed_secs,
                frame.current_phase_name,
                frame.telemetry.altitude,
                frame.telemetry.speed,
                frame.telemetry.battery_percent
            );
        }
        true
    }));

    let t = &summary.final_frame.telemetry;
    info!(
        "Stopped ({:?}): {:.1}m traveled, battery {:.1}%, {} LiDAR points",
        summary.stop, t.distance_traveled, t.battery_percent, t.lidar.points
    );
    if !t.mission_complete {
        bail!("mission did not complete ({:?})", summary.stop);
    }
    Ok(())
}

fn run_with_export(
    runner: &ScenarioRunner,
    scenario: ScenarioId,
    export_path: &str,
    logger: &mut RerunLogger,
) -> anyhow::Result<ScenarioResult> {
    let mut export = SimExport::new(scenario.name(), runner.seed());
    let result = runner.run_observed(scenario, |_, outcome| {
        logger.log_outcome(outcome);
        export.add_frame(SimFrame::from_outcome(outcome));
    });
    export.finalize(&result);
    export
        .write_to_file(export_path)
        .with_context(|| format!("failed to write export to {}", export_path))?;
    info!("Exported {} frames to {}", export.frames.len(), export_path);
    Ok(result)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    if !args.json {
        info!("MissionView Playback Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let mission = load_mission(args.mission.as_deref())?;

    if args.realtime || args.dashboard {
        return run_live(&args, mission);
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available scenarios: {}, all",
                ScenarioId::all().iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
            );
            std::process::exit(1);
        })]
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let mut logger = if args.visualize {
        RerunLogger::new("missionview_sim")
    } else {
        RerunLogger::disabled()
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            bail!("--export only supports a single scenario, not 'all'");
        }

        let runner = ScenarioRunner::new(base_seed)
            .with_frame_rate(args.frame_rate)
            .with_mission(mission);
        let result = run_with_export(&runner, scenarios[0], export_path, &mut logger)?;

        if result.passed {
            info!("✓ {} (seed={}) PASSED - exported to {}", scenarios[0].name(), base_seed, export_path);
        } else {
            error!(
                "✗ {} FAILED: {}",
                scenarios[0].name(),
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
            std::process::exit(1);
        }
        return Ok(());
    }

    // Run scenarios
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds.max(1) {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed)
            .with_frame_rate(args.frame_rate)
            .with_mission(mission.clone());

        for scenario in &scenarios {
            let result = if logger.is_enabled() {
                runner.run_observed(*scenario, |_, outcome| logger.log_outcome(outcome))
            } else {
                runner.run(*scenario)
            };

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "frames": r.total_frames,
                    "final_elapsed_secs": r.final_elapsed_secs,
                    "final_phase": r.final_phase,
                    "violations": r.audit.violations.len(),
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}
