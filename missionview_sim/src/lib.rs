//! MissionView Deterministic Playback Harness
//!
//! This crate provides a controlled environment where the mission animator
//! runs on a virtual clock, so every playback is reproducible from a seed.
//!
//! # Core Principle
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Time**: Virtual clock advances only when the world ticks
//! - **Input**: Playback commands come from a script keyed to virtual time
//! - **Frame pacing**: Irregular frame intervals drawn from a seeded RNG
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        SimWorld                           │
//! │  ┌──────────────┐   commands   ┌────────────────────────┐ │
//! │  │ CommandScript├─────────────►│    PlaybackSession     │ │
//! │  └──────────────┘              │ (clock + animator)     │ │
//! │  ┌──────────────┐     now      └───────────┬────────────┘ │
//! │  │  SimContext  ├─────────────►            │ Frame        │
//! │  │ (virtual clk)│              ┌───────────▼────────────┐ │
//! │  └──────────────┘              │     PlaybackAudit      │ │
//! │                                └────────────────────────┘ │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use missionview_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::PauseResume);
//! assert!(result.passed);
//! ```

mod context;
mod exporter;
mod realtime;
mod runner;
mod script;
mod visualizer;
mod world;
pub mod scenarios;

pub use context::SimContext;
pub use exporter::{Position, SimEvent, SimExport, SimFrame};
pub use realtime::{run_realtime, RealtimeOptions, RealtimeSummary, StopReason};
#[cfg(feature = "dashboard")]
pub use realtime::{run_with_dashboard, DashboardCommands};
pub use runner::{ScenarioResult, ScenarioRunner};
pub use script::{CommandScript, ScriptedCommand};
pub use visualizer::RerunLogger;
pub use world::{SimConfig, SimWorld, TickOutcome};
