//! MissionView Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the mission
//! animator to run against both the **real** clock (tokio) and a
//! **virtual** clock (deterministic simulation).
//!
//! # Core Concept
//!
//! The animator is a pure function of elapsed time. Everything that would
//! make a playback non-reproducible is pushed to the edges:
//! - Time (`now()`, `sleep()`)
//! - User input (`CommandSource`: play, pause, reset, resize)
//!
//! # Example
//!
//! ```ignore
//! use missionview_env::{CommandSource, MissionContext};
//!
//! async fn tick_loop<Ctx: MissionContext, Src: CommandSource>(ctx: &Ctx, src: &mut Src) {
//!     loop {
//!         let now = ctx.now();
//!         while let Ok(Some(cmd)) = src.try_next(now) {
//!             session.handle(cmd, now);
//!         }
//!         session.tick(now);
//!         ctx.sleep(Duration::from_millis(16)).await;
//!     }
//! }
//! ```

mod commands;
mod context;
mod error;
mod tokio_impl;
mod types;

pub use commands::{CommandSource, NoCommands};
pub use context::MissionContext;
pub use error::EnvError;
pub use tokio_impl::TokioContext;
pub use types::PlaybackCommand;
