//! The Phase Table - ordered, immutable mission segments
//!
//! A mission is a fixed sequence of named phases, each with a duration,
//! a display tint and a motion profile. The table is validated once at
//! construction and caches the cumulative end time of every phase so that
//! per-frame lookups never re-sum durations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Reasons a phase table is rejected at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhaseTableError {
    #[error("phase table is empty")]
    Empty,

    #[error("phase {index} ('{name}') has invalid duration {duration}")]
    InvalidDuration {
        index: usize,
        name: String,
        duration: f64,
    },

    #[error("phase table has zero total duration")]
    ZeroTotalDuration,
}

/// A tint string that is not `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tint '{0}', expected #rrggbb")]
pub struct InvalidTint(pub String);

// =============================================================================
// TINT
// =============================================================================

/// 8-bit RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Channels scaled to `[0, 1]`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl FromStr for Rgb {
    type Err = InvalidTint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| InvalidTint(s.to_string()))?;

        u32::from_str_radix(digits, 16)
            .map(Rgb::from_hex)
            .map_err(|_| InvalidTint(s.to_string()))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = InvalidTint;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

// =============================================================================
// PHASE
// =============================================================================

/// Which interpolator drives a phase.
///
/// Each phase is sampled at its own local progress, so two consecutive
/// phases sharing a profile replay the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseProfile {
    /// Vertical climb from the base station.
    Ascent,
    /// Straight-line cruise between two fixed endpoints.
    Transit,
    /// Circular parking orbit; sensor point count holds.
    Orbit,
    /// Circular orbit that accumulates sensor points.
    Survey,
    /// Linear approach to the landing waypoint.
    Descent,
    /// Final descent onto the pad.
    Touchdown,
}

impl PhaseProfile {
    pub fn name(&self) -> &'static str {
        match self {
            PhaseProfile::Ascent => "ascent",
            PhaseProfile::Transit => "transit",
            PhaseProfile::Orbit => "orbit",
            PhaseProfile::Survey => "survey",
            PhaseProfile::Descent => "descent",
            PhaseProfile::Touchdown => "touchdown",
        }
    }
}

impl fmt::Display for PhaseProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named, fixed-duration segment of the mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,

    /// Duration in seconds. Zero is legal and makes the phase instantaneous.
    #[serde(rename = "duration")]
    pub duration_secs: f64,

    pub tint: Rgb,

    pub profile: PhaseProfile,
}

impl Phase {
    pub fn new(name: impl Into<String>, duration_secs: f64, tint: Rgb, profile: PhaseProfile) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            tint,
            profile,
        }
    }
}

// =============================================================================
// PHASE TABLE
// =============================================================================

/// Validated, ordered sequence of phases with cached cumulative end times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Phase>", into = "Vec<Phase>")]
pub struct PhaseTable {
    phases: Vec<Phase>,

    /// `ends[i]` = sum of durations `0..=i`
    ends: Vec<f64>,
}

impl PhaseTable {
    /// Validate and build a table.
    ///
    /// Rejects an empty sequence, any negative or non-finite duration, and a
    /// table whose durations sum to zero.
    pub fn new(phases: Vec<Phase>) -> Result<Self, PhaseTableError> {
        if phases.is_empty() {
            return Err(PhaseTableError::Empty);
        }

        let mut ends = Vec::with_capacity(phases.len());
        let mut acc = 0.0;
        for (index, phase) in phases.iter().enumerate() {
            if !phase.duration_secs.is_finite() || phase.duration_secs < 0.0 {
                return Err(PhaseTableError::InvalidDuration {
                    index,
                    name: phase.name.clone(),
                    duration: phase.duration_secs,
                });
            }
            acc += phase.duration_secs;
            ends.push(acc);
        }

        if acc <= 0.0 {
            return Err(PhaseTableError::ZeroTotalDuration);
        }

        Ok(Self { phases, ends })
    }

    /// The ten-phase Earth-to-Mars sortie (54 s).
    pub fn mars_sortie() -> Self {
        use PhaseProfile::*;

        let phases = vec![
            Phase::new("Pre-Flight Check", 2.0, Rgb::from_hex(0xffa500), Ascent),
            Phase::new("Takeoff", 3.0, Rgb::from_hex(0x00ff00), Ascent),
            Phase::new("Climb to Cruise", 4.0, Rgb::from_hex(0x00ffff), Transit),
            Phase::new("Transit to Mars", 10.0, Rgb::from_hex(0xff00ff), Transit),
            Phase::new("Martian Approach", 5.0, Rgb::from_hex(0xffaa00), Transit),
            Phase::new("Orbital Survey", 6.0, Rgb::from_hex(0xffff00), Orbit),
            Phase::new("Data Collection", 5.0, Rgb::from_hex(0x00ff88), Survey),
            Phase::new("Return Journey", 10.0, Rgb::from_hex(0xff6600), Orbit),
            Phase::new("Landing Approach", 5.0, Rgb::from_hex(0x0088ff), Descent),
            Phase::new("Final Landing", 4.0, Rgb::from_hex(0x00ff00), Touchdown),
        ];

        let mut ends = Vec::with_capacity(phases.len());
        let mut acc = 0.0;
        for phase in &phases {
            acc += phase.duration_secs;
            ends.push(acc);
        }
        Self { phases, ends }
    }

    /// Sum of all phase durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.ends.last().copied().unwrap_or(0.0)
    }

    /// Start time of phase `index`. Indices past the end return the total.
    pub fn cumulative_duration_before(&self, index: usize) -> f64 {
        match index {
            0 => 0.0,
            i if i >= self.ends.len() => self.total_duration(),
            i => self.ends[i - 1],
        }
    }

    /// Cumulative end time of phase `index`.
    pub fn end_of(&self, index: usize) -> f64 {
        self.ends
            .get(index)
            .copied()
            .unwrap_or_else(|| self.total_duration())
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always false for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.phases.len() - 1
    }

    /// Clamp an elapsed reading into `[0, total]`. NaN maps to 0.
    pub fn clamp_elapsed(&self, elapsed_secs: f64) -> f64 {
        if elapsed_secs.is_nan() {
            return 0.0;
        }
        elapsed_secs.clamp(0.0, self.total_duration())
    }

    /// Fraction of the whole mission covered at `elapsed_secs`, in `[0, 1]`.
    pub fn mission_progress(&self, elapsed_secs: f64) -> f64 {
        (self.clamp_elapsed(elapsed_secs) / self.total_duration()).clamp(0.0, 1.0)
    }

    pub(crate) fn ends(&self) -> &[f64] {
        &self.ends
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::mars_sortie()
    }
}

impl TryFrom<Vec<Phase>> for PhaseTable {
    type Error = PhaseTableError;

    fn try_from(value: Vec<Phase>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhaseTable> for Vec<Phase> {
    fn from(value: PhaseTable) -> Self {
        value.phases
    }
}
