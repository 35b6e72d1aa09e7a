//! Grid Quantization
//!
//! Lookup tables from quality level to cell size and from group tier to
//! group span.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GridError;

/// Grid vertex density, coarsest to finest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    #[default]
    Low,
    Medium,
    High,
    Ultra,
    Extreme,
}

impl QualityLevel {
    /// All quality levels, coarsest first
    pub const ALL: [QualityLevel; 5] = [
        QualityLevel::Low,
        QualityLevel::Medium,
        QualityLevel::High,
        QualityLevel::Ultra,
        QualityLevel::Extreme,
    ];

    /// Grid spacing in screen pixels
    pub fn cell_size(self) -> u32 {
        match self {
            QualityLevel::Low => 16,
            QualityLevel::Medium => 8,
            QualityLevel::High => 4,
            QualityLevel::Ultra => 2,
            QualityLevel::Extreme => 1,
        }
    }

    /// Map a raw setting value; unknown values fall back to `Low`
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => QualityLevel::Medium,
            2 => QualityLevel::High,
            3 => QualityLevel::Ultra,
            4 => QualityLevel::Extreme,
            _ => QualityLevel::Low,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QualityLevel::Low => "low",
            QualityLevel::Medium => "medium",
            QualityLevel::High => "high",
            QualityLevel::Ultra => "ultra",
            QualityLevel::Extreme => "extreme",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityLevel {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GridError::UnknownQuality(s.to_string()))
    }
}

/// Side length of the square screen region one mesh tile covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupSpan {
    /// One mesh covers the whole viewport
    Whole,
    /// Tiles of this many pixels per side
    Tiles(u32),
}

/// Per-mesh vertex budget tier
///
/// Tiers past `Single` shrink the group span, so a fixed viewport needs more
/// meshes as the tier increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupTier {
    #[default]
    Single,
    Low,
    Medium,
    High,
    Extreme,
}

impl GroupTier {
    /// All tiers, untiled first
    pub const ALL: [GroupTier; 5] = [
        GroupTier::Single,
        GroupTier::Low,
        GroupTier::Medium,
        GroupTier::High,
        GroupTier::Extreme,
    ];

    pub fn group_span(self) -> GroupSpan {
        match self {
            GroupTier::Single => GroupSpan::Whole,
            GroupTier::Low => GroupSpan::Tiles(512),
            GroupTier::Medium => GroupSpan::Tiles(256),
            GroupTier::High => GroupSpan::Tiles(196),
            GroupTier::Extreme => GroupSpan::Tiles(128),
        }
    }

    /// The tier with the next smaller group span, `None` at `Extreme`
    pub fn next_finer(self) -> Option<GroupTier> {
        match self {
            GroupTier::Single => Some(GroupTier::Low),
            GroupTier::Low => Some(GroupTier::Medium),
            GroupTier::Medium => Some(GroupTier::High),
            GroupTier::High => Some(GroupTier::Extreme),
            GroupTier::Extreme => None,
        }
    }

    /// Map a raw setting value; unknown values fall back to `Single`
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => GroupTier::Low,
            2 => GroupTier::Medium,
            3 => GroupTier::High,
            4 => GroupTier::Extreme,
            _ => GroupTier::Single,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GroupTier::Single => "single",
            GroupTier::Low => "low",
            GroupTier::Medium => "medium",
            GroupTier::High => "high",
            GroupTier::Extreme => "extreme",
        }
    }
}

impl fmt::Display for GroupTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GroupTier {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupTier::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GridError::UnknownGroupTier(s.to_string()))
    }
}
