use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named tier derived from the accumulated points of a learner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    utoipa::ToSchema,
)]
pub enum Rank {
    #[default]
    Novice,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// Tiers from lowest to highest, paired with the points needed to reach them.
const BREAKPOINTS: [(Rank, u32); 5] = [
    (Rank::Novice, 0),
    (Rank::Beginner, 500),
    (Rank::Intermediate, 1500),
    (Rank::Advanced, 3000),
    (Rank::Expert, 5000),
];

impl Rank {
    /// Maps a point total to its tier. Total over `u32`, never fails.
    pub fn from_points(points: u32) -> Self {
        BREAKPOINTS
            .iter()
            .rev()
            .find(|(_, min)| points >= *min)
            .map(|(rank, _)| *rank)
            .unwrap_or_default()
    }

    pub fn min_points(&self) -> u32 {
        match self {
            Self::Novice => 0,
            Self::Beginner => 500,
            Self::Intermediate => 1500,
            Self::Advanced => 3000,
            Self::Expert => 5000,
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Novice => Some(Self::Beginner),
            Self::Beginner => Some(Self::Intermediate),
            Self::Intermediate => Some(Self::Advanced),
            Self::Advanced => Some(Self::Expert),
            Self::Expert => None,
        }
    }

    /// Points still missing to reach the next tier, `None` once at the top.
    pub fn points_to_next_rank(points: u32) -> Option<u32> {
        Self::from_points(points)
            .next()
            .map(|next| next.min_points().saturating_sub(points))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Novice => "Novice",
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown rank: {0}")]
pub struct UnknownRank(String);

impl std::str::FromStr for Rank {
    type Err = UnknownRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BREAKPOINTS
            .iter()
            .map(|(rank, _)| *rank)
            .find(|rank| rank.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRank(s.to_string()))
    }
}
