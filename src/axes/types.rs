use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive subject-count interval attached to one axis tag.
///
/// `max == None` stands for an unbounded upper end (the `multiple_*` tags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: Option<u32>,
}

impl Range {
    pub const fn exact(count: u32) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    pub const fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    pub const fn bounded(min: u32, max: u32) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// Standard interval intersection: `not (b1 < a2 or b2 < a1)`.
    pub fn overlaps(&self, other: &Range) -> bool {
        let self_ends_before = matches!(self.max, Some(max) if max < other.min);
        let other_ends_before = matches!(other.max, Some(max) if max < self.min);
        !(self_ends_before || other_ends_before)
    }

    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, "[{}, inf)", self.min),
        }
    }
}

/// One row of the typed axis table: `{axis, tag, min, max | unbounded}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRow {
    pub axis: String,
    pub tag: String,
    pub min: u32,
    #[serde(default)]
    pub max: Option<u32>,
}

impl AxisRow {
    pub fn new(axis: &str, tag: &str, range: Range) -> Self {
        Self {
            axis: axis.to_string(),
            tag: tag.to_string(),
            min: range.min,
            max: range.max,
        }
    }

    pub fn range(&self) -> Range {
        Range {
            min: self.min,
            max: self.max,
        }
    }
}

/// A named group of mutually exclusive tags, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub tags: Vec<(String, Range)>,
}

impl Axis {
    pub fn range_of(&self, tag: &str) -> Option<Range> {
        self.tags
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, range)| *range)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|(name, _)| name == tag)
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(name, _)| name.as_str())
    }
}
