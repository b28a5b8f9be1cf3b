//! Axis Registry
//!
//! Immutable, process-wide table of semantic axes. It is built once (from typed rows,
//! a JSON file, or the reference configuration) and then shared behind an `Arc`.

use super::types::{Axis, AxisRow, Range};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

const GIRLS_AXIS: &str = "girls";
const BOYS_AXIS: &str = "boys";
const SOLO_AXIS: &str = "solo";

#[derive(Debug, Clone)]
pub struct AxisRegistry {
    axes: Vec<Axis>,
    /// tag -> (position in `axes`, range)
    by_tag: HashMap<String, (usize, Range)>,
}

impl AxisRegistry {
    /// Builds the registry from typed rows.
    ///
    /// Axis order follows the first appearance of each axis name; tags keep their row
    /// order inside the axis. Tag and axis names are lower-cased like every other tag.
    pub fn from_rows(rows: impl IntoIterator<Item = AxisRow>) -> Result<Self> {
        let mut axes: Vec<Axis> = Vec::new();
        let mut by_tag: HashMap<String, (usize, Range)> = HashMap::new();

        for row in rows {
            let axis_name = row.axis.trim().to_lowercase();
            let tag = row.tag.trim().to_lowercase();
            let range = row.range();

            if axis_name.is_empty() || tag.is_empty() {
                return Err(anyhow::anyhow!("Axis rows need a non-empty axis and tag"));
            }
            if let Some(max) = range.max
                && max < range.min
            {
                return Err(anyhow::anyhow!(
                    "Tag '{}' has an empty range {}..{}",
                    tag,
                    range.min,
                    max
                ));
            }
            if let Some((existing, _)) = by_tag.get(&tag) {
                return Err(anyhow::anyhow!(
                    "Tag '{}' is already registered under axis '{}'",
                    tag,
                    axes[*existing].name
                ));
            }

            let axis_idx = match axes.iter().position(|axis| axis.name == axis_name) {
                Some(idx) => idx,
                None => {
                    axes.push(Axis {
                        name: axis_name,
                        tags: Vec::new(),
                    });
                    axes.len() - 1
                }
            };

            axes[axis_idx].tags.push((tag.clone(), range));
            by_tag.insert(tag, (axis_idx, range));
        }

        tracing::debug!(
            "Axis registry loaded: {} axes, {} tags",
            axes.len(),
            by_tag.len()
        );

        Ok(Self { axes, by_tag })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let rows: Vec<AxisRow> = serde_json::from_str(raw).context("Invalid axis row JSON")?;
        Self::from_rows(rows)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read axis file {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// The reference configuration: `girls` and `boys` with per-count tags 1..6 plus a
    /// `multiple_*` tag over `[2, inf)`, and a single-tag `solo` axis over `[1, 1]`.
    pub fn reference() -> Self {
        Self::from_rows(reference_rows()).expect("reference axis rows are well formed")
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    pub fn axis_of(&self, tag: &str) -> Option<&Axis> {
        self.by_tag.get(tag).map(|(idx, _)| &self.axes[*idx])
    }

    pub fn range_of(&self, tag: &str) -> Option<Range> {
        self.by_tag.get(tag).map(|(_, range)| *range)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    pub fn all_tags(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().flat_map(|axis| axis.tag_names())
    }

    pub fn tag_count(&self) -> usize {
        self.by_tag.len()
    }

    /// Axis tags whose range starts at `min` or higher (count >= 2 tags, for instance).
    pub fn tags_with_min_at_least(&self, min: u32) -> Vec<String> {
        self.axes
            .iter()
            .flat_map(|axis| axis.tags.iter())
            .filter(|(_, range)| range.min >= min)
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    pub fn rows(&self) -> Vec<AxisRow> {
        self.axes
            .iter()
            .flat_map(|axis| {
                axis.tags
                    .iter()
                    .map(move |(tag, range)| AxisRow::new(&axis.name, tag, *range))
            })
            .collect()
    }
}

fn reference_rows() -> Vec<AxisRow> {
    let mut rows = Vec::new();
    for (axis, singular, plural) in [(GIRLS_AXIS, "girl", "girls"), (BOYS_AXIS, "boy", "boys")] {
        rows.push(AxisRow::new(axis, &format!("1{}", singular), Range::exact(1)));
        for count in 2..=6 {
            rows.push(AxisRow::new(
                axis,
                &format!("{}{}", count, plural),
                Range::exact(count),
            ));
        }
        rows.push(AxisRow::new(
            axis,
            &format!("multiple_{}", plural),
            Range::at_least(2),
        ));
    }
    rows.push(AxisRow::new(SOLO_AXIS, "solo", Range::exact(1)));
    rows
}
