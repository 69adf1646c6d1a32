//! Hierarchy paths in WBS form (`["1", "1.1", "1.1.1"]`).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Ancestry of a row expressed as cumulative outline segments.
///
/// Each segment is the full outline number of one ancestor, so the path of
/// `1.1.2` is `["1", "1.1", "1.1.2"]`. A parent's path is always a strict
/// prefix of its children's paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HierarchyPath(Vec<String>);

impl HierarchyPath {
    pub fn new(segments: Vec<String>) -> Result<Self, ModelError> {
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(ModelError::InvalidPath(format!(
                "empty segment in {segments:?}"
            )));
        }
        Ok(Self(segments))
    }

    /// Parse an outline number such as `2.1.3` into its cumulative path.
    pub fn from_outline(outline: &str) -> Result<Self, ModelError> {
        let parts: Vec<&str> = outline.trim().split('.').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(ModelError::InvalidPath(outline.to_string()));
        }
        let segments = (1..=parts.len()).map(|n| parts[..n].join(".")).collect();
        Ok(Self(segments))
    }

    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zero-based depth; a single-segment path is a root at depth 0.
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The path with its last segment removed, or `None` for roots.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// True when `self` is an ancestor of `other` or equal to it.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// Numeric index of the last outline component (`3` for `1.2.3`).
    pub fn last_index(&self) -> Option<u64> {
        self.last()
            .and_then(|s| s.rsplit('.').next())
            .and_then(|s| s.parse().ok())
    }

    /// The outline number of the row itself, e.g. `1.1.2`.
    pub fn dotted(&self) -> String {
        self.last().unwrap_or_default().to_string()
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl Ord for HierarchyPath {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let ord = compare_segment(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for HierarchyPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare outline segments component-wise, numerically where both sides parse.
fn compare_segment(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
