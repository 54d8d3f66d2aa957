//! Section registry: the ordered, trackable content regions and their extents.

use crate::geometry::sanitize_px;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use ts_rs::TS;

/// A content region as announced by the page layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegion {
    pub id: String,
    pub trackable: bool,
    /// Preferred by the bottom-of-page rule (e.g. a contact block above the footer).
    pub prefer_at_bottom: bool,
}

impl SectionRegion {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            trackable: true,
            prefer_at_bottom: false,
        }
    }

    pub fn untracked(mut self) -> Self {
        self.trackable = false;
        self
    }

    pub fn prefer_at_bottom(mut self) -> Self {
        self.prefer_at_bottom = true;
        self
    }
}

/// Document-relative vertical extent of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionExtent {
    pub top: f64,
    pub height: f64,
}

/// Inbound contract with the page layout.
pub trait SectionProvider {
    /// Regions in document order.
    fn regions(&self) -> Vec<SectionRegion>;
    /// Current extent of a region, read on demand.
    fn extent(&self, id: &str) -> Option<SectionExtent>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SectionDescriptor {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionDescriptor {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top: sanitize_px(top),
            height: sanitize_px(height),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Half-open containment: `[top, bottom)`.
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.bottom()
    }

    /// Pixels of `[start, end)` covered by this section.
    pub fn overlap(&self, start: f64, end: f64) -> f64 {
        (self.bottom().min(end) - self.top.max(start)).max(0.0)
    }

    /// Distance from `y` to the nearest edge, zero when contained.
    pub fn distance_to(&self, y: f64) -> f64 {
        if y < self.top {
            self.top - y
        } else if y >= self.bottom() {
            y - self.bottom()
        } else {
            0.0
        }
    }
}

/// Snapshot of the trackable sections. Empty means tracking is disabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionRegistry {
    sections: Vec<SectionDescriptor>,
    terminal: Option<usize>,
}

impl SectionRegistry {
    /// Read regions and their extents from the provider.
    ///
    /// `terminal_override` names the bottom-of-page section; when it is absent
    /// or not registered the first region flagged `prefer_at_bottom` is used.
    pub fn build<P>(provider: &P, terminal_override: Option<&str>) -> Self
    where
        P: SectionProvider + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut sections = Vec::new();
        let mut flagged = None;

        for region in provider.regions() {
            if !region.trackable {
                continue;
            }
            if !seen.insert(region.id.clone()) {
                debug!(id = %region.id, "Skipping duplicate section id");
                continue;
            }
            let Some(extent) = provider.extent(&region.id) else {
                debug!(id = %region.id, "Section has no readable extent; skipping");
                continue;
            };
            if region.prefer_at_bottom && flagged.is_none() {
                flagged = Some(sections.len());
            }
            sections.push(SectionDescriptor::new(region.id, extent.top, extent.height));
        }

        let mut registry = Self {
            sections,
            terminal: flagged,
        };
        if let Some(idx) = terminal_override.and_then(|id| registry.position(id)) {
            registry.terminal = Some(idx);
        }
        debug!(
            sections = registry.len(),
            terminal = registry.terminal().map(|s| s.id.as_str()),
            "Built section registry"
        );
        registry
    }

    /// Build directly from descriptors already in document order.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = SectionDescriptor>,
        terminal: Option<&str>,
    ) -> Self {
        let mut seen = HashSet::new();
        let sections: Vec<_> = descriptors
            .into_iter()
            .filter(|section| seen.insert(section.id.clone()))
            .collect();
        let terminal = terminal.and_then(|id| sections.iter().position(|s| s.id == id));
        Self { sections, terminal }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionDescriptor> {
        self.sections.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&SectionDescriptor> {
        self.sections.get(idx)
    }

    pub fn first(&self) -> Option<&SectionDescriptor> {
        self.sections.first()
    }

    pub fn last(&self) -> Option<&SectionDescriptor> {
        self.sections.last()
    }

    pub fn terminal(&self) -> Option<&SectionDescriptor> {
        self.terminal.and_then(|idx| self.sections.get(idx))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn find(&self, id: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.id == id)
    }
}
