//! Navigation menu highlighting and click-to-scroll targets.

use crate::geometry::{Geometry, sanitize_px};
use crate::lifecycle::LifecycleListener;
use crate::registry::SectionRegistry;
use anyhow::Result;
use std::collections::HashMap;

/// Keeps exactly one nav link highlighted: the one mapped to the active
/// section. Sections without a link clear the highlight.
#[derive(Debug, Clone, Default)]
pub struct NavHighlight {
    links: HashMap<String, String>,
    active_link: Option<String>,
    changes: u64,
}

impl NavHighlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a section id to the link (e.g. an anchor `href`) it highlights.
    pub fn with_link(mut self, section_id: impl Into<String>, link: impl Into<String>) -> Self {
        self.links.insert(section_id.into(), link.into());
        self
    }

    pub fn active_link(&self) -> Option<&str> {
        self.active_link.as_deref()
    }

    pub fn is_active(&self, link: &str) -> bool {
        self.active_link.as_deref() == Some(link)
    }

    /// Number of highlight changes applied.
    pub fn changes(&self) -> u64 {
        self.changes
    }
}

impl LifecycleListener for NavHighlight {
    fn name(&self) -> &str {
        "nav-highlight"
    }

    fn on_section_enter(&mut self, id: &str) -> Result<()> {
        let next = self.links.get(id).cloned();
        if next != self.active_link {
            self.active_link = next;
            self.changes += 1;
        }
        Ok(())
    }
}

/// Scroll offset that brings section `id` to the top of the viewport, below a
/// fixed header of `header_offset` pixels. Clamped to the scrollable range.
pub fn scroll_target_for(
    registry: &SectionRegistry,
    geometry: &Geometry,
    id: &str,
    header_offset: f64,
) -> Option<f64> {
    let section = registry.find(id)?;
    let target = section.top - sanitize_px(header_offset);
    Some(target.clamp(0.0, geometry.scroll_range().max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SectionDescriptor;

    fn registry() -> SectionRegistry {
        SectionRegistry::from_descriptors(
            vec![
                SectionDescriptor::new("hero", 0.0, 1000.0),
                SectionDescriptor::new("about", 1000.0, 1000.0),
                SectionDescriptor::new("contact", 2000.0, 600.0),
            ],
            None,
        )
    }

    #[test]
    fn highlight_follows_enters_and_clears_for_unlinked_sections() {
        let mut nav = NavHighlight::new()
            .with_link("about", "#about")
            .with_link("contact", "#contact");

        nav.on_section_enter("about").expect("enter");
        assert!(nav.is_active("#about"));
        nav.on_section_enter("contact").expect("enter");
        assert_eq!(nav.active_link(), Some("#contact"));
        nav.on_section_enter("hero").expect("enter");
        assert_eq!(nav.active_link(), None);
        assert_eq!(nav.changes(), 3);
    }

    #[test]
    fn scroll_target_accounts_for_header_and_clamps() {
        let registry = registry();
        let geometry = Geometry::new(0.0, 800.0, 2600.0);

        assert_eq!(scroll_target_for(&registry, &geometry, "about", 64.0), Some(936.0));
        assert_eq!(scroll_target_for(&registry, &geometry, "hero", 64.0), Some(0.0));
        assert_eq!(scroll_target_for(&registry, &geometry, "contact", 0.0), Some(1800.0));
        assert_eq!(scroll_target_for(&registry, &geometry, "missing", 0.0), None);
    }
}
