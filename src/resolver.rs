//! Active-section resolution.
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. top guard: near the top of the document the first section is active;
//! 2. bottom guard: near the end the terminal section (or the last one) is
//!    active, which keeps a short final section reachable;
//! 3. center containment: the single section containing the viewport anchor;
//! 4. scored overlap: `overlap_px + index * index_bias`, ties to the later
//!    section. With no overlap at all the previous id is kept if it is still
//!    registered, otherwise the section nearest the anchor wins. A `None`
//!    previous also takes the nearest section, so only an empty registry
//!    resolves to nothing.

use crate::config::ResolverTuning;
use crate::geometry::Geometry;
use crate::registry::{SectionDescriptor, SectionRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRule {
    TopGuard,
    BottomGuard,
    CenterContainment,
    ScoredOverlap,
    RetainedPrevious,
    NearestToAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub index: usize,
    pub section: &'a SectionDescriptor,
    pub rule: ResolutionRule,
}

/// Resolve the active section id. `None` only for an empty registry.
pub fn resolve(
    registry: &SectionRegistry,
    geometry: &Geometry,
    previous: Option<&str>,
    tuning: &ResolverTuning,
) -> Option<String> {
    resolve_section(registry, geometry, previous, tuning).map(|r| r.section.id.clone())
}

pub fn resolve_section<'a>(
    registry: &'a SectionRegistry,
    geometry: &Geometry,
    previous: Option<&str>,
    tuning: &ResolverTuning,
) -> Option<Resolution<'a>> {
    let first = registry.first()?;

    if geometry.scroll_offset < tuning.top_guard_px {
        return Some(Resolution {
            index: 0,
            section: first,
            rule: ResolutionRule::TopGuard,
        });
    }

    if geometry.viewport_bottom() >= geometry.document_height - tuning.bottom_guard_px {
        let section = registry.terminal().or(registry.last())?;
        let index = registry.position(&section.id)?;
        return Some(Resolution {
            index,
            section,
            rule: ResolutionRule::BottomGuard,
        });
    }

    let anchor = geometry.anchor(tuning.center_ratio);
    let mut containing = registry
        .iter()
        .enumerate()
        .filter(|(_, section)| section.contains(anchor));
    if let (Some((index, section)), None) = (containing.next(), containing.next()) {
        return Some(Resolution {
            index,
            section,
            rule: ResolutionRule::CenterContainment,
        });
    }

    if let Some((index, section)) = best_scored(registry, geometry, tuning.index_bias) {
        return Some(Resolution {
            index,
            section,
            rule: ResolutionRule::ScoredOverlap,
        });
    }

    if let Some(index) = previous.and_then(|id| registry.position(id)) {
        return Some(Resolution {
            index,
            section: registry.get(index)?,
            rule: ResolutionRule::RetainedPrevious,
        });
    }

    let (index, section) = registry
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_to(anchor).total_cmp(&b.distance_to(anchor)))?;
    Some(Resolution {
        index,
        section,
        rule: ResolutionRule::NearestToAnchor,
    })
}

fn best_scored<'a>(
    registry: &'a SectionRegistry,
    geometry: &Geometry,
    index_bias: f64,
) -> Option<(usize, &'a SectionDescriptor)> {
    let view_top = geometry.scroll_offset;
    let view_bottom = geometry.viewport_bottom();

    let mut best: Option<(f64, usize, &SectionDescriptor)> = None;
    for (index, section) in registry.iter().enumerate() {
        let overlap = section.overlap(view_top, view_bottom);
        if overlap <= 0.0 {
            continue;
        }
        let score = overlap + index as f64 * index_bias;
        // `>=` hands ties to the later section.
        if best.is_none_or(|(top, _, _)| score >= top) {
            best = Some((score, index, section));
        }
    }
    best.map(|(_, index, section)| (index, section))
}
