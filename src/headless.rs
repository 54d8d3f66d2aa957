//! In-memory host: a stacked page of sections with a manually pumped frame
//! queue. Drives the tracker without a browser, e.g. for prerendering
//! navigation state and in tests.

use crate::cancellation::CancellationToken;
use crate::geometry::GeometryProvider;
use crate::registry::{SectionExtent, SectionProvider, SectionRegion};
use crate::scheduler::{FrameHost, FrameToken};
use crate::tracker::{PassOutcome, SectionTracker};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct PageState {
    sections: Vec<(SectionRegion, f64)>,
    scroll_offset: f64,
    viewport_height: f64,
    document_height_override: Option<f64>,
    next_frame: u64,
    queued: Vec<FrameToken>,
    cancelled: Vec<FrameToken>,
    frames_requested: u64,
    teardown: Option<CancellationToken>,
}

impl PageState {
    fn content_height(&self) -> f64 {
        self.sections.iter().map(|(_, h)| h).sum()
    }

    fn document_height(&self) -> f64 {
        self.document_height_override
            .unwrap_or_else(|| self.content_height())
    }

    fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }
}

/// Cheap to clone; clones share the same page.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPage {
    inner: Rc<RefCell<PageState>>,
}

impl HeadlessPage {
    pub fn new(viewport_height: f64) -> Self {
        let page = Self::default();
        page.inner.borrow_mut().viewport_height = viewport_height.max(0.0);
        page
    }

    /// Append a section below the existing ones.
    pub fn with_section(self, region: SectionRegion, height: f64) -> Self {
        self.push_section(region, height);
        self
    }

    pub fn push_section(&self, region: SectionRegion, height: f64) {
        self.inner
            .borrow_mut()
            .sections
            .push((region, height.max(0.0)));
    }

    /// Remove a section; the ones below move up.
    pub fn remove_section(&self, id: &str) -> bool {
        let mut state = self.inner.borrow_mut();
        let before = state.sections.len();
        state.sections.retain(|(region, _)| region.id != id);
        let removed = state.sections.len() != before;
        let max = state.max_scroll();
        state.scroll_offset = state.scroll_offset.min(max);
        removed
    }

    pub fn set_section_height(&self, id: &str, height: f64) -> bool {
        let mut state = self.inner.borrow_mut();
        match state.sections.iter_mut().find(|(region, _)| region.id == id) {
            Some((_, h)) => {
                *h = height.max(0.0);
                true
            }
            None => false,
        }
    }

    /// Scroll like a browser would: clamped to the scrollable range.
    pub fn scroll_to(&self, offset: f64) {
        let mut state = self.inner.borrow_mut();
        let max = state.max_scroll();
        state.scroll_offset = offset.clamp(0.0, max);
    }

    pub fn scroll_to_bottom(&self) {
        let mut state = self.inner.borrow_mut();
        state.scroll_offset = state.max_scroll();
    }

    pub fn resize(&self, viewport_height: f64) {
        let mut state = self.inner.borrow_mut();
        state.viewport_height = viewport_height.max(0.0);
        let max = state.max_scroll();
        state.scroll_offset = state.scroll_offset.min(max);
    }

    /// Pin the document height, e.g. to account for chrome outside sections.
    pub fn set_document_height(&self, height: Option<f64>) {
        self.inner.borrow_mut().document_height_override = height;
    }

    pub fn max_scroll(&self) -> f64 {
        self.inner.borrow().max_scroll()
    }

    /// Drain the frames requested so far, as a display refresh would.
    pub fn take_frames(&self) -> Vec<FrameToken> {
        std::mem::take(&mut self.inner.borrow_mut().queued)
    }

    pub fn frames_requested(&self) -> u64 {
        self.inner.borrow().frames_requested
    }

    pub fn cancelled_frames(&self) -> Vec<FrameToken> {
        self.inner.borrow().cancelled.clone()
    }

    /// Stimulus listeners are attached and the tracker is alive.
    pub fn is_attached(&self) -> bool {
        self.inner
            .borrow()
            .teardown
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl SectionProvider for HeadlessPage {
    fn regions(&self) -> Vec<SectionRegion> {
        self.inner
            .borrow()
            .sections
            .iter()
            .map(|(region, _)| region.clone())
            .collect()
    }

    fn extent(&self, id: &str) -> Option<SectionExtent> {
        let state = self.inner.borrow();
        let mut top = 0.0;
        for (region, height) in &state.sections {
            if region.id == id {
                return Some(SectionExtent {
                    top,
                    height: *height,
                });
            }
            top += height;
        }
        None
    }
}

impl GeometryProvider for HeadlessPage {
    fn scroll_offset(&self) -> f64 {
        self.inner.borrow().scroll_offset
    }

    fn viewport_height(&self) -> f64 {
        self.inner.borrow().viewport_height
    }

    fn document_height(&self) -> f64 {
        self.inner.borrow().document_height()
    }
}

impl FrameHost for HeadlessPage {
    fn request_frame(&mut self) -> FrameToken {
        let mut state = self.inner.borrow_mut();
        state.next_frame += 1;
        state.frames_requested += 1;
        let token = FrameToken(state.next_frame);
        state.queued.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let mut state = self.inner.borrow_mut();
        state.queued.retain(|queued| *queued != token);
        state.cancelled.push(token);
    }

    fn attach_stimuli(&mut self, teardown: CancellationToken) {
        self.inner.borrow_mut().teardown = Some(teardown);
    }

    fn detach_stimuli(&mut self) {
        self.inner.borrow_mut().teardown = None;
    }
}

impl SectionTracker<HeadlessPage> {
    /// Fire every queued frame, in request order.
    pub fn flush_frames(&mut self) -> Vec<PassOutcome> {
        let frames = self.host().take_frames();
        frames.into_iter().map(|token| self.on_frame(token)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    fn page() -> HeadlessPage {
        HeadlessPage::new(800.0)
            .with_section(SectionRegion::new("hero"), 900.0)
            .with_section(SectionRegion::new("about"), 1100.0)
            .with_section(SectionRegion::new("footer").untracked(), 200.0)
    }

    #[test]
    fn sections_stack_in_order() {
        let page = page();
        assert_eq!(
            page.extent("about"),
            Some(SectionExtent {
                top: 900.0,
                height: 1100.0
            })
        );
        assert_eq!(page.document_height(), 2200.0);
        assert_eq!(page.max_scroll(), 1400.0);
    }

    #[test]
    fn scrolling_is_clamped() {
        let page = page();
        page.scroll_to(99_999.0);
        assert_eq!(Geometry::sample(&page).scroll_offset, 1400.0);
        page.scroll_to(-10.0);
        assert_eq!(page.scroll_offset(), 0.0);
    }

    #[test]
    fn removing_a_section_restacks_and_clamps_scroll() {
        let page = page();
        page.scroll_to_bottom();
        assert!(page.remove_section("about"));
        assert_eq!(page.extent("footer").map(|e| e.top), Some(900.0));
        assert_eq!(page.scroll_offset(), 300.0);
        assert!(!page.remove_section("about"));
    }

    #[test]
    fn cancelled_frames_leave_the_queue() {
        let mut page = page();
        let a = page.request_frame();
        let b = page.request_frame();
        page.cancel_frame(a);
        assert_eq!(page.take_frames(), vec![b]);
        assert_eq!(page.cancelled_frames(), vec![a]);
        assert_eq!(page.frames_requested(), 2);
    }
}
