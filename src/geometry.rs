//! Viewport geometry sampling.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Inbound contract with the host's scrolling surface.
pub trait GeometryProvider {
    fn scroll_offset(&self) -> f64;
    fn viewport_height(&self) -> f64;
    /// Total scrollable content height.
    fn document_height(&self) -> f64;
}

/// One instant's reading of the scrolling surface. Never retained between passes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Geometry {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl Geometry {
    pub fn new(scroll_offset: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_offset: sanitize_px(scroll_offset),
            viewport_height: sanitize_px(viewport_height),
            document_height: sanitize_px(document_height),
        }
    }

    /// Read the provider now. No caching: two calls may differ.
    pub fn sample<P>(provider: &P) -> Self
    where
        P: GeometryProvider + ?Sized,
    {
        Self::new(
            provider.scroll_offset(),
            provider.viewport_height(),
            provider.document_height(),
        )
    }

    pub fn viewport_bottom(&self) -> f64 {
        self.scroll_offset + self.viewport_height
    }

    /// Scrollable distance; zero or negative when the document fits.
    pub fn scroll_range(&self) -> f64 {
        self.document_height - self.viewport_height
    }

    pub fn is_degenerate(&self) -> bool {
        self.document_height <= self.viewport_height
    }

    pub fn anchor(&self, ratio: f64) -> f64 {
        self.scroll_offset + self.viewport_height * ratio
    }
}

/// Clamp a pixel reading to a finite, non-negative value.
pub fn sanitize_px(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
