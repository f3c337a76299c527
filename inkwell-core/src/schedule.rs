//! # Frame scheduling
//!
//! Interactive composites are expensive, and a fast pointer delivers many mutations per display
//! frame. [`FrameScheduler`] collapses any number of composite requests into a single composite on
//! the next frame tick, driven by the host's render loop.
//!
//! A request made before a tick is always reflected by that tick's composite, so the displayed image
//! never lags the document by more than one frame.

use crate::{
    composite::{composite, Target},
    document::Document,
    noise::TextureCache,
    raster::RasterSurface,
};

/// Counters for how much work was saved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Total composite requests.
    pub requests: u64,
    /// Requests folded into an already-pending one.
    pub coalesced: u64,
    /// Frame ticks observed.
    pub frames: u64,
    /// Composites actually run.
    pub composites: u64,
}

#[derive(Default)]
pub struct FrameScheduler {
    pending: bool,
    latest: Option<RasterSurface>,
    stats: FrameStats,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Note that the document changed and the display is stale.
    pub fn request(&mut self) {
        self.stats.requests += 1;
        if self.pending {
            self.stats.coalesced += 1;
        }
        self.pending = true;
    }
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
    /// A display frame elapsed. Composites if anything was requested since the last one, returning
    /// the new image, otherwise `None` and the previous image stays current.
    pub fn on_frame(
        &mut self,
        document: &Document,
        textures: &mut TextureCache,
    ) -> Option<&RasterSurface> {
        self.stats.frames += 1;
        if !self.pending {
            return None;
        }
        self.run(document, textures);
        self.latest.as_ref()
    }
    /// The up-to-date display image, compositing now if stale.
    pub fn current(&mut self, document: &Document, textures: &mut TextureCache) -> &RasterSurface {
        if self.pending || self.latest.is_none() {
            self.run(document, textures);
        }
        // Just populated above.
        self.latest
            .get_or_insert_with(|| composite(document, textures, Target::Display))
    }
    /// Most recent display image, possibly stale.
    #[must_use]
    pub fn latest(&self) -> Option<&RasterSurface> {
        self.latest.as_ref()
    }
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }
    /// Forget the cached image, e.g. when the document is replaced.
    pub fn reset(&mut self) {
        self.latest = None;
        self.pending = true;
    }
    fn run(&mut self, document: &Document, textures: &mut TextureCache) {
        self.pending = false;
        self.stats.composites += 1;
        log::trace!("Compositing frame {}", self.stats.frames);
        self.latest = Some(composite(document, textures, Target::Display));
    }
}
