//! # History
//!
//! Bounded undo/redo over whole-document snapshots. A [`Snapshot`] holds every layer's pixels and
//! metadata plus the active layer, and is taken *before* an action runs. Undo swaps the current state
//! for the newest undo entry, pushing the current state to the redo stack, and vice versa.
//!
//! Full-resolution snapshots of a ten layer document are big, so snapshots share the pixel buffers of
//! layers whose surface revision didn't change since a neighboring snapshot. Changed layers are always
//! captured in full.

use std::{collections::VecDeque, sync::Arc};

use crate::{
    color::Color,
    document::{Document, LayerError},
    layer::{Layer, LayerID, LayerInfo},
    raster::{RasterSurface, RevisionID},
};

/// Default number of undo steps kept.
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("snapshot doesn't fit the document: {0}")]
    Mismatch(#[from] LayerError),
}

#[derive(Clone, Debug)]
pub struct LayerSnapshot {
    pub info: LayerInfo,
    pub revision: RevisionID,
    pub pixels: Arc<[Color]>,
}

/// Immutable copy of a document's layer stack.
#[derive(Clone, Debug)]
pub struct Snapshot {
    layers: Vec<LayerSnapshot>,
    active: LayerID,
}

impl Snapshot {
    /// Capture `document`. Buffers of layers at the same revision as in any of `reuse` are shared
    /// rather than copied.
    #[must_use]
    pub fn capture<'a>(document: &Document, reuse: impl IntoIterator<Item = &'a Snapshot>) -> Self {
        let shared: hashbrown::HashMap<RevisionID, &Arc<[Color]>> = reuse
            .into_iter()
            .flat_map(|snapshot| &snapshot.layers)
            .map(|layer| (layer.revision, &layer.pixels))
            .collect();
        let layers = document
            .layers()
            .iter()
            .map(|layer| {
                let surface = layer.surface();
                let revision = surface.revision();
                let pixels = shared
                    .get(&revision)
                    .map_or_else(|| surface.share(), |&pixels| Arc::clone(pixels));
                LayerSnapshot {
                    info: layer.info(),
                    revision,
                    pixels,
                }
            })
            .collect();
        Self {
            layers,
            active: document.active(),
        }
    }
    #[must_use]
    pub fn layers(&self) -> &[LayerSnapshot] {
        &self.layers
    }
    #[must_use]
    pub fn active(&self) -> LayerID {
        self.active
    }
    /// Check this snapshot could be restored into `document` without breaking its invariants.
    pub fn check(&self, document: &Document) -> Result<(), LayerError> {
        if self.layers.is_empty() {
            return Err(LayerError::LastLayer);
        }
        if self.layers.len() > document.max_layers() {
            return Err(LayerError::LayerLimit(document.max_layers()));
        }
        let len = document.width() as usize * document.height() as usize;
        if self.layers.iter().any(|layer| layer.pixels.len() != len) {
            return Err(LayerError::OutOfBounds);
        }
        if !self.layers.iter().any(|layer| layer.info.id == self.active) {
            return Err(LayerError::UnknownLayer);
        }
        Ok(())
    }
    /// Restore into `document`, reusing its existing buffers where layer identity survives.
    /// On error the document is untouched.
    pub fn restore(&self, document: &mut Document) -> Result<(), LayerError> {
        self.check(document)?;
        let (width, height) = (document.width(), document.height());
        let mut old: hashbrown::HashMap<LayerID, Layer> = document
            .take_layers()
            .into_iter()
            .map(|layer| (layer.id(), layer))
            .collect();
        let layers = self
            .layers
            .iter()
            .map(|snapshot| {
                let mut surface = old
                    .remove(&snapshot.info.id)
                    .map_or_else(|| RasterSurface::new(width, height), Layer::into_surface);
                // Lengths were checked above.
                surface.restore(&snapshot.pixels, snapshot.revision);
                Layer::from_parts(snapshot.info.clone(), surface)
            })
            .collect();
        document.replace_layers(layers, self.active);
        Ok(())
    }
    /// Bytes of pixel data held, counting shared buffers once each.
    fn unique_bytes<'a>(
        snapshots: impl IntoIterator<Item = &'a Snapshot>,
    ) -> usize {
        let mut seen = hashbrown::HashSet::new();
        snapshots
            .into_iter()
            .flat_map(|snapshot| &snapshot.layers)
            .filter(|layer| seen.insert(Arc::as_ptr(&layer.pixels).cast::<Color>()))
            .map(|layer| std::mem::size_of_val::<[Color]>(&layer.pixels))
            .sum()
    }
}

pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
}
impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
impl History {
    /// Capacity of at least one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Capture `document`, sharing unchanged buffers with the neighboring entries.
    #[must_use]
    pub fn snapshot(&self, document: &Document) -> Snapshot {
        Snapshot::capture(document, self.undo.back().into_iter().chain(self.redo.last()))
    }
    /// Record a pre-action state. Clears redo, and drops the oldest entry beyond capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.redo.clear();
        self.undo.push_back(snapshot);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
            log::debug!("History full, dropped oldest entry");
        }
        log::debug!(
            "History: {} undo, holding {}",
            self.undo.len(),
            human_bytes::human_bytes(self.footprint() as f64)
        );
    }
    /// Snapshot `document` and push it.
    pub fn record(&mut self, document: &Document) {
        let snapshot = self.snapshot(document);
        self.push(snapshot);
    }
    pub fn undo(&mut self, document: &mut Document) -> Result<(), HistoryError> {
        let target = self.undo.back().ok_or(HistoryError::NothingToUndo)?;
        let current = Snapshot::capture(document, [target]);
        target.restore(document)?;
        self.undo.pop_back();
        self.redo.push(current);
        Ok(())
    }
    pub fn redo(&mut self, document: &mut Document) -> Result<(), HistoryError> {
        let target = self.redo.last().ok_or(HistoryError::NothingToRedo)?;
        let current = Snapshot::capture(document, [target]);
        target.restore(document)?;
        self.redo.pop();
        self.undo.push_back(current);
        Ok(())
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> impl ExactSizeIterator<Item = &Snapshot> + '_ {
        self.undo.iter()
    }
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
    /// Bytes of pixel data held across both stacks.
    #[must_use]
    pub fn footprint(&self) -> usize {
        Snapshot::unique_bytes(self.undo.iter().chain(&self.redo))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::Background;
    use proptest::prelude::*;

    fn doc() -> Document {
        Document::new(4, 4, Background::Transparent)
    }
    fn paint(doc: &mut Document, color: Color) {
        doc.active_surface_mut().pixels_mut().fill(color);
    }

    #[test]
    fn empty_stacks() {
        let mut doc = doc();
        let mut history = History::default();
        assert_eq!(history.undo(&mut doc), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(&mut doc), Err(HistoryError::NothingToRedo));
    }
    #[test]
    fn undo_redo_roundtrip() {
        let mut doc = doc();
        let mut history = History::default();
        history.record(&doc);
        paint(&mut doc, Color::BLACK);
        let painted = doc.active_layer().surface().pixels().to_vec();

        history.undo(&mut doc).unwrap();
        assert!(doc
            .active_layer()
            .surface()
            .pixels()
            .iter()
            .all(|&p| p == Color::TRANSPARENT));
        assert!(history.can_redo());

        history.redo(&mut doc).unwrap();
        assert_eq!(doc.active_layer().surface().pixels(), painted.as_slice());
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }
    #[test]
    fn restores_structure() {
        let mut doc = doc();
        let mut history = History::default();
        let original = doc.active();
        history.record(&doc);
        let added = doc.add_layer().unwrap();
        doc.rename(added, "added").unwrap();

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.layers().len(), 1);
        assert_eq!(doc.active(), original);

        history.redo(&mut doc).unwrap();
        assert_eq!(doc.layers().len(), 2);
        assert_eq!(doc.active(), added);
        assert_eq!(doc.layer(added).unwrap().name, "added");
    }
    #[test]
    fn push_clears_redo() {
        let mut doc = doc();
        let mut history = History::default();
        history.record(&doc);
        paint(&mut doc, Color::BLACK);
        history.undo(&mut doc).unwrap();
        assert!(history.can_redo());
        history.record(&doc);
        assert!(!history.can_redo());
    }
    #[test]
    fn capacity_keeps_latest() {
        let mut doc = doc();
        let mut history = History::default();
        let id = doc.active();
        for i in 0..51 {
            doc.rename(id, format!("step {i}")).unwrap();
            history.record(&doc);
        }
        assert_eq!(history.undo_len(), DEFAULT_CAPACITY);
        let names: Vec<_> = history
            .undo_entries()
            .map(|snapshot| snapshot.layers()[0].info.name.clone())
            .collect();
        let expected: Vec<_> = (1..51).map(|i| format!("step {i}")).collect();
        assert_eq!(names, expected);
    }
    #[test]
    fn unchanged_buffers_shared() {
        let mut doc = doc();
        let mut history = History::default();
        let bottom = doc.active();
        doc.add_layer().unwrap();
        history.record(&doc);
        paint(&mut doc, Color::BLACK);
        history.record(&doc);
        let entries: Vec<_> = history.undo_entries().collect();
        let find = |snapshot: &Snapshot, id| {
            snapshot
                .layers()
                .iter()
                .find(|layer| layer.info.id == id)
                .map(|layer| Arc::clone(&layer.pixels))
                .unwrap()
        };
        // Untouched bottom layer shares, the painted top doesn't.
        assert!(Arc::ptr_eq(&find(entries[0], bottom), &find(entries[1], bottom)));
        let top = doc.active();
        assert!(!Arc::ptr_eq(&find(entries[0], top), &find(entries[1], top)));
        // Three distinct 4x4 buffers.
        assert_eq!(history.footprint(), 3 * 16 * 4);
    }

    proptest! {
        #[test]
        fn stacks_bounded(capacity in 1..8usize, pushes in 0..24usize, undos in 0..24usize) {
            let mut doc = doc();
            let mut history = History::new(capacity);
            for _ in 0..pushes {
                history.record(&doc);
            }
            for _ in 0..undos {
                let _ = history.undo(&mut doc);
            }
            prop_assert!(history.undo_len() <= capacity);
            prop_assert!(history.redo_len() <= capacity);
            prop_assert_eq!(history.undo_len() + history.redo_len(), pushes.min(capacity));
        }
    }
}
