//! # Engine
//!
//! The host-facing facade tying the document, stroke renderer, history, textures and frame
//! scheduler together. Every operation either succeeds or is declined with an error and leaves the
//! document exactly as it was; declined operations are logged and never recorded in history.
//!
//! History-tracked operations snapshot the document *before* they run, and only once they are known
//! to succeed. A pointer gesture stages its snapshot at pointer-down and commits it as a single undo
//! step when the gesture ends.

use crate::{
    blend::BlendMode,
    brush::{BrushKind, BrushSettings},
    color::Color,
    composite::{composite, Target},
    document::{Background, Document, LayerError},
    fill,
    history::{History, HistoryError, Snapshot},
    layer::LayerID,
    noise::{TextureCache, TextureId},
    raster::RasterSurface,
    schedule::FrameScheduler,
    stroke::{self, PointerSample, StrokeRenderer},
};

/// Engine construction parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Canvas width, pixels.
    pub width: u32,
    /// Canvas height, pixels.
    pub height: u32,
    /// Undo steps kept.
    pub history_capacity: usize,
    pub max_layers: usize,
    /// Texture tile edge, pixels.
    pub tile_size: u32,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 2048,
            height: 2048,
            history_capacity: crate::history::DEFAULT_CAPACITY,
            max_layers: crate::document::MAX_LAYERS,
            tile_size: crate::noise::TILE_SIZE,
        }
    }
}

enum Gesture {
    Idle,
    Drawing {
        /// Pre-stroke state, pushed to history when the gesture ends.
        staged: Snapshot,
        /// Pointer left the canvas. Painting stops, but the gesture isn't over.
        suspended: bool,
    },
}

pub struct Engine {
    config: EngineConfig,
    document: Document,
    history: History,
    textures: TextureCache,
    renderer: StrokeRenderer,
    scheduler: FrameScheduler,
    gesture: Gesture,
    brush: BrushKind,
    settings: BrushSettings,
}

impl Engine {
    /// Engine with a fresh white document.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut scheduler = FrameScheduler::new();
        scheduler.request();
        let brush = BrushKind::default();
        Self {
            document: Document::with_max_layers(
                config.width,
                config.height,
                Background::default(),
                config.max_layers,
            ),
            history: History::new(config.history_capacity),
            textures: TextureCache::new(config.tile_size),
            renderer: StrokeRenderer::default(),
            scheduler,
            gesture: Gesture::Idle,
            brush,
            settings: brush.default_settings(),
            config,
        }
    }
    /// Replace the document with a fresh single-layer one. History is cleared.
    pub fn init_document(&mut self, background: Background) {
        self.gesture = Gesture::Idle;
        self.renderer.finish();
        let texture = self.document.texture;
        self.document = Document::with_max_layers(
            self.config.width,
            self.config.height,
            background,
            self.config.max_layers,
        );
        self.document.texture = texture;
        self.history.clear();
        self.scheduler.reset();
        log::info!(
            "New {}x{} document, background {background:?}",
            self.config.width,
            self.config.height
        );
    }
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }
    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    // ======== Brush selection ========
    /// Select a brush, adopting its default settings but keeping the current color.
    pub fn set_brush(&mut self, brush: BrushKind) {
        let color = self.settings.color;
        self.brush = brush;
        self.settings = BrushSettings {
            color,
            ..brush.default_settings()
        };
    }
    #[must_use]
    pub fn brush(&self) -> BrushKind {
        self.brush
    }
    pub fn set_brush_settings(&mut self, settings: BrushSettings) {
        self.settings = settings.sanitized();
    }
    #[must_use]
    pub fn brush_settings(&self) -> &BrushSettings {
        &self.settings
    }
    pub fn set_color(&mut self, color: Color) {
        self.settings.color = color;
    }

    // ======== Gestures ========
    /// Begin a stroke on the active layer with the current brush.
    pub fn pointer_down(&mut self, sample: PointerSample) {
        self.end_gesture();
        let staged = self.history.snapshot(&self.document);
        self.renderer.begin(self.brush, self.settings);
        log::trace!(
            "Stroke start {} on {} at ({}, {})",
            self.brush,
            self.document.active(),
            sample.x,
            sample.y
        );
        self.renderer
            .push(self.document.active_surface_mut(), sample);
        self.gesture = Gesture::Drawing {
            staged,
            suspended: false,
        };
        self.scheduler.request();
    }
    /// Continue the stroke. Ignored when not drawing, or after the pointer left the canvas.
    pub fn pointer_move(&mut self, sample: PointerSample) {
        if !matches!(
            self.gesture,
            Gesture::Drawing {
                suspended: false,
                ..
            }
        ) {
            return;
        }
        let stamps = self
            .renderer
            .push(self.document.active_surface_mut(), sample);
        if stamps > 0 {
            self.scheduler.request();
        }
    }
    /// The pointer left the canvas. Paint so far stays, but nothing is committed until the gesture
    /// formally ends.
    pub fn pointer_leave(&mut self) {
        if let Gesture::Drawing { suspended, .. } = &mut self.gesture {
            log::trace!("Stroke suspended");
            *suspended = true;
        }
    }
    /// End the stroke, committing it as one undo step. Returns whether a stroke was open.
    pub fn pointer_up(&mut self) -> bool {
        self.end_gesture()
    }
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, Gesture::Drawing { .. })
    }
    fn end_gesture(&mut self) -> bool {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => false,
            Gesture::Drawing { staged, .. } => {
                self.renderer.finish();
                self.history.push(staged);
                true
            }
        }
    }

    /// Render a complete stroke onto the active layer as one undo step. Returns the stamp count.
    pub fn render_stroke(&mut self, points: &[PointerSample]) -> usize {
        self.end_gesture();
        if points.is_empty() {
            return 0;
        }
        let snapshot = self.history.snapshot(&self.document);
        let stamps = stroke::render_stroke(
            self.document.active_surface_mut(),
            points,
            self.brush,
            self.settings,
        );
        self.history.push(snapshot);
        self.scheduler.request();
        stamps
    }

    // ======== Layers ========
    /// Run a history-tracked document operation. `check` must accept exactly when `apply` succeeds.
    fn tracked<T>(
        &mut self,
        what: &str,
        check: impl FnOnce(&Document) -> Result<(), LayerError>,
        apply: impl FnOnce(&mut Document) -> Result<T, LayerError>,
    ) -> Result<T, LayerError> {
        self.end_gesture();
        if let Err(err) = check(&self.document) {
            log::warn!("Declined {what}: {err}");
            return Err(err);
        }
        let snapshot = self.history.snapshot(&self.document);
        let out = apply(&mut self.document)?;
        self.history.push(snapshot);
        self.scheduler.request();
        Ok(out)
    }
    pub fn add_layer(&mut self) -> Result<LayerID, LayerError> {
        self.tracked("add layer", Document::check_add, Document::add_layer)
    }
    pub fn delete_layer(&mut self, id: LayerID) -> Result<(), LayerError> {
        self.tracked(
            "delete layer",
            |doc| doc.check_delete(id),
            |doc| doc.delete_layer(id),
        )
    }
    pub fn duplicate_layer(&mut self, id: LayerID) -> Result<LayerID, LayerError> {
        self.tracked(
            "duplicate layer",
            |doc| doc.check_duplicate(id),
            |doc| doc.duplicate_layer(id),
        )
    }
    pub fn move_layer(&mut self, id: LayerID, to: usize) -> Result<(), LayerError> {
        self.tracked(
            "move layer",
            |doc| doc.check_move(id, to),
            |doc| doc.move_layer(id, to),
        )
    }
    pub fn toggle_visibility(&mut self, id: LayerID) -> Result<bool, LayerError> {
        self.tracked(
            "toggle visibility",
            |doc| doc.check_layer(id),
            |doc| doc.toggle_visibility(id),
        )
    }
    pub fn set_opacity(&mut self, id: LayerID, opacity: f32) -> Result<(), LayerError> {
        self.tracked(
            "set opacity",
            |doc| {
                doc.check_layer(id)?;
                Document::check_opacity(opacity)
            },
            |doc| doc.set_opacity(id, opacity),
        )
    }
    pub fn set_blend_mode(&mut self, id: LayerID, mode: BlendMode) -> Result<(), LayerError> {
        self.tracked(
            "set blend mode",
            |doc| doc.check_layer(id),
            |doc| doc.set_blend_mode(id, mode),
        )
    }
    pub fn rename_layer(&mut self, id: LayerID, name: &str) -> Result<(), LayerError> {
        self.tracked(
            "rename layer",
            |doc| doc.check_layer(id),
            |doc| doc.rename(id, name),
        )
    }
    /// Choose the layer strokes and fills apply to. Not recorded in history.
    pub fn set_active_layer(&mut self, id: LayerID) -> Result<(), LayerError> {
        self.end_gesture();
        self.document.set_active(id).inspect_err(|err| {
            log::warn!("Declined set active layer: {err}");
        })
    }

    // ======== History ========
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        self.end_gesture();
        match self.history.undo(&mut self.document) {
            Ok(()) => {
                self.scheduler.request();
                Ok(())
            }
            Err(err) => {
                log::warn!("Declined undo: {err}");
                Err(err)
            }
        }
    }
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        self.end_gesture();
        match self.history.redo(&mut self.document) {
            Ok(()) => {
                self.scheduler.request();
                Ok(())
            }
            Err(err) => {
                log::warn!("Declined redo: {err}");
                Err(err)
            }
        }
    }

    // ======== Fill ========
    /// Bucket fill the active layer, returning the filled pixel count. Out of bounds seeds, and
    /// seeds already the fill color, do nothing and record no history.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: Color, tolerance: u32) -> usize {
        self.end_gesture();
        match self.document.active_layer().surface().get(x, y) {
            None => {
                log::warn!("Declined fill: ({x}, {y}) out of bounds");
                return 0;
            }
            Some(seed) if seed == color => return 0,
            Some(_) => (),
        }
        let snapshot = self.history.snapshot(&self.document);
        let filled = fill::flood_fill(self.document.active_surface_mut(), x, y, color, tolerance);
        self.history.push(snapshot);
        self.scheduler.request();
        filled
    }

    // ======== Texture ========
    pub fn set_texture(&mut self, texture: TextureId, intensity: f32) {
        self.document.set_texture(texture, intensity);
        self.scheduler.request();
    }
    /// Reseed the active texture. The cached tile is regenerated on next use.
    pub fn set_texture_seed(&mut self, seed: u32) {
        self.document.texture.seed = seed;
        self.scheduler.request();
    }

    // ======== Output ========
    /// Composite for display, synchronously.
    #[must_use]
    pub fn composite(&mut self) -> RasterSurface {
        composite(&self.document, &mut self.textures, Target::Display)
    }
    /// Full-resolution composite for handing out of the engine. Transparent backgrounds stay
    /// transparent.
    #[must_use]
    pub fn export_flattened(&mut self) -> RasterSurface {
        log::info!("Exporting {}x{}", self.config.width, self.config.height);
        composite(&self.document, &mut self.textures, Target::Export)
    }
    /// Mark the display stale without mutating anything.
    pub fn request_composite(&mut self) {
        self.scheduler.request();
    }
    /// Drive the frame scheduler. See [`FrameScheduler::on_frame`].
    pub fn on_frame(&mut self) -> Option<&RasterSurface> {
        self.scheduler.on_frame(&self.document, &mut self.textures)
    }
    /// Eyedropper over the displayed image.
    pub fn sample_color(&mut self, x: i32, y: i32) -> Option<Color> {
        self.scheduler
            .current(&self.document, &mut self.textures)
            .get(x, y)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn engine() -> Engine {
        Engine::new(EngineConfig {
            width: 64,
            height: 64,
            ..EngineConfig::default()
        })
    }
    fn diagonal() -> Vec<PointerSample> {
        (0..8u8)
            .map(|i| {
                let t = f32::from(i) * 7.0;
                PointerSample::new(4.0 + t, 6.0 + t * 0.8, 0.5 + f32::from(i) * 0.05)
            })
            .collect()
    }

    #[test]
    fn strokes_then_undos_restore_composite() {
        use strum::IntoEnumIterator;
        let mut engine = engine();
        let before = engine.composite();
        let brushes: Vec<_> = BrushKind::iter().filter(|b| !b.is_eraser()).collect();
        for &brush in &brushes {
            engine.set_brush(brush);
            engine.render_stroke(&diagonal());
        }
        assert_ne!(engine.composite().pixels(), before.pixels());
        for _ in &brushes {
            engine.undo().unwrap();
        }
        assert_eq!(engine.composite().pixels(), before.pixels());
    }
    #[test]
    fn redo_is_exact() {
        let mut engine = engine();
        engine.set_brush(BrushKind::Watercolor);
        engine.render_stroke(&diagonal());
        let after = engine.export_flattened();
        engine.undo().unwrap();
        engine.redo().unwrap();
        assert_eq!(engine.export_flattened().as_bytes(), after.as_bytes());
    }
    #[test]
    fn gesture_is_one_undo_step() {
        let mut engine = engine();
        let mut samples = diagonal().into_iter();
        engine.pointer_down(samples.next().unwrap());
        for sample in samples {
            engine.pointer_move(sample);
        }
        assert!(engine.is_drawing());
        assert_eq!(engine.history().undo_len(), 0);
        assert!(engine.pointer_up());
        assert!(!engine.pointer_up());
        assert_eq!(engine.history().undo_len(), 1);
    }
    #[test]
    fn leave_suspends_without_commit() {
        let mut engine = engine();
        engine.pointer_down(PointerSample::new(10.0, 10.0, 1.0));
        engine.pointer_move(PointerSample::new(20.0, 10.0, 1.0));
        engine.pointer_leave();
        let painted = engine.document().active_layer().surface().pixels().to_vec();
        engine.pointer_move(PointerSample::new(40.0, 40.0, 1.0));
        // Paint kept, nothing further painted, nothing committed.
        assert_eq!(engine.document().active_layer().surface().pixels(), painted.as_slice());
        assert!(painted.iter().any(|p| p.a > 0));
        assert_eq!(engine.history().undo_len(), 0);
        engine.pointer_up();
        assert_eq!(engine.history().undo_len(), 1);
    }
    #[test]
    fn tracked_op_ends_gesture() {
        let mut engine = engine();
        engine.pointer_down(PointerSample::new(10.0, 10.0, 1.0));
        engine.add_layer().unwrap();
        assert!(!engine.is_drawing());
        assert_eq!(engine.history().undo_len(), 2);
        // Undo the add, then the stroke.
        engine.undo().unwrap();
        assert_eq!(engine.document().layers().len(), 1);
        engine.undo().unwrap();
        assert!(engine
            .document()
            .active_layer()
            .surface()
            .pixels()
            .iter()
            .all(|p| p.a == 0));
    }
    #[test]
    fn declined_ops_record_nothing() {
        let mut engine = engine();
        let only = engine.document().active();
        assert_eq!(engine.delete_layer(only), Err(LayerError::LastLayer));
        assert_eq!(engine.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(engine.redo(), Err(HistoryError::NothingToRedo));
        assert_eq!(engine.flood_fill(64, 0, Color::BLACK, 0), 0);
        for _ in 1..engine.config().max_layers {
            engine.add_layer().unwrap();
        }
        let len = engine.history().undo_len();
        assert_eq!(
            engine.add_layer(),
            Err(LayerError::LayerLimit(engine.config().max_layers))
        );
        assert_eq!(engine.history().undo_len(), len);
    }
    #[test]
    fn fill_noop_records_nothing() {
        let mut engine = engine();
        assert_eq!(engine.flood_fill(0, 0, Color::rgb(255, 0, 0), 0), 64 * 64);
        assert_eq!(engine.history().undo_len(), 1);
        assert_eq!(engine.flood_fill(0, 0, Color::rgb(255, 0, 0), 0), 0);
        assert_eq!(engine.history().undo_len(), 1);
        assert!(engine
            .export_flattened()
            .pixels()
            .iter()
            .all(|&p| p == Color::rgb(255, 0, 0)));
    }
    #[test]
    fn eraser_clears_opaque_layer() {
        let mut engine = engine();
        engine.flood_fill(0, 0, Color::rgb(0, 0, 255), 0);
        engine.set_brush(BrushKind::Eraser);
        engine.set_brush_settings(BrushSettings {
            size: 10.0,
            ..BrushKind::Eraser.default_settings()
        });
        engine.render_stroke(&[PointerSample::new(32.0, 32.0, 1.0)]);
        let layer = engine.document().active_layer().surface();
        assert_eq!(layer.get(32, 32).map(|c| c.a), Some(0));
    }
    #[test]
    fn export_keeps_transparency() {
        let mut engine = engine();
        engine.init_document(Background::Transparent);
        assert!(engine.export_flattened().pixels().iter().all(|p| p.a == 0));
        assert!(engine.composite().pixels().iter().all(|p| p.a == 255));
    }
    #[test]
    fn one_composite_per_frame() {
        let mut engine = engine();
        assert!(engine.on_frame().is_some());
        assert!(engine.on_frame().is_none());
        engine.render_stroke(&diagonal());
        engine.add_layer().unwrap();
        engine.set_texture(TextureId::Canvas, 0.3);
        assert!(engine.on_frame().is_some());
        assert!(engine.on_frame().is_none());
        assert_eq!(engine.scheduler().stats().composites, 2);
    }
    #[test]
    fn eyedropper() {
        let mut engine = engine();
        engine.set_color(Color::rgb(0, 128, 0));
        engine.render_stroke(&[PointerSample::new(32.0, 32.0, 1.0)]);
        assert_eq!(engine.sample_color(32, 32), Some(Color::rgb(0, 128, 0)));
        assert_eq!(engine.sample_color(0, 0), Some(Color::WHITE));
        assert_eq!(engine.sample_color(-1, 0), None);
    }
    #[test]
    fn brush_switch_keeps_color() {
        let mut engine = engine();
        engine.set_color(Color::rgb(1, 2, 3));
        engine.set_brush(BrushKind::Charcoal);
        assert_eq!(engine.brush_settings().color, Color::rgb(1, 2, 3));
        assert_eq!(
            engine.brush_settings().size,
            BrushKind::Charcoal.default_settings().size
        );
    }
}
