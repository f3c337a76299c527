//! Drives an [`Engine`] from a recorded [`Session`] the way a live host would, with a simulated
//! display loop ticking the frame scheduler at a fixed interval between events.

use inkwell_core::{raster::RasterSurface, Engine};

use crate::{
    actions::{Action, KeysToActions},
    session::{Event, Session, TimedEvent},
};

#[derive(Default)]
pub struct Outcome {
    /// Display frames ticked.
    pub frames: u64,
    /// Frames on which a composite actually ran.
    pub presented: u64,
    /// Operations the engine turned down.
    pub declined: usize,
    /// Images from [`Action::Export`], in order.
    pub exports: Vec<RasterSurface>,
}

pub struct Replay<'a> {
    engine: &'a mut Engine,
    keys: &'a KeysToActions,
    frame_interval_ms: f64,
    next_frame_ms: f64,
    outcome: Outcome,
}
impl<'a> Replay<'a> {
    #[must_use]
    pub fn new(engine: &'a mut Engine, keys: &'a KeysToActions, frame_interval_ms: u32) -> Self {
        let frame_interval_ms = f64::from(frame_interval_ms.max(1));
        Self {
            engine,
            keys,
            frame_interval_ms,
            next_frame_ms: frame_interval_ms,
            outcome: Outcome::default(),
        }
    }
    /// Play every event, then one last frame so the display reflects the final state.
    pub fn run(mut self, session: &Session) -> Outcome {
        for event in &session.events {
            self.advance_to(event.time_ms);
            self.apply(event);
        }
        self.tick();
        log::info!(
            "Replayed {} events over {} frames, {} presented, {} declined",
            session.events.len(),
            self.outcome.frames,
            self.outcome.presented,
            self.outcome.declined
        );
        self.outcome
    }
    /// Tick every frame boundary at or before `time_ms`.
    fn advance_to(&mut self, time_ms: f64) {
        while time_ms >= self.next_frame_ms {
            self.tick();
            self.next_frame_ms += self.frame_interval_ms;
        }
    }
    fn tick(&mut self) {
        self.outcome.frames += 1;
        if self.engine.on_frame().is_some() {
            self.outcome.presented += 1;
        }
    }
    fn decline_if<T, E>(&mut self, result: Result<T, E>) {
        // The engine has already logged why.
        if result.is_err() {
            self.outcome.declined += 1;
        }
    }
    fn apply(&mut self, timed: &TimedEvent) {
        log::trace!("{:>8.1}ms {:?}", timed.time_ms, timed.event);
        match &timed.event {
            Event::PointerDown(_) => {
                if let Some(sample) = timed.sample() {
                    self.engine.pointer_down(sample);
                }
            }
            Event::PointerMove(_) => {
                if let Some(sample) = timed.sample() {
                    self.engine.pointer_move(sample);
                }
            }
            Event::PointerUp => {
                self.engine.pointer_up();
            }
            Event::PointerLeave => self.engine.pointer_leave(),
            Event::Key { chord } => match self.keys.action_of(chord) {
                Some(action) => self.perform(action),
                None => log::debug!("Unbound chord {chord}"),
            },
            Event::Brush {
                kind,
                size,
                opacity,
                hardness,
                color,
            } => {
                self.engine.set_brush(kind.0);
                let mut settings = *self.engine.brush_settings();
                settings.size = size.unwrap_or(settings.size);
                settings.opacity = opacity.unwrap_or(settings.opacity);
                settings.hardness = hardness.unwrap_or(settings.hardness);
                if let Some(color) = color {
                    settings.color = color.0;
                }
                self.engine.set_brush_settings(settings);
            }
            Event::Texture {
                kind,
                intensity,
                seed,
            } => {
                self.engine.set_texture(kind.0, *intensity);
                if let Some(seed) = seed {
                    self.engine.set_texture_seed(*seed);
                }
            }
            Event::Fill {
                x,
                y,
                color,
                tolerance,
            } => {
                let filled = self.engine.flood_fill(*x, *y, color.0, *tolerance);
                log::debug!("Filled {filled} pixels");
            }
            Event::Blend { mode, opacity } => {
                let active = self.engine.document().active();
                let result = self.engine.set_blend_mode(active, mode.0);
                self.decline_if(result);
                if let Some(opacity) = opacity {
                    let result = self.engine.set_opacity(active, *opacity);
                    self.decline_if(result);
                }
            }
            Event::Pick { x, y } => match self.engine.sample_color(*x, *y) {
                Some(color) => self.engine.set_color(color),
                None => {
                    log::warn!("Eyedropper at ({x}, {y}) is off the canvas");
                    self.outcome.declined += 1;
                }
            },
        }
    }
    fn perform(&mut self, action: Action) {
        log::debug!("Action {}", action.as_ref());
        let active = self.engine.document().active();
        match action {
            Action::Undo => {
                let result = self.engine.undo();
                self.decline_if(result);
            }
            Action::Redo => {
                let result = self.engine.redo();
                self.decline_if(result);
            }
            Action::AddLayer => {
                let result = self.engine.add_layer();
                self.decline_if(result);
            }
            Action::DeleteLayer => {
                let result = self.engine.delete_layer(active);
                self.decline_if(result);
            }
            Action::DuplicateLayer => {
                let result = self.engine.duplicate_layer(active);
                self.decline_if(result);
            }
            Action::ToggleVisibility => {
                let result = self.engine.toggle_visibility(active);
                self.decline_if(result);
            }
            Action::Export => {
                let image = self.engine.export_flattened();
                self.outcome.exports.push(image);
            }
        }
    }
}
