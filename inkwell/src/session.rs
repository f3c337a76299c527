//! # Sessions
//!
//! A recorded stream of host input, replayed against the engine in place of a live UI. Stored as
//! toml, one `[[event]]` table per input, tagged by `type`:
//!
//! ```toml
//! [[event]]
//! type = "pointer_down"
//! time_ms = 0
//! x = 10.0
//! y = 12.5
//! pressure = 0.8
//!
//! [[event]]
//! type = "key"
//! time_ms = 120
//! chord = "ctrl+KeyZ"
//! ```
//!
//! Events must be in non-decreasing time order.

use inkwell_core::{
    blend::BlendMode,
    brush::BrushKind,
    noise::TextureId,
    stroke::{Microseconds, PointerSample},
    Color,
};

use crate::{actions::KeyboardHotkey, named::Named};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("reading session: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing session: {0}")]
    Parse(#[from] toml::de::Error),
    /// Event `index` happens before the one preceding it.
    #[error("event {index} at {time_ms}ms is out of order")]
    OutOfOrder { index: usize, time_ms: f64 },
    #[error("event {index} has a non-finite time")]
    BadTime { index: usize },
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    #[serde(default = "full_pressure")]
    pub pressure: f32,
}
fn full_pressure() -> f32 {
    1.0
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PointerDown(Pointer),
    PointerMove(Pointer),
    PointerUp,
    PointerLeave,
    /// A keyboard chord, dispatched through the hotkey bindings.
    Key { chord: KeyboardHotkey },
    /// Select a brush. Unset fields keep the brush's defaults, color is kept from the previous brush.
    Brush {
        kind: Named<BrushKind>,
        size: Option<f32>,
        opacity: Option<f32>,
        hardness: Option<f32>,
        color: Option<Named<Color>>,
    },
    Texture {
        kind: Named<TextureId>,
        #[serde(default = "half")]
        intensity: f32,
        seed: Option<u32>,
    },
    Fill {
        x: i32,
        y: i32,
        color: Named<Color>,
        #[serde(default)]
        tolerance: u32,
    },
    /// Blend mode and opacity of the active layer.
    Blend {
        mode: Named<BlendMode>,
        opacity: Option<f32>,
    },
    /// Eyedropper, the sampled color becomes the brush color.
    Pick { x: i32, y: i32 },
}
fn half() -> f32 {
    0.5
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct TimedEvent {
    /// Milliseconds since the start of the session.
    pub time_ms: f64,
    #[serde(flatten)]
    pub event: Event,
}
impl TimedEvent {
    /// Validated finite and non-negative on load.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn time(&self) -> Microseconds {
        Microseconds((self.time_ms * 1000.0) as u64)
    }
    /// The pointer sample carried by this event, if any.
    #[must_use]
    pub fn sample(&self) -> Option<PointerSample> {
        match self.event {
            Event::PointerDown(p) | Event::PointerMove(p) => {
                Some(PointerSample::new(p.x, p.y, p.pressure).at(self.time()))
            }
            _ => None,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Default)]
pub struct Session {
    #[serde(default, rename = "event")]
    pub events: Vec<TimedEvent>,
}
impl Session {
    pub fn load(path: &std::path::Path) -> Result<Self, SessionError> {
        let string = std::fs::read_to_string(path)?;
        string.parse()
    }
    /// Length of the session, ms.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.events.last().map_or(0.0, |event| event.time_ms)
    }
    fn validate(&self) -> Result<(), SessionError> {
        let mut last = 0.0;
        for (index, event) in self.events.iter().enumerate() {
            if !event.time_ms.is_finite() {
                return Err(SessionError::BadTime { index });
            }
            if event.time_ms < last {
                return Err(SessionError::OutOfOrder {
                    index,
                    time_ms: event.time_ms,
                });
            }
            last = event.time_ms;
        }
        Ok(())
    }
}
impl std::str::FromStr for Session {
    type Err = SessionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let session: Self = toml::from_str(s)?;
        session.validate()?;
        Ok(session)
    }
}
