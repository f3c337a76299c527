use inkwell_core::{
    brush::{BrushKind, BrushSettings},
    document::Background,
    noise::TextureId,
    Color, Engine, EngineConfig,
};

use crate::{
    actions::{ActionsToKeys, KeysToActions},
    named::Named,
};

const DOCUMENTATION: &str = r##"# Inkwell settings. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys and values are case sensitive.

# Colors are written "#rgb", "#rrggbb", or "#rrggbbaa". The canvas background may also be "transparent".
# Brush kinds: pencil, ink_pen, ballpoint, flat_brush, round_brush, watercolor, oil_brush, charcoal, airbrush, eraser.
# Textures: none, smooth_paper, rough_paper, canvas.

# Keyboard hotkeys, listed under [hotkeys] by action, are case-sensitive and written `[ctrl+][alt+][shift+]<key code>`.
# Each action may have many hotkeys associated with it, but each hotkey should only be used at most once.

# Examples:
# [hotkeys]
# Undo = ["ctrl+KeyZ"]
# Redo = ["ctrl+KeyY", "ctrl+shift+KeyZ"]

"##;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

/// A [`Background`] by name, `"transparent"` or a color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct CanvasBackground(pub Background);
impl std::fmt::Display for CanvasBackground {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Background::Transparent => f.write_str("transparent"),
            Background::Solid(color) => std::fmt::Display::fmt(&color, f),
        }
    }
}
impl std::str::FromStr for CanvasBackground {
    type Err = inkwell_core::color::ColorParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "transparent" {
            Ok(Self(Background::Transparent))
        } else {
            s.parse().map(|color| Self(Background::Solid(color)))
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background: Named<CanvasBackground>,
}
impl Default for Canvas {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            width: config.width,
            height: config.height,
            background: Named::default(),
        }
    }
}

/// Brush selected at startup. Unset values take the brush's own defaults.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BrushDefaults {
    pub kind: Named<BrushKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    pub color: Named<Color>,
}
impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            kind: Named::default(),
            size: None,
            opacity: None,
            color: Named(Color::BLACK),
        }
    }
}
impl BrushDefaults {
    #[must_use]
    pub fn settings(&self) -> BrushSettings {
        let defaults = self.kind.0.default_settings();
        BrushSettings {
            size: self.size.unwrap_or(defaults.size),
            opacity: self.opacity.unwrap_or(defaults.opacity),
            color: self.color.0,
            ..defaults
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TextureDefaults {
    pub kind: Named<TextureId>,
    pub intensity: f32,
    pub seed: u32,
}
impl Default for TextureDefaults {
    fn default() -> Self {
        let defaults = inkwell_core::noise::TextureSettings::default();
        Self {
            kind: Named(defaults.texture),
            intensity: defaults.intensity,
            seed: defaults.seed,
        }
    }
}

/// The on-disk form of [`Settings`].
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Preferences {
    /// Simulated display refresh period.
    pub frame_interval_ms: u32,
    pub canvas: Canvas,
    pub brush: BrushDefaults,
    pub texture: TextureDefaults,
    pub hotkeys: ActionsToKeys,
}
impl Default for Preferences {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            canvas: Canvas::default(),
            brush: BrushDefaults::default(),
            texture: TextureDefaults::default(),
            hotkeys: ActionsToKeys::default(),
        }
    }
}

pub struct Settings {
    failed_to_load: bool,
    pub preferences: Preferences,
    pub keys_to_actions: KeysToActions,
}
impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Settings saved in user preferences, or defaulted if unavailable for some reason.
    #[must_use]
    pub fn load() -> Self {
        match Self::file_path() {
            None => Self::no_path(),
            Some(path) => Self::load_or_default(&path),
        }
    }
    #[must_use]
    pub fn file_path() -> Option<std::path::PathBuf> {
        let mut dir = preferences_dir()?;
        dir.push(Self::FILENAME);
        Some(dir)
    }
    /// Whether a settings file is present, loadable or not.
    #[must_use]
    pub fn file_exists() -> bool {
        Self::file_path().is_some_and(|path| path.exists())
    }
    #[must_use]
    pub fn no_path() -> Self {
        log::warn!("Settings weren't available, defaulting.");
        let preferences = Preferences::default();
        Self {
            failed_to_load: true,
            keys_to_actions: default_keys(&preferences.hotkeys),
            preferences,
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let loaded: anyhow::Result<(Preferences, KeysToActions)> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let preferences: Preferences = toml::from_str(&string)?;
            let keys_to_actions: KeysToActions = (&preferences.hotkeys).try_into()?;

            Ok((preferences, keys_to_actions))
        };

        match loaded {
            Ok((preferences, keys_to_actions)) => Self {
                failed_to_load: false,
                preferences,
                keys_to_actions,
            },
            Err(e) => {
                log::warn!("Failed to load {}: {e}", path.display());
                Self::no_path()
            }
        }
    }
    /// Return true if loading user's settings failed, in which case they're defaulted.
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            width: self.preferences.canvas.width,
            height: self.preferences.canvas.height,
            ..EngineConfig::default()
        }
    }
    /// A fresh engine with the configured document, brush, and texture selected.
    #[must_use]
    pub fn engine(&self) -> Engine {
        let preferences = &self.preferences;
        let mut engine = Engine::new(self.engine_config());
        engine.init_document(preferences.canvas.background.0 .0);
        engine.set_brush(preferences.brush.kind.0);
        engine.set_brush_settings(preferences.brush.settings());
        engine.set_texture(preferences.texture.kind.0, preferences.texture.intensity);
        engine.set_texture_seed(preferences.texture.seed);
        engine
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let string = DOCUMENTATION.to_owned() + &self.to_toml()?;
        std::fs::write(preferences, string)?;
        Ok(())
    }
    fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::ser::to_string_pretty(&self.preferences)?)
    }
}

/// The default action map is reversible, this is asserted by its `Default` impl when debugging.
/// A user map that isn't falls back to no bindings at all.
fn default_keys(hotkeys: &ActionsToKeys) -> KeysToActions {
    match hotkeys.try_into() {
        Ok(keys) => keys,
        Err(e) => {
            log::error!("{e}");
            KeysToActions::empty()
        }
    }
}
