//! Host actions and their keyboard bindings.
//!
//! Actions can have potentially many hotkeys bound to them, and hotkeys can be bound to at most one
//! action. For disk storage the one-to-many relation of actions to keys is easier to edit by hand, so
//! that's what is saved. The reverse many-to-one mapping of keys to actions is built on load.

#[derive(
    strum::AsRefStr,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Debug,
)]
pub enum Action {
    Undo,
    Redo,
    AddLayer,
    DeleteLayer,
    DuplicateLayer,
    ToggleVisibility,
    Export,
}

#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct KeyboardHotkey {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Physical key name, e.g. `KeyZ`.
    pub key: String,
}
impl serde::Serialize for KeyboardHotkey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Human-readable string form, rather than a table per key.
        serializer.collect_str(self)
    }
}
impl<'de> serde::Deserialize<'de> for KeyboardHotkey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str =
            <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        str.parse().map_err(serde::de::Error::custom)
    }
}
impl KeyboardHotkey {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            key: key.to_owned(),
        }
    }
    #[must_use]
    pub fn ctrl(self) -> Self {
        Self { ctrl: true, ..self }
    }
    #[must_use]
    pub fn shift(self) -> Self {
        Self {
            shift: true,
            ..self
        }
    }
}
/// Formatted as `[ctrl+][alt+][shift+]<key name>`, parseable by [`std::str::FromStr`].
impl std::fmt::Display for KeyboardHotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (held, name) in [(self.ctrl, "ctrl+"), (self.alt, "alt+"), (self.shift, "shift+")] {
            if held {
                f.write_str(name)?;
            }
        }
        f.write_str(&self.key)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyboardHotkeyFromStrError {
    #[error("missing key name")]
    MissingKey,
    #[error("unrecognized key name {0:?}")]
    InvalidKeyName(String),
}
/// Parse from syntax `[ctrl+][alt+][shift+]<key name>`, case-sensitive.
impl std::str::FromStr for KeyboardHotkey {
    type Err = KeyboardHotkeyFromStrError;
    fn from_str(mut str: &str) -> Result<Self, Self::Err> {
        let mut take_if_has = |prefix: &str| -> bool {
            if let Some(new_str) = str.strip_prefix(prefix) {
                str = new_str;
                true
            } else {
                false
            }
        };
        let ctrl = take_if_has("ctrl+");
        let alt = take_if_has("alt+");
        let shift = take_if_has("shift+");
        // str now contains only the key name.
        if str.is_empty() {
            return Err(KeyboardHotkeyFromStrError::MissingKey);
        }
        if !str.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(KeyboardHotkeyFromStrError::InvalidKeyName(str.to_owned()));
        }
        Ok(Self {
            ctrl,
            alt,
            shift,
            key: str.to_owned(),
        })
    }
}

/// Maps each action onto potentially many hotkeys.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionsToKeys(hashbrown::HashMap<Action, Vec<KeyboardHotkey>>);
impl Default for ActionsToKeys {
    fn default() -> Self {
        let defaults = [
            (Action::Undo, vec![KeyboardHotkey::new("KeyZ").ctrl()]),
            (
                Action::Redo,
                vec![
                    KeyboardHotkey::new("KeyY").ctrl(),
                    KeyboardHotkey::new("KeyZ").ctrl().shift(),
                ],
            ),
            (Action::AddLayer, vec![KeyboardHotkey::new("KeyN").ctrl().shift()]),
            (Action::DeleteLayer, vec![KeyboardHotkey::new("Delete")]),
            (Action::DuplicateLayer, vec![KeyboardHotkey::new("KeyJ").ctrl()]),
            (Action::ToggleVisibility, vec![KeyboardHotkey::new("KeyH")]),
            (Action::Export, vec![KeyboardHotkey::new("KeyE").ctrl()]),
        ];
        let new = Self(defaults.into_iter().collect());
        // Make sure we didn't accidentally bind a single key twice.
        debug_assert!(TryInto::<KeysToActions>::try_into(&new).is_ok());
        new
    }
}

/// Derived from [`ActionsToKeys`], maps each hotkey onto at most one action.
#[derive(Debug)]
pub struct KeysToActions(hashbrown::HashMap<KeyboardHotkey, Action>);
#[derive(thiserror::Error, Debug)]
pub enum KeysToActionsError {
    /// A single key was bound to multiple actions.
    /// Only the first two encountered (in arbitrary order) are reported.
    #[error("hotkey {key} used for more than one action: {actions:?}")]
    DuplicateBinding {
        key: KeyboardHotkey,
        actions: [Action; 2],
    },
}
impl TryFrom<&ActionsToKeys> for KeysToActions {
    type Error = KeysToActionsError;
    fn try_from(value: &ActionsToKeys) -> Result<Self, Self::Error> {
        let mut new = KeysToActions(hashbrown::HashMap::default());
        for (action, keys) in &value.0 {
            for key in keys {
                if let Some(old) = new.0.insert(key.clone(), *action) {
                    return Err(KeysToActionsError::DuplicateBinding {
                        key: key.clone(),
                        actions: [*action, old],
                    });
                }
            }
        }
        Ok(new)
    }
}
impl KeysToActions {
    /// No bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self(hashbrown::HashMap::default())
    }
    #[must_use]
    pub fn action_of(&self, key: &KeyboardHotkey) -> Option<Action> {
        self.0.get(key).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hotkey_syntax() {
        let key: KeyboardHotkey = "ctrl+shift+KeyZ".parse().unwrap();
        assert_eq!(key, KeyboardHotkey::new("KeyZ").ctrl().shift());
        assert_eq!(key.to_string(), "ctrl+shift+KeyZ");
        assert_eq!(
            "ctrl+".parse::<KeyboardHotkey>(),
            Err(KeyboardHotkeyFromStrError::MissingKey)
        );
        // Modifiers are in a fixed order.
        assert!("shift+ctrl+KeyZ".parse::<KeyboardHotkey>().is_err());
    }
    #[test]
    fn defaults_reversible() {
        let keys = KeysToActions::try_from(&ActionsToKeys::default()).unwrap();
        assert_eq!(
            keys.action_of(&KeyboardHotkey::new("KeyZ").ctrl()),
            Some(Action::Undo)
        );
        assert_eq!(
            keys.action_of(&KeyboardHotkey::new("KeyZ").ctrl().shift()),
            Some(Action::Redo)
        );
        assert_eq!(keys.action_of(&KeyboardHotkey::new("KeyZ")), None);
    }
    #[test]
    fn duplicate_rejected() {
        let mut map = ActionsToKeys::default();
        map.0
            .insert(Action::Export, vec![KeyboardHotkey::new("KeyZ").ctrl()]);
        assert!(matches!(
            KeysToActions::try_from(&map),
            Err(KeysToActionsError::DuplicateBinding { .. })
        ));
    }
}
