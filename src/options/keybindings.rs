use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::KeyAction;

/// Serialized shape of [`KeybindingOptions`]; the reverse map is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct KeybindingTable {
    bindings: HashMap<KeyAction, String>,
}

impl Default for KeybindingTable {
    fn default() -> Self {
        Self {
            bindings: HashMap::from([
                (KeyAction::MoveForward, "w".into()),
                (KeyAction::MoveBackward, "s".into()),
                (KeyAction::MoveLeft, "a".into()),
                (KeyAction::MoveRight, "d".into()),
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "KeybindingTable", into = "KeybindingTable")]
/// Configurable keyboard bindings mapping actions to logical key strings.
///
/// Keys are matched case-sensitively against the logical key the host
/// reports (`"w"`, not `"KeyW"`), so a shifted `"W"` is a different key.
pub struct KeybindingOptions {
    /// Maps action → key string (e.g. `MoveForward` → `"w"`).
    pub bindings: HashMap<KeyAction, String>,
    key_to_action: HashMap<String, KeyAction>,
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        Self::from(KeybindingTable::default())
    }
}

impl From<KeybindingTable> for KeybindingOptions {
    fn from(table: KeybindingTable) -> Self {
        let mut opts = Self {
            bindings: table.bindings,
            key_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl From<KeybindingOptions> for KeybindingTable {
    fn from(opts: KeybindingOptions) -> Self {
        Self {
            bindings: opts.bindings,
        }
    }
}

impl KeybindingOptions {
    /// Rebuild the reverse lookup map (key string → action).
    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            let _ = self.key_to_action.insert(key.clone(), *action);
        }
    }

    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.key_to_action.get(key).copied()
    }
}
