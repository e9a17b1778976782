//! Core types for the state machine: callback kinds, transition policies,
//! machine configuration, and event-name synthesis.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Lifecycle callback kinds a sub-state can respond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackKind {
    /// Fired when a sub-state is entered. May suspend (listeners can
    /// defer routines).
    Enter,
    /// Fired when a sub-state is left. May suspend.
    Exit,
    /// Fired after Exit completes, and unconditionally when a transition
    /// is abandoned. Never suspends.
    Finally,
    /// Per-frame callback.
    Update,
    /// Per-frame callback, after Update.
    LateUpdate,
    /// Fixed-timestep callback.
    FixedUpdate,
}

impl CallbackKind {
    /// Returns all callback kind variants.
    #[must_use]
    pub fn all() -> &'static [CallbackKind] {
        &[
            Self::Enter,
            Self::Exit,
            Self::Finally,
            Self::Update,
            Self::LateUpdate,
            Self::FixedUpdate,
        ]
    }

    /// Whether this kind is delivered by the host's per-frame scheduler
    /// rather than by the transition engine.
    #[must_use]
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Update | Self::LateUpdate | Self::FixedUpdate)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Enter => 0,
            Self::Exit => 1,
            Self::Finally => 2,
            Self::Update => 3,
            Self::LateUpdate => 4,
            Self::FixedUpdate => 5,
        }
    }
}

impl std::fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enter => write!(f, "Enter"),
            Self::Exit => write!(f, "Exit"),
            Self::Finally => write!(f, "Finally"),
            Self::Update => write!(f, "Update"),
            Self::LateUpdate => write!(f, "LateUpdate"),
            Self::FixedUpdate => write!(f, "FixedUpdate"),
        }
    }
}

/// How a transition request interacts with an in-flight transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionPolicy {
    /// Never abort in-flight work. During the exit phase the newest
    /// request overrides the in-flight destination; during the enter
    /// phase the request waits for the transition to complete and then
    /// re-issues itself. The asymmetry is deliberate: enter logic may
    /// already have caused external side effects, so it is never aborted
    /// by a Safe request.
    #[default]
    Safe,
    /// Abandon any in-flight transition at its suspension point, fire
    /// Finally on the active state, and start fresh. The abandoned
    /// state's Exit does not fire.
    Overwrite,
}

/// Synthesize the dispatcher event name for a state callback.
///
/// Format: `<prefix>_<domain>_<subState>_<kind>`, four fields joined by
/// literal underscores. Embedded underscores in domain or sub-state names
/// are not escaped, so such names can collide with other combinations;
/// the format is kept verbatim for interop with recorded logs.
#[must_use]
pub fn event_name(prefix: &str, domain: &str, sub_state: &str, kind: CallbackKind) -> String {
    format!("{prefix}_{domain}_{sub_state}_{kind}")
}

/// State machine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineConfig {
    /// Prefix for synthesized callback event names.
    pub event_prefix: String,
    /// When set, Update/LateUpdate/FixedUpdate are delivered only while a
    /// transition is in flight. Hosts disagree on this gating, so it is
    /// an explicit option rather than a silent choice.
    pub periodic_only_in_transition: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            event_prefix: "FSM".to_string(),
            periodic_only_in_transition: false,
        }
    }
}

impl MachineConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::errors::FsmError;

    #[test]
    fn callback_kind_display_matches_wire_names() {
        assert_eq!(CallbackKind::Enter.to_string(), "Enter");
        assert_eq!(CallbackKind::Exit.to_string(), "Exit");
        assert_eq!(CallbackKind::Finally.to_string(), "Finally");
        assert_eq!(CallbackKind::Update.to_string(), "Update");
        assert_eq!(CallbackKind::LateUpdate.to_string(), "LateUpdate");
        assert_eq!(CallbackKind::FixedUpdate.to_string(), "FixedUpdate");
    }

    #[test]
    fn callback_kind_all_returns_six_variants() {
        assert_eq!(CallbackKind::all().len(), 6);
    }

    #[test]
    fn only_update_kinds_are_periodic() {
        assert!(CallbackKind::Update.is_periodic());
        assert!(CallbackKind::LateUpdate.is_periodic());
        assert!(CallbackKind::FixedUpdate.is_periodic());
        assert!(!CallbackKind::Enter.is_periodic());
        assert!(!CallbackKind::Exit.is_periodic());
        assert!(!CallbackKind::Finally.is_periodic());
    }

    #[test]
    fn indexes_are_distinct() {
        let mut seen = [false; 6];
        for kind in CallbackKind::all() {
            assert!(!seen[kind.index()]);
            seen[kind.index()] = true;
        }
    }

    #[test]
    fn event_name_joins_four_fields() {
        assert_eq!(
            event_name("FSM", "game", "Play", CallbackKind::Enter),
            "FSM_game_Play_Enter"
        );
    }

    #[test]
    fn event_name_does_not_escape_underscores() {
        // Known ambiguity, preserved verbatim.
        assert_eq!(
            event_name("FSM", "a_b", "c", CallbackKind::Exit),
            event_name("FSM", "a", "b_c", CallbackKind::Exit)
        );
    }

    #[test]
    fn default_policy_is_safe() {
        assert_eq!(TransitionPolicy::default(), TransitionPolicy::Safe);
    }

    #[test]
    fn default_config() {
        let config = MachineConfig::default();
        assert_eq!(config.event_prefix, "FSM");
        assert!(!config.periodic_only_in_transition);
    }

    #[test]
    fn config_deserializes_with_missing_fields() {
        let config: MachineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn config_deserializes_camel_case() {
        let config: MachineConfig = serde_json::from_str(
            r#"{"eventPrefix": "SM", "periodicOnlyInTransition": true}"#,
        )
        .unwrap();
        assert_eq!(config.event_prefix, "SM");
        assert!(config.periodic_only_in_transition);
    }

    #[test]
    fn config_loads_from_json_file() {
        let path = std::env::temp_dir().join("strand-fsm-config-test.json");
        std::fs::write(&path, r#"{"eventPrefix": "APP"}"#).unwrap();
        let config = MachineConfig::from_json_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.event_prefix, "APP");
        assert!(!config.periodic_only_in_transition);
    }

    #[test]
    fn config_load_fails_on_missing_file() {
        let err = MachineConfig::from_json_file("/nonexistent/strand.json").unwrap_err();
        assert_matches!(err, FsmError::ConfigIo(_));
    }

    #[test]
    fn config_load_fails_on_invalid_json() {
        let path = std::env::temp_dir().join("strand-fsm-bad-config-test.json");
        std::fs::write(&path, "not json").unwrap();
        let err = MachineConfig::from_json_file(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_matches!(err, FsmError::ConfigJson(_));
    }
}
