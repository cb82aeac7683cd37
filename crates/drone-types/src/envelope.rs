//! Action envelopes
//!
//! The daemon expects lifecycle requests wrapped in a single-key object whose
//! key names the action, e.g. `{"stop": {"name": "hello"}}`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Lifecycle action on a drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    Stop,
    Restart,
    Update,
    Clean,
}

impl Action {
    /// Wire name, used both as envelope key and as the last path segment
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Restart => "restart",
            Action::Update => "update",
            Action::Clean => "clean",
        }
    }

    /// Past tense used in command output
    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::Start => "started",
            Action::Stop => "stopped",
            Action::Restart => "restarted",
            Action::Update => "updated",
            Action::Clean => "cleaned",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a drone by name only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

impl NameRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Request body of the form `{ "<action>": payload }`
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    action: Action,
    payload: T,
}

impl<T> Envelope<T> {
    pub fn new(action: Action, payload: T) -> Self {
        Self { action, payload }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.action.as_str(), &self.payload)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::AppConfig;
    use serde_json::json;

    #[test]
    fn test_stop_envelope_shape() {
        let body = Envelope::new(Action::Stop, NameRef::new("hello"));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "stop": { "name": "hello" } })
        );
    }

    #[test]
    fn test_start_envelope_carries_manifest() {
        let mut config = AppConfig::new("hello");
        config.user = Some("marak".into());

        let body = Envelope::new(Action::Start, &config);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["start"]["name"], "hello");
        assert_eq!(value["start"]["user"], "marak");
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::Restart.to_string(), "restart");
        assert_eq!(Action::Clean.past_tense(), "cleaned");
    }
}
