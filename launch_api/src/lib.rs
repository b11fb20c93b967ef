use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of envelope used in the JSON protocol.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Request,
    Response,
    #[default]
    Event,
}

/// Standard RPC style error object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// Top level envelope exchanged between the launcher and an editor front-end.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    pub fn request(id: impl Into<String>, method: impl Into<String>, params: Value) -> Self {
        Self {
            id: Some(id.into()),
            kind: Kind::Request,
            method: Some(method.into()),
            params: Some(params),
            ..Default::default()
        }
    }

    pub fn response(id: Option<String>, result: Value) -> Self {
        Self {
            id,
            kind: Kind::Response,
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn failure(id: Option<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            kind: Kind::Response,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
            ..Default::default()
        }
    }

    pub fn event(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: Kind::Event,
            topic: Some(topic.into()),
            payload: Some(payload),
            ..Default::default()
        }
    }
}

/// Settings for a single launch, using the editor's configuration key names.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    /// Entry file whose presence marks a launchable game directory.
    #[serde(rename = "main")]
    pub entry_file: String,
    /// Directory holding the engine executable.
    #[serde(rename = "path")]
    pub executable_dir: PathBuf,
    #[serde(rename = "execName")]
    pub executable_name: String,
    #[serde(rename = "maxInstances")]
    pub max_instances: u32,
    /// Kill tracked instances instead of refusing when at capacity.
    #[serde(rename = "overwrite")]
    pub overwrite_on_launch: bool,
    /// Pass `--console` to the engine (Windows only).
    #[serde(rename = "useConsoleSubsystem")]
    pub use_console_subsystem: bool,
    #[serde(rename = "saveAllOnLaunch")]
    pub save_all_before_launch: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            entry_file: "main.lua".into(),
            executable_dir: PathBuf::from("."),
            executable_name: "love".into(),
            max_instances: 1,
            overwrite_on_launch: false,
            use_console_subsystem: false,
            save_all_before_launch: false,
        }
    }
}

/// A directory boundary known to the editor, e.g. one workspace folder.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot {
    pub name: String,
    pub path: PathBuf,
}

impl WorkspaceRoot {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Parameters of a `launcher.launch` request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LaunchParams {
    #[serde(default)]
    pub active_file: Option<PathBuf>,
    #[serde(default)]
    pub roots: Vec<WorkspaceRoot>,
    /// Falls back to the session configuration when absent.
    #[serde(default)]
    pub config: Option<LaunchConfig>,
}

/// Outcome of a successful launch.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub game_dir: PathBuf,
    pub pid: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub pid: u32,
    pub killed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_empty_fields() {
        let env = Envelope::response(Some("7".into()), serde_json::json!({"pid": 42}));
        let s = serde_json::to_string(&env).unwrap();
        assert_eq!(s, r#"{"id":"7","kind":"response","result":{"pid":42}}"#);
    }

    #[test]
    fn envelope_parses_minimal_request() {
        let env: Envelope =
            serde_json::from_str(r#"{"id":"1","kind":"request","method":"launcher.instances"}"#)
                .unwrap();
        assert_eq!(env.kind, Kind::Request);
        assert_eq!(env.method.as_deref(), Some("launcher.instances"));
        assert!(env.params.is_none());
    }

    #[test]
    fn config_uses_editor_key_names() {
        let cfg: LaunchConfig = serde_json::from_value(serde_json::json!({
            "main": "conf.lua",
            "path": "/opt/love",
            "execName": "love11",
            "maxInstances": 3,
            "overwrite": true,
            "useConsoleSubsystem": true,
            "saveAllOnLaunch": true
        }))
        .unwrap();
        assert_eq!(cfg.entry_file, "conf.lua");
        assert_eq!(cfg.executable_dir, PathBuf::from("/opt/love"));
        assert_eq!(cfg.executable_name, "love11");
        assert_eq!(cfg.max_instances, 3);
        assert!(cfg.overwrite_on_launch);
        assert!(cfg.use_console_subsystem);
        assert!(cfg.save_all_before_launch);
    }

    #[test]
    fn config_defaults_fill_missing_keys() {
        let cfg: LaunchConfig = serde_json::from_str(r#"{"maxInstances": 2}"#).unwrap();
        assert_eq!(cfg.entry_file, "main.lua");
        assert_eq!(cfg.executable_name, "love");
        assert_eq!(cfg.executable_dir, PathBuf::from("."));
        assert_eq!(cfg.max_instances, 2);
        assert!(!cfg.overwrite_on_launch);
    }

    #[test]
    fn config_rejects_unknown_keys() {
        let res: Result<LaunchConfig, _> = serde_json::from_str(r#"{"exec": "love"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn launch_params_config_is_optional() {
        let params: LaunchParams = serde_json::from_value(serde_json::json!({
            "active_file": "/proj/main.lua",
            "roots": [{"name": "proj", "path": "/proj"}]
        }))
        .unwrap();
        assert!(params.config.is_none());
        assert_eq!(params.roots[0], WorkspaceRoot::new("proj", "/proj"));
    }
}
