use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicU32, Ordering},
};

use launch_api::{Envelope, Kind};
use lovelauncher::{
    platform::{Invocation, Platform},
    registry::ProcessHandle,
    LaunchError, LaunchSupervisor, Session, Spawner,
};
use serde_json::{json, Value};
use tokio::io::BufReader;

/// Hands out fake pids without starting anything.
struct FakeSpawner(AtomicU32);

impl Spawner for FakeSpawner {
    fn spawn(&self, _invocation: &Invocation) -> Result<ProcessHandle, LaunchError> {
        Ok(ProcessHandle::detached(
            500 + self.0.fetch_add(1, Ordering::SeqCst),
        ))
    }
}

fn session() -> Session<FakeSpawner> {
    let supervisor = LaunchSupervisor::with_spawner(Platform::Other, FakeSpawner(AtomicU32::new(0)));
    Session::new(supervisor, Default::default())
}

fn project(root: &Path) {
    fs::create_dir_all(root.join("game")).unwrap();
    fs::write(root.join("game/main.lua"), "").unwrap();
}

async fn exchange(session: &mut Session<FakeSpawner>, requests: &[String]) -> Vec<Envelope> {
    let input = requests.join("\n") + "\n";
    let mut out = Vec::new();
    session
        .run(BufReader::new(input.as_bytes()), &mut out)
        .await
        .unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn request(id: &str, method: &str, params: Value) -> String {
    serde_json::to_string(&Envelope::request(id, method, params)).unwrap()
}

fn error_code(env: &Envelope) -> Option<i32> {
    env.error.as_ref().map(|e| e.code)
}

#[tokio::test]
async fn launch_then_refuse_at_capacity() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("proj");
    project(&root);
    let params = json!({
        "active_file": root.join("game/main.lua"),
        "roots": [{"name": "proj", "path": root}],
        "config": {"maxInstances": 1, "saveAllOnLaunch": true}
    });

    let mut session = session();
    let out = exchange(
        &mut session,
        &[
            request("1", "launcher.launch", params.clone()),
            request("2", "launcher.launch", params),
            request("3", "launcher.instances", Value::Null),
        ],
    )
    .await;

    assert_eq!(out.len(), 5, "{out:?}");
    assert_eq!(out[0].id.as_deref(), Some("1"));
    assert_eq!(
        out[0].result,
        Some(json!({"game_dir": root.join("game"), "pid": 500}))
    );
    assert_eq!(out[1].kind, Kind::Event);
    assert_eq!(out[1].topic.as_deref(), Some("workspace.save_all"));
    assert_eq!(out[2].topic.as_deref(), Some("instance.launched"));
    assert_eq!(out[2].payload.as_ref().unwrap()["pid"], json!(500));
    assert_eq!(error_code(&out[3]), Some(-32003));
    assert_eq!(out[3].id.as_deref(), Some("2"));
    assert_eq!(out[4].result, Some(json!([{"pid": 500, "killed": false}])));
    assert_eq!(session.supervisor().registry().len(), 1);
}

#[tokio::test]
async fn overwrite_reports_kill_requests() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("proj");
    project(&root);
    let params = json!({
        "active_file": root.join("game/main.lua"),
        "roots": [{"name": "proj", "path": root}],
        "config": {"maxInstances": 1, "overwrite": true}
    });

    let mut session = session();
    let out = exchange(
        &mut session,
        &[
            request("1", "launcher.launch", params.clone()),
            request("2", "launcher.launch", params),
        ],
    )
    .await;

    let topics: Vec<Option<&str>> = out.iter().map(|e| e.topic.as_deref()).collect();
    assert_eq!(
        topics,
        vec![
            None,
            Some("instance.launched"),
            None,
            Some("instance.kill_requested"),
            Some("instance.launched"),
        ]
    );
    assert_eq!(out[3].payload, Some(json!({"pid": 500})));
    assert_eq!(out[2].result.as_ref().unwrap()["pid"], json!(501));
}

#[tokio::test]
async fn protocol_errors_keep_the_session_alive() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("proj");
    project(&root);

    let mut session = session();
    let out = exchange(
        &mut session,
        &[
            "this is not json".to_string(),
            request("1", "launcher.explode", Value::Null),
            request("2", "launcher.launch", Value::Null),
            request("3", "launcher.launch", json!({"roots": [{"name": "proj", "path": root}]})),
            request(
                "4",
                "launcher.launch",
                json!({"active_file": "/nowhere/main.lua", "roots": [{"name": "proj", "path": root}]}),
            ),
            request(
                "5",
                "launcher.launch",
                json!({
                    "active_file": root.join("game/main.lua"),
                    "roots": [{"name": "proj", "path": root}],
                    "config": {"main": ""}
                }),
            ),
            request("6", "launcher.reconcile", Value::Null),
        ],
    )
    .await;

    let codes: Vec<Option<i32>> = out.iter().map(error_code).collect();
    assert_eq!(
        codes,
        vec![
            Some(-32700),
            Some(-32601),
            Some(-32602),
            Some(-32001),
            Some(-32002),
            Some(-32602),
            None,
        ]
    );
    assert_eq!(out[6].result, Some(json!([])));
}

#[tokio::test]
async fn non_request_envelopes_are_ignored() {
    let mut session = session();
    let event = serde_json::to_string(&Envelope::event("editor.focus", json!({}))).unwrap();
    let out = exchange(&mut session, &[event]).await;
    assert!(out.is_empty());
}
