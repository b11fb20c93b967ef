use anyhow::Result;
use launch_api::{Envelope, Kind, LaunchConfig, LaunchParams};
use serde_json::Value;
use tokio::{
    io::{AsyncBufRead, AsyncWrite},
    sync::mpsc::UnboundedReceiver,
};
use tracing::{debug, info, warn};

use crate::{
    config,
    events::Event,
    ipc::{read_envelope, write_envelope},
    supervisor::{LaunchSupervisor, Spawner},
};

pub const METHOD_LAUNCH: &str = "launcher.launch";
pub const METHOD_INSTANCES: &str = "launcher.instances";
pub const METHOD_RECONCILE: &str = "launcher.reconcile";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// One editor session: a supervisor plus the configuration used when a
/// request does not carry its own.
pub struct Session<S: Spawner> {
    supervisor: LaunchSupervisor<S>,
    config: LaunchConfig,
    events: UnboundedReceiver<Event>,
}

impl<S: Spawner> Session<S> {
    pub fn new(mut supervisor: LaunchSupervisor<S>, config: LaunchConfig) -> Self {
        let events = supervisor.events().subscribe_all();
        Self {
            supervisor,
            config,
            events,
        }
    }

    pub fn supervisor(&self) -> &LaunchSupervisor<S> {
        &self.supervisor
    }

    /// Serve requests until the reader is closed. Instances keep running
    /// after the session ends.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("session started");
        loop {
            let env = match read_envelope(&mut reader).await {
                Ok(Some(env)) => env,
                Ok(None) => break,
                Err(err) if err.is::<serde_json::Error>() => {
                    warn!("malformed request: {err}");
                    let resp = Envelope::failure(None, PARSE_ERROR, err.to_string());
                    write_envelope(&mut writer, &resp).await?;
                    continue;
                }
                Err(err) => return Err(err),
            };
            if env.kind != Kind::Request {
                // front-ends have nothing to tell us through responses or events
                continue;
            }
            let resp = self.handle(env);
            write_envelope(&mut writer, &resp).await?;
            while let Ok(event) = self.events.try_recv() {
                write_envelope(&mut writer, &Envelope::event(event.topic, event.payload)).await?;
            }
        }
        info!(
            instances = self.supervisor.registry().len(),
            "session closed"
        );
        Ok(())
    }

    /// Answer a single request envelope.
    pub fn handle(&mut self, env: Envelope) -> Envelope {
        let Some(method) = env.method.as_deref() else {
            return Envelope::failure(env.id, METHOD_NOT_FOUND, "missing method");
        };
        debug!(method, id = ?env.id, "request");
        let outcome = match method {
            METHOD_LAUNCH => self.launch(env.params.clone()),
            METHOD_INSTANCES => Ok(serde_json::json!(self.supervisor.instances())),
            METHOD_RECONCILE => Ok(serde_json::json!(self.supervisor.reconcile())),
            other => Err((METHOD_NOT_FOUND, format!("unknown method {other}"))),
        };
        match outcome {
            Ok(result) => Envelope::response(env.id, result),
            Err((code, message)) => Envelope::failure(env.id, code, message),
        }
    }

    fn launch(&mut self, params: Option<Value>) -> Result<Value, (i32, String)> {
        let params: LaunchParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|err| (INVALID_PARAMS, format!("invalid launch params: {err}")))?;
        let config = params.config.unwrap_or_else(|| self.config.clone());
        config::validate(&config).map_err(|err| (INVALID_PARAMS, err.to_string()))?;
        let report = self
            .supervisor
            .launch(params.active_file.as_deref(), &params.roots, &config)
            .map_err(|err| {
                warn!("launch refused: {err}");
                (err.code(), err.to_string())
            })?;
        Ok(serde_json::json!(report))
    }
}
