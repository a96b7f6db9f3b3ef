//! Free-space probes: constant values, HTTP endpoints and the external script.

use crate::error::{DiskError, DiskResult, ProbeError};
use crate::query::FreeSpaceQuery;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tapecat_core::config::DiskSpaceConfig;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One disk system whose free space must be probed.
#[derive(Clone, Debug)]
pub struct ProbeRequest {
    pub disk_system_name: String,
    /// Passed to the script as the disk instance address.
    pub disk_instance_name: String,
    pub disk_instance_space_name: String,
    pub query: FreeSpaceQuery,
}

/// Source of free-space figures.
#[async_trait]
pub trait FreeSpaceProber: Send + Sync {
    /// Free bytes currently available to the disk system.
    async fn probe(&self, request: &ProbeRequest) -> Result<u64, ProbeError>;
}

/// JSON reply of the script and of HTTP endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FreeSpaceReply {
    free_space: Option<u64>,
    error: Option<String>,
}

fn parse_reply(body: &[u8]) -> Result<u64, ProbeError> {
    let reply: FreeSpaceReply =
        serde_json::from_slice(body).map_err(|e| ProbeError::MalformedReply(e.to_string()))?;
    if let Some(error) = reply.error {
        return Err(ProbeError::Reported(error));
    }
    reply
        .free_space
        .ok_or_else(|| ProbeError::MalformedReply("missing freeSpace field".to_string()))
}

/// Prober answering every query form.
#[derive(Clone, Debug)]
pub struct DefaultProber {
    http: reqwest::Client,
    script: Option<PathBuf>,
    timeout: Duration,
}

impl DefaultProber {
    pub fn new(config: &DiskSpaceConfig) -> DiskResult<Self> {
        config.validate().map_err(DiskError::Config)?;
        let timeout = config.probe_timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DiskError::HttpClient)?;
        Ok(Self {
            http,
            script: config.external_free_disk_space_script.clone(),
            timeout,
        })
    }

    async fn query_http(&self, url: &Url) -> Result<u64, ProbeError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::HttpStatus {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        parse_reply(&body)
    }

    async fn run_script(&self, disk_instance: &str, space_name: &str) -> Result<u64, ProbeError> {
        let script = self.script.as_ref().ok_or(ProbeError::NoScript)?;
        let path = script.display().to_string();
        let request = serde_json::json!({
            "diskInstanceAddress": disk_instance,
            "spaceName": space_name,
        })
        .to_string();

        let mut cmd = Command::new(script);
        cmd.arg(&request)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let mut child = cmd.spawn().map_err(|source| ProbeError::Spawn {
            path: path.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // Scripts that only read their argument may close stdin early.
            if let Err(e) = stdin.write_all(request.as_bytes()).await {
                tracing::debug!(script = %path, error = %e, "Free space script did not read stdin");
            }
        }

        // Dropping the child on timeout kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|source| ProbeError::Spawn { path, source })?;
        if !output.status.success() {
            return Err(ProbeError::ScriptFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_reply(&output.stdout)
    }
}

#[async_trait]
impl FreeSpaceProber for DefaultProber {
    async fn probe(&self, request: &ProbeRequest) -> Result<u64, ProbeError> {
        match &request.query {
            FreeSpaceQuery::Constant(bytes) => Ok(*bytes),
            FreeSpaceQuery::Http(url) => self.query_http(url).await,
            FreeSpaceQuery::Script { space_name } => {
                self.run_script(&request.disk_instance_name, space_name)
                    .await
            }
        }
    }
}
