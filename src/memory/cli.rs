//! Memory store backed by an agent CLI (`zeroclaw agent --message <msg>`).

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use super::MemoryStore;
use crate::config::MemoryConfig;
use crate::error::{CuratrError, Result};

/// Runs `command args... <message>` once per entry.
#[derive(Debug, Clone)]
pub struct CliMemoryStore {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CliMemoryStore {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl MemoryStore for CliMemoryStore {
    async fn remember(&self, message: &str) -> Result<()> {
        debug!("Running {} ({} bytes)", self.command, message.len());

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.command)
                .args(&self.args)
                .arg(message)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match output {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(CuratrError::Memory(format!(
                    "{} exited {}: {}",
                    self.command,
                    output.status,
                    stderr.trim()
                )))
            }
            Ok(Err(e)) => Err(CuratrError::Memory(format!("Failed to run {}: {}", self.command, e))),
            Err(_) => Err(CuratrError::Memory(format!(
                "{} timed out after {}s",
                self.command,
                self.timeout.as_secs()
            ))),
        }
    }
}
