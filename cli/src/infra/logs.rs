//! Doppler websocket log tailer: implementation of the `LogTailer` port.
//!
//! Doppler streams dropsonde `Envelope` protobufs, one per binary frame. Only
//! envelopes carrying a `LogMessage` are printed.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use futures_util::StreamExt;
use prost::Message as _;
use tokio::sync::oneshot;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::application::ports::{LogTailer, TailHandle};
use crate::domain::config::loggregator_url;

// ── Dropsonde wire types ──────────────────────────────────────────────────────

/// Subset of `events.Envelope` used for log lines.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Envelope {
    #[prost(string, optional, tag = "1")]
    pub origin: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub event_type: Option<i32>,
    #[prost(int64, optional, tag = "6")]
    pub timestamp: Option<i64>,
    #[prost(message, optional, tag = "8")]
    pub log_message: Option<LogMessage>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LogMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub message: Option<Vec<u8>>,
    #[prost(enumeration = "LogMessageType", optional, tag = "2")]
    pub message_type: Option<i32>,
    /// Nanoseconds since the Unix epoch.
    #[prost(int64, optional, tag = "3")]
    pub timestamp: Option<i64>,
    #[prost(string, optional, tag = "4")]
    pub app_id: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub source_type: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub source_instance: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LogMessageType {
    Out = 1,
    Err = 2,
}

/// Render one log line as `HH:MM:SS [SOURCE|INSTANCE] message`.
#[must_use]
pub fn format_log_line(log: &LogMessage) -> String {
    let time = DateTime::from_timestamp_nanos(log.timestamp.unwrap_or_default())
        .with_timezone(&Local)
        .format("%H:%M:%S");
    let body = String::from_utf8_lossy(log.message.as_deref().unwrap_or_default());
    format!(
        "{time} [{}|{}] {}",
        log.source_type.as_deref().unwrap_or_default(),
        log.source_instance.as_deref().unwrap_or_default(),
        body.trim_end_matches('\n'),
    )
}

// ── Tailer ────────────────────────────────────────────────────────────────────

/// Streams an app's logs from the target's doppler endpoint to stdout.
pub struct DopplerTailer {
    base_url: String,
}

impl DopplerTailer {
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            base_url: loggregator_url(target),
        }
    }

    /// Print `app_name`'s logs until the server closes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the websocket cannot be opened or fails mid-stream.
    pub async fn stream(&self, app_name: &str) -> Result<()> {
        let url = format!("{}/tail/?app={app_name}", self.base_url);
        tracing::debug!(%url, "connecting to doppler");
        let (mut ws, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("cannot connect to {url}"))?;

        while let Some(frame) = ws.next().await {
            match frame.context("log stream failed")? {
                Message::Binary(bytes) => match Envelope::decode(bytes.as_slice()) {
                    Ok(Envelope {
                        log_message: Some(log),
                        ..
                    }) => println!("{}", format_log_line(&log)),
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "skipping undecodable envelope"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
        tracing::debug!(app = app_name, "log stream closed");
        Ok(())
    }
}

impl LogTailer for DopplerTailer {
    fn tail(&self, app_name: &str) -> Result<TailHandle> {
        let runtime = tokio::runtime::Handle::try_current().context("no async runtime")?;
        let (stop_tx, stop_rx) = oneshot::channel();
        let tailer = Self {
            base_url: self.base_url.clone(),
        };
        let app = app_name.to_string();

        runtime.spawn(async move {
            tokio::select! {
                _ = stop_rx => tracing::debug!(%app, "log tail stopped"),
                res = tailer.stream(&app) => {
                    if let Err(e) = res {
                        tracing::warn!(%app, error = %format!("{e:#}"), "log tail ended");
                    }
                }
            }
        });
        Ok(TailHandle::new(stop_tx))
    }
}
