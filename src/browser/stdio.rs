use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

use super::indicator::{IndicatorError, StatusIndicator};
use crate::domain::{BrowserEvent, IconSet, TabId, UiCommand};

/// Writes UI commands as newline-delimited JSON for the extension shim.
pub struct JsonLinesIndicator<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesIndicator<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    async fn send(&self, command: UiCommand) -> Result<(), IndicatorError> {
        let mut line = serde_json::to_vec(&command)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> StatusIndicator for JsonLinesIndicator<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn show_indicator(&self, tab_id: TabId) -> Result<(), IndicatorError> {
        self.send(UiCommand::ShowIndicator { tab_id }).await
    }

    async fn set_icon(&self, tab_id: TabId, icon_set: IconSet) -> Result<(), IndicatorError> {
        self.send(UiCommand::set_icon(tab_id, icon_set)).await
    }

    async fn set_title(&self, tab_id: TabId, title: &str) -> Result<(), IndicatorError> {
        self.send(UiCommand::SetTitle {
            tab_id,
            title: title.to_string(),
        })
        .await
    }
}

/// Reads browser events, one JSON object per line. Blank lines and lines
/// that do not decode (bad UTF-8 included) are skipped.
pub struct EventReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> EventReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// `Ok(None)` once the input is closed; `Err` only for I/O failures.
    pub async fn next_event(&mut self) -> std::io::Result<Option<BrowserEvent>> {
        loop {
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            let line = std::mem::take(&mut self.buf);
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<BrowserEvent>(line) {
                Ok(event) => return Ok(Some(event)),
                Err(err) => {
                    tracing::warn!(
                        target: "browser",
                        error = %err,
                        line = %String::from_utf8_lossy(line),
                        "ignoring malformed event"
                    );
                }
            }
        }
    }
}
