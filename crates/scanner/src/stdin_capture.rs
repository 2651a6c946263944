//! Line-oriented capture device for headless runs.
//!
//! [`LineCapture`] treats each non-empty input line as the raw value of one
//! recognised frame. The relay binary binds it to stdin so scans can be
//! piped in from a hardware scanner or a file.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::{CaptureDevice, CaptureError, Frame, FrameRelease};

/// Frames buffered between the reader task and the session.
const FRAME_BUFFER: usize = 32;

pub struct LineCapture<R> {
    reader: Option<R>,
    task: Option<JoinHandle<()>>,
}

impl LineCapture<BufReader<Stdin>> {
    /// Capture from the process's standard input.
    ///
    /// Tokio reads stdin on a blocking thread. Unbinding stops frame delivery
    /// but cannot interrupt a read already waiting for input, and runtime
    /// shutdown waits for that read to finish. Callers that must exit while
    /// stdin is still open should end the process explicitly.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineCapture<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            task: None,
        }
    }
}

#[async_trait]
impl<R> CaptureDevice for LineCapture<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn bind(&mut self) -> Result<mpsc::Receiver<Frame>, CaptureError> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| CaptureError::Unavailable("line input already consumed".into()))?;
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        self.task = Some(tokio::spawn(read_lines(reader, tx)));
        Ok(rx)
    }

    async fn unbind(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn read_lines<R>(reader: R, tx: mpsc::Sender<Frame>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                line_no += 1;
                if line.trim().is_empty() {
                    continue;
                }
                let frame = Frame::new(
                    Some(line),
                    FrameRelease::new(move || tracing::trace!(line_no, "Frame released")),
                );
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read scan input");
                break;
            }
        }
    }
}
