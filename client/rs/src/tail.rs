//! Follow-mode log streaming.
//!
//! [FrameDecoder] turns raw response chunks into parsed frames;
//! [LogTail] owns one follow stream at a time and accumulates the
//! visible log text. A frame can arrive split across chunk
//! boundaries, so undecodable lines are buffered for the next
//! chunk. Once any frame in a batch parses, the whole accumulation
//! is dropped; a permanently malformed line is lost rather than
//! surfaced. A log viewer must never crash on bad input.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use data_encoding::BASE64;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
  NomadClient,
  entities::logs::{LogKind, StreamFrame},
};

/// How far back from the end of the file a follow stream starts.
pub const TAIL_OFFSET_BYTES: u64 = 50_000;

/// Incremental decoder for the newline-delimited frame stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
  buffer: String,
}

impl FrameDecoder {
  /// Feeds one response chunk, returning every frame that parsed.
  pub fn decode_chunk(
    &mut self,
    chunk: &[u8],
  ) -> Vec<StreamFrame> {
    self.buffer.push_str(&String::from_utf8_lossy(chunk));
    let mut frames = Vec::new();
    for line in self.buffer.split('\n') {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      match serde_json::from_str::<StreamFrame>(line) {
        Ok(frame) => frames.push(frame),
        // Usually a frame cut off mid-chunk. Retry it with
        // the next chunk appended.
        Err(_) => continue,
      }
    }
    if !frames.is_empty() {
      self.buffer.clear();
    }
    frames
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }
}

/// Base64 log payload to displayable text. Undecodable payloads
/// are dropped, best effort display.
fn decoded_data(frame: &StreamFrame) -> Option<String> {
  let data = frame.data.as_ref()?;
  match BASE64.decode(data.as_bytes()) {
    Ok(bytes) => {
      Some(String::from_utf8_lossy(&bytes).into_owned())
    }
    Err(e) => {
      debug!("Dropping undecodable log frame | {e:?}");
      None
    }
  }
}

/// Marker line spliced into the visible log for file lifecycle
/// events (`file truncated`, `file deleted`).
fn file_event_marker(event: &str) -> String {
  format!("\n[{event}]\n")
}

//

/// What a frame contributes to the visible log.
fn frame_appends(frame: &StreamFrame, out: &mut Vec<String>) {
  if let Some(text) = decoded_data(frame) {
    out.push(text);
  }
  if let Some(event) = &frame.file_event {
    out.push(file_event_marker(event));
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTailEvent {
  /// Text appended to the visible log.
  Append(String),
  /// The stream failed for a reason other than cancellation and
  /// the tail is back to idle.
  Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
  pub allocation: String,
  pub task: String,
  pub kind: LogKind,
}

#[derive(Default)]
struct TailBuffer {
  visible: String,
  decoder: FrameDecoder,
}

/// One follow stream per tail. Starting while a stream is live is
/// a no-op; changing the target stops the stream without
/// restarting it; cancellation is cooperative and is never
/// reported as an error.
pub struct LogTail {
  client: NomadClient,
  target: Option<LogTarget>,
  buffer: Arc<Mutex<TailBuffer>>,
  cancel: Option<CancellationToken>,
  handle: Option<tokio::task::JoinHandle<()>>,
  events: mpsc::UnboundedSender<LogTailEvent>,
}

impl LogTail {
  pub fn new(
    client: NomadClient,
  ) -> (LogTail, mpsc::UnboundedReceiver<LogTailEvent>) {
    let (events, receiver) = mpsc::unbounded_channel();
    (
      LogTail {
        client,
        target: None,
        buffer: Default::default(),
        cancel: None,
        handle: None,
        events,
      },
      receiver,
    )
  }

  pub fn is_streaming(&self) -> bool {
    self.cancel.is_some()
      && self
        .handle
        .as_ref()
        .is_some_and(|handle| !handle.is_finished())
  }

  /// Opens the follow stream. No-op while already streaming or
  /// while the target is unset, guaranteeing at most one live
  /// connection.
  pub fn start(&mut self) {
    if self.is_streaming() {
      return;
    }
    let Some(target) = self.target.clone() else {
      return;
    };
    // A stale stream may still be draining after an error or
    // stop. Cancel it before opening the replacement.
    if let Some(cancel) = self.cancel.take() {
      cancel.cancel();
    }
    let cancel = CancellationToken::new();
    self.cancel = Some(cancel.clone());
    let client = self.client.clone();
    let buffer = self.buffer.clone();
    let events = self.events.clone();
    self.handle = Some(tokio::spawn(async move {
      if let Err(e) =
        run_tail(client, target, buffer, events.clone(), cancel)
          .await
      {
        let _ =
          events.send(LogTailEvent::Error(format!("{e:#}")));
      }
    }));
  }

  /// Cancels the in-flight stream. Idempotent.
  pub fn stop(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      cancel.cancel();
    }
  }

  /// Changing the target stops the current stream. Restarting is
  /// a separate, explicit [LogTail::start].
  pub fn set_target(&mut self, target: Option<LogTarget>) {
    if self.is_streaming() {
      self.stop();
    }
    self.target = target;
  }

  pub fn target(&self) -> Option<&LogTarget> {
    self.target.as_ref()
  }

  /// Drops the accumulated text and any partial frame. Streaming
  /// state is unaffected.
  pub fn clear(&self) {
    let mut buffer = lock(&self.buffer);
    buffer.visible.clear();
    buffer.decoder.clear();
  }

  /// The accumulated visible log text.
  pub fn visible(&self) -> String {
    lock(&self.buffer).visible.clone()
  }
}

impl Drop for LogTail {
  fn drop(&mut self) {
    self.stop();
  }
}

fn lock(
  buffer: &Arc<Mutex<TailBuffer>>,
) -> MutexGuard<'_, TailBuffer> {
  buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_tail(
  client: NomadClient,
  target: LogTarget,
  buffer: Arc<Mutex<TailBuffer>>,
  events: mpsc::UnboundedSender<LogTailEvent>,
  cancel: CancellationToken,
) -> anyhow::Result<()> {
  let response = tokio::select! {
    response = client.follow_logs(
      &target.allocation,
      &target.task,
      target.kind,
      TAIL_OFFSET_BYTES,
    ) => response.context("Failed to open log stream")?,
    _ = cancel.cancelled() => return Ok(()),
  };

  let mut stream = response.bytes_stream();

  loop {
    let chunk = tokio::select! {
      chunk = stream.next() => chunk,
      _ = cancel.cancelled() => {
        debug!("Log stream cancelled");
        return Ok(());
      }
    };
    let chunk = match chunk {
      Some(Ok(chunk)) => chunk,
      // An abort raced the read, treat like any other stop.
      Some(Err(_)) if cancel.is_cancelled() => return Ok(()),
      Some(Err(e)) => {
        return Err(e).context("Log stream failed");
      }
      // Remote closed the stream.
      None => return Ok(()),
    };
    let mut appends = Vec::new();
    {
      let mut buffer = lock(&buffer);
      for frame in buffer.decoder.decode_chunk(&chunk) {
        frame_appends(&frame, &mut appends);
      }
      for text in &appends {
        buffer.visible.push_str(text);
      }
    }
    for text in appends {
      if events.send(LogTailEvent::Append(text)).is_err() {
        // Receiver gone, nobody is watching.
        return Ok(());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn visible_from(chunks: &[&str]) -> String {
    let mut decoder = FrameDecoder::default();
    let mut visible = String::new();
    for chunk in chunks {
      let mut appends = Vec::new();
      for frame in decoder.decode_chunk(chunk.as_bytes()) {
        frame_appends(&frame, &mut appends);
      }
      for text in appends {
        visible.push_str(&text);
      }
    }
    visible
  }

  #[test]
  fn frames_accumulate_across_reads() {
    let visible = visible_from(&[
      "{\"Data\":\"aGVsbG8=\"}\n",
      "{\"Data\":\"IHdvcmxk\"}\n",
    ]);
    assert_eq!(visible, "hello world");
  }

  #[test]
  fn frame_split_across_chunks_is_buffered() {
    let visible = visible_from(&[
      "{\"Data\":\"aGVs",
      "bG8=\"}\n{\"Data\":\"IHdvcmxk\"}\n",
    ]);
    assert_eq!(visible, "hello world");
  }

  #[test]
  fn unparsed_buffer_is_retained_until_a_frame_parses() {
    let mut decoder = FrameDecoder::default();
    assert!(decoder.decode_chunk(b"{\"Data\":\"aG").is_empty());
    assert!(decoder.decode_chunk(b"Vs").is_empty());
    let frames = decoder.decode_chunk(b"bG8=\"}\n");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].data.as_deref(), Some("aGVsbG8="));
  }

  #[test]
  fn parse_success_clears_the_accumulation() {
    let mut decoder = FrameDecoder::default();
    // The malformed line is dropped alongside the clear; this
    // is the documented lossy rule, not an accident.
    let frames = decoder
      .decode_chunk(b"not json\n{\"FileEvent\":\"file truncated\"}\n");
    assert_eq!(frames.len(), 1);
    assert!(decoder.buffer.is_empty());

    // With nothing parsed the accumulation is kept whole.
    assert!(decoder.decode_chunk(b"still not json\n").is_empty());
    assert_eq!(decoder.buffer, "still not json\n");
  }

  #[test]
  fn file_events_append_marker_lines() {
    let visible = visible_from(&[
      "{\"Data\":\"aGVsbG8=\"}\n",
      "{\"FileEvent\":\"file truncated\"}\n",
    ]);
    assert_eq!(visible, "hello\n[file truncated]\n");
  }

  #[test]
  fn undecodable_data_is_dropped() {
    let visible = visible_from(&[
      "{\"Data\":\"!!notbase64!!\"}\n{\"Data\":\"aGVsbG8=\"}\n",
    ]);
    assert_eq!(visible, "hello");
  }

  #[tokio::test]
  async fn start_without_target_is_a_no_op() {
    let client = NomadClient::new("http://127.0.0.1:4646", "");
    let (mut tail, _events) = LogTail::new(client);
    tail.start();
    assert!(!tail.is_streaming());
  }

  #[tokio::test]
  async fn stop_and_clear_are_idempotent_when_idle() {
    let client = NomadClient::new("http://127.0.0.1:4646", "");
    let (mut tail, _events) = LogTail::new(client);
    tail.stop();
    tail.stop();
    tail.clear();
    assert_eq!(tail.visible(), "");
    tail.set_target(Some(LogTarget {
      allocation: "alloc".into(),
      task: "task".into(),
      kind: LogKind::Stdout,
    }));
    assert!(!tail.is_streaming());
  }
}
