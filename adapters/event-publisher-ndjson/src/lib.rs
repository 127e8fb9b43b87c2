//! Reference `EventPublisher`: appends one JSON object per line to a file,
//! standing in for the external bus the design treats as out of scope.
//! Re-opens the sink with exponential backoff on write failure rather than
//! giving up, since publish failures must never fail the caller.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use authcore_types::prelude::*;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(50);

pub struct NdjsonEventPublisher {
	path: PathBuf,
	file: Mutex<Option<tokio::fs::File>>,
}

impl NdjsonEventPublisher {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		NdjsonEventPublisher { path: path.into(), file: Mutex::new(None) }
	}

	async fn open(&self) -> std::io::Result<tokio::fs::File> {
		OpenOptions::new().create(true).append(true).open(&self.path).await
	}

	async fn write_line(&self, line: &str) -> std::io::Result<()> {
		let mut guard = self.file.lock().await;
		if guard.is_none() {
			*guard = Some(self.open().await?);
		}
		let file = guard.as_mut().expect("just populated");
		if let Err(e) = file.write_all(line.as_bytes()).await {
			*guard = None;
			return Err(e);
		}
		file.write_all(b"\n").await?;
		file.flush().await
	}
}

#[async_trait]
impl EventPublisher for NdjsonEventPublisher {
	async fn publish(&self, topic: &str, event: Event) -> ClResult<()> {
		let line = serde_json::to_string(&serde_json::json!({ "topic": topic, "event": event })).map_err(|e| Error::Internal(e.to_string()))?;

		let mut backoff = INITIAL_BACKOFF;
		for attempt in 0..=MAX_RETRIES {
			match self.write_line(&line).await {
				Ok(()) => return Ok(()),
				Err(e) if attempt < MAX_RETRIES => {
					warn!("event publish attempt {} failed: {}", attempt + 1, e);
					tokio::time::sleep(backoff).await;
					backoff *= 2;
				}
				Err(e) => {
					warn!("event publish gave up after {} attempts: {}", MAX_RETRIES + 1, e);
					return Ok(());
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn publish_appends_one_line_per_event() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("events.ndjson");
		let publisher = NdjsonEventPublisher::new(&path);

		publisher.publish("magistrala.auth", Event::new("domain.create", UserId::new())).await.unwrap();
		publisher.publish("magistrala.auth", Event::new("domain.assign", UserId::new())).await.unwrap();

		let contents = tokio::fs::read_to_string(&path).await.unwrap();
		let lines: Vec<&str> = contents.lines().collect();
		assert_eq!(lines.len(), 2);
		for line in lines {
			let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
			assert_eq!(parsed["topic"], "magistrala.auth");
		}
	}

	#[tokio::test]
	async fn publish_never_fails_the_caller_even_into_an_unwritable_path() {
		let publisher = NdjsonEventPublisher::new("/nonexistent-directory/events.ndjson");
		let result = publisher.publish("magistrala.auth", Event::new("domain.create", UserId::new())).await;
		assert!(result.is_ok());
	}
}

// vim: ts=4
