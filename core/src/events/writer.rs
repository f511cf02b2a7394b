use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::config::EventsOutConfig;

#[derive(Clone)]
pub struct EventSinkTx {
    tx: mpsc::Sender<String>,
    dropped: std::sync::Arc<std::sync::atomic::AtomicU64>,
    drop_when_full: bool,
}

impl EventSinkTx {
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub async fn send_line(&self, line: String) {
        if self.drop_when_full {
            if self.tx.try_send(line).is_err() {
                self.dropped
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        } else if self.tx.send(line).await.is_err() {
            // writer closed
        }
    }
}

/// Spawn the background JSON-lines writer for the event stream. Returns
/// `None` when the sink is disabled.
pub async fn start_event_sink(cfg: &EventsOutConfig) -> Result<Option<EventSinkTx>, String> {
    if !cfg.enabled || cfg.path.trim().is_empty() {
        return Ok(None);
    }

    let (tx, mut rx) = mpsc::channel::<String>(cfg.channel_capacity);
    let dropped = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
    let path = cfg.path.clone();
    let drop_when_full = cfg.drop_when_full;

    tokio::spawn(async move {
        let mut writer: Box<dyn tokio::io::AsyncWrite + Unpin + Send> = if path == "stdout:" {
            Box::new(tokio::io::stdout())
        } else {
            let file = match tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(_) => return,
            };
            Box::new(file)
        };

        while let Some(mut line) = rx.recv().await {
            if !line.ends_with('\n') {
                line.push('\n');
            }
            if writer.write_all(line.as_bytes()).await.is_err() {
                return;
            }
        }

        let _ = writer.flush().await;
    });

    Ok(Some(EventSinkTx {
        tx,
        dropped,
        drop_when_full,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_sink_yields_none() {
        let cfg = EventsOutConfig {
            enabled: false,
            ..EventsOutConfig::default()
        };
        assert!(start_event_sink(&cfg).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn full_channel_drops_lines_and_counts_them() {
        // No writer task draining the channel, so the second line cannot fit.
        let (tx, _rx) = mpsc::channel(1);
        let sink = EventSinkTx {
            tx,
            dropped: std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0)),
            drop_when_full: true,
        };

        sink.send_line("{\"type\":\"task_start\"}".to_string()).await;
        sink.send_line("{\"type\":\"task_complete\"}".to_string())
            .await;

        assert_eq!(sink.dropped_count(), 1);
    }

    #[tokio::test]
    async fn sink_appends_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let cfg = EventsOutConfig {
            enabled: true,
            path: path.to_string_lossy().to_string(),
            channel_capacity: 8,
            drop_when_full: false,
        };

        let sink = start_event_sink(&cfg).await.unwrap().unwrap();
        sink.send_line("{\"type\":\"task_start\"}".to_string()).await;
        sink.send_line("{\"type\":\"task_complete\"}".to_string())
            .await;
        drop(sink);

        // Writer drains asynchronously.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("task_start"));
    }
}
