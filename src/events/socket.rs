//! Unix socket listener for URLs forwarded by later invocations.
//!
//! # Responsibilities
//! - Bind the listener socket, replacing a stale socket file
//! - Accept connections and submit every received line
//! - Enforce a concurrent connection limit via semaphore
//! - Remove the socket file when the accept loop ends
//!
//! # Design Decisions
//! - Binding is only done while holding the instance guard, so an existing
//!   socket file can only be a leftover from a dead listener
//! - Newline-delimited text protocol; one URL per line

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;

use crate::dispatch::UrlSink;
use crate::events::UrlEventSource;
use crate::lifecycle::Shutdown;

const MAX_CONNECTIONS: usize = 16;
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Accepts forwarded URLs on a Unix domain socket.
pub struct SocketSource {
    listener: UnixListener,
    socket_file: SocketFile,
    shutdown: Shutdown,
}

impl SocketSource {
    /// Bind `path`. Must be called from within a Tokio runtime.
    pub fn bind(path: impl AsRef<Path>, shutdown: Shutdown) -> io::Result<Self> {
        let path = path.as_ref();
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed stale socket file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let listener = UnixListener::bind(path)?;
        tracing::info!(path = %path.display(), "Socket listener bound");

        Ok(Self {
            listener,
            socket_file: SocketFile(path.to_path_buf()),
            shutdown,
        })
    }

    pub fn path(&self) -> &Path {
        &self.socket_file.0
    }

    async fn serve(self, sink: UrlSink) {
        let SocketSource {
            listener,
            socket_file,
            shutdown,
        } = self;
        let connection_limit = Arc::new(Semaphore::new(MAX_CONNECTIONS));
        let stop = shutdown.wait();
        tokio::pin!(stop);

        loop {
            let permit = tokio::select! {
                _ = &mut stop => break,
                permit = connection_limit.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let stream = tokio::select! {
                _ = &mut stop => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept socket connection");
                        continue;
                    }
                },
            };

            let sink = sink.clone();
            tokio::spawn(async move {
                read_urls(stream, sink).await;
                drop(permit);
            });
        }

        tracing::info!(path = %socket_file.0.display(), "Socket listener stopped");
    }
}

impl UrlEventSource for SocketSource {
    fn name(&self) -> &'static str {
        "socket"
    }

    fn start(self: Box<Self>, sink: UrlSink) -> io::Result<()> {
        tokio::spawn(self.serve(sink));
        Ok(())
    }
}

async fn read_urls(stream: UnixStream, sink: UrlSink) {
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    loop {
        line.clear();
        let limit = (MAX_LINE_BYTES + 1) as u64;
        let read = (&mut reader).take(limit).read_until(b'\n', &mut line).await;
        match read {
            Ok(0) => break,
            Ok(_) if line.len() > MAX_LINE_BYTES && line.last() != Some(&b'\n') => {
                tracing::warn!(limit = MAX_LINE_BYTES, "Dropping oversized forwarded line");
                if let Err(e) = skip_line(&mut reader).await {
                    tracing::warn!(error = %e, "Socket connection read failed");
                    break;
                }
            }
            Ok(_) => {
                sink.submit(&String::from_utf8_lossy(&line), "socket");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Socket connection read failed");
                break;
            }
        }
    }
}

/// Discard input up to and including the next newline.
async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<()> {
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}

/// Removes the socket file when dropped, including on runtime teardown.
struct SocketFile(PathBuf);

impl Drop for SocketFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// Send `urls` to the listener at `path`, one per line.
pub async fn forward(path: impl AsRef<Path>, urls: &[String]) -> io::Result<()> {
    let mut stream = UnixStream::connect(path.as_ref()).await?;
    for url in urls {
        stream.write_all(url.trim().as_bytes()).await?;
        stream.write_all(b"\n").await?;
    }
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LaunchStyle, UnknownUrlStrategy};
    use crate::dispatch::Dispatcher;
    use crate::launcher::{CommandSpawner, Launcher};
    use crate::routing::{RuleSet, Router};
    use std::time::Duration;

    #[tokio::test]
    async fn test_forwarded_urls_reach_dispatcher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.sock");
        let shutdown = Shutdown::new();

        let rules = RuleSet::compile(&[], "Default", UnknownUrlStrategy::UseSystemDefaultBrowser).unwrap();
        let launcher = Launcher::new("unused", LaunchStyle::Direct, Arc::new(CommandSpawner));
        let (dispatcher, sink) = Dispatcher::new(Router::new(rules), launcher);

        let source = SocketSource::bind(&path, shutdown.clone()).unwrap();
        Box::new(source).start(sink).unwrap();

        forward(&path, &["https://a.example".to_string(), "https://b.example".to_string()])
            .await
            .unwrap();

        let run = tokio::spawn(dispatcher.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.trigger();

        let report = run.await.unwrap();
        assert_eq!(report.skipped, 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped_without_losing_the_next() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.sock");
        let shutdown = Shutdown::new();

        let rules = RuleSet::compile(&[], "Default", UnknownUrlStrategy::UseSystemDefaultBrowser).unwrap();
        let launcher = Launcher::new("unused", LaunchStyle::Direct, Arc::new(CommandSpawner));
        let (dispatcher, sink) = Dispatcher::new(Router::new(rules), launcher);

        let source = SocketSource::bind(&path, shutdown.clone()).unwrap();
        Box::new(source).start(sink).unwrap();

        let mut payload = vec![b'a'; 4 * MAX_LINE_BYTES];
        payload.extend_from_slice(b"\nhttps://after.example\n");
        let mut stream = UnixStream::connect(&path).await.unwrap();
        stream.write_all(&payload).await.unwrap();
        stream.shutdown().await.unwrap();

        let run = tokio::spawn(dispatcher.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.trigger();

        let report = run.await.unwrap();
        assert_eq!(report.total(), 1);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_skip_line_stops_after_newline() {
        let mut input: &[u8] = b"rest of a long line\nnext\n";
        skip_line(&mut input).await.unwrap();
        assert_eq!(input, b"next\n");
    }

    #[tokio::test]
    async fn test_bind_replaces_stale_socket_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.sock");
        std::fs::write(&path, b"").unwrap();

        let source = SocketSource::bind(&path, Shutdown::new()).unwrap();
        assert_eq!(source.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_forward_without_listener_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = forward(dir.path().join("absent.sock"), &["x".to_string()]).await;
        assert!(err.is_err());
    }
}
