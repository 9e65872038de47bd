//! Line-delimited URLs from a blocking reader, usually stdin.

use std::io::{self, BufRead, BufReader, Read};
use std::thread;

use crate::dispatch::UrlSink;
use crate::events::UrlEventSource;

/// Reads one URL per line on a dedicated thread.
pub struct LineSource<R> {
    reader: R,
    name: &'static str,
}

impl LineSource<io::Stdin> {
    pub fn stdin() -> Self {
        Self {
            reader: io::stdin(),
            name: "stdin",
        }
    }
}

impl<R: Read + Send + 'static> LineSource<R> {
    pub fn new(reader: R, name: &'static str) -> Self {
        Self { reader, name }
    }
}

impl<R: Read + Send + 'static> UrlEventSource for LineSource<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn start(self: Box<Self>, sink: UrlSink) -> io::Result<()> {
        let LineSource { reader, name } = *self;
        thread::Builder::new()
            .name(format!("url-source-{}", name))
            .spawn(move || {
                for line in BufReader::new(reader).lines() {
                    match line {
                        Ok(line) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            if !sink.submit(&line, name) && sink.is_closed() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(source = name, error = %e, "Stopped reading URLs");
                            break;
                        }
                    }
                }
                tracing::debug!(source = name, "URL source exhausted");
            })?;
        Ok(())
    }
}
