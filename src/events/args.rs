//! URLs passed on the command line.

use crate::dispatch::UrlSink;
use crate::events::UrlEventSource;

/// Delivers a fixed list of URLs once, then closes.
#[derive(Debug, Clone, Default)]
pub struct ArgsSource {
    urls: Vec<String>,
}

impl ArgsSource {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

impl UrlEventSource for ArgsSource {
    fn name(&self) -> &'static str {
        "args"
    }

    fn start(self: Box<Self>, sink: UrlSink) -> std::io::Result<()> {
        for url in &self.urls {
            sink.submit(url, "args");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LaunchStyle, UnknownUrlStrategy};
    use crate::dispatch::{Dispatcher, OneShotOutcome};
    use crate::launcher::{CommandSpawner, Launcher};
    use crate::routing::{RuleSet, Router};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_args_are_delivered_immediately() {
        let rules = RuleSet::compile(&[], "Default", UnknownUrlStrategy::UseSystemDefaultBrowser).unwrap();
        let launcher = Launcher::new("unused", LaunchStyle::Direct, Arc::new(CommandSpawner));
        let (dispatcher, sink) = Dispatcher::new(Router::new(rules), launcher);

        Box::new(ArgsSource::new(vec!["https://example.com".into()]))
            .start(sink)
            .unwrap();

        let outcome = dispatcher.run_once(Duration::from_secs(1)).await;
        assert_eq!(outcome, OneShotOutcome::NoInterference);
    }
}
