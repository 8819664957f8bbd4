//! Dev-mode channel: the virtual style module and full-reload signalling.

use serde::{Deserialize, Serialize};

use crate::anchor::json_quote;
use crate::style_cache::StyleCache;

/// Id of the synthetic module that serves the concatenated styles in dev.
pub const VIRTUAL_STYLE_ID: &str = "virtual:hoist-ce-styles/css-helper";

/// The parts of a dev server the hoisting session talks to.
pub trait DevServer {
    /// Mark `id` stale in the module graph. Returns `false` when the graph
    /// has no module with that id.
    fn invalidate_module(&mut self, id: &str) -> bool;

    /// Ask connected clients to reload. Fire-and-forget.
    fn full_reload(&mut self, path: &str);
}

/// Invalidate the virtual style module and, if the graph knew it, reload
/// every client.
pub fn invalidate_styles<S: DevServer + ?Sized>(server: &mut S) {
    if server.invalidate_module(VIRTUAL_STYLE_ID) {
        server.full_reload("*");
    }
}

/// Source of the virtual module for the current cache contents.
pub fn virtual_module_source(cache: &StyleCache) -> String {
    format!("export const styles = {}", json_quote(&cache.concatenate()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DevSignal {
    InvalidateModule { id: String },
    FullReload { path: String },
}

/// A dev server stand-in that queues signals for the embedding host to
/// drain and replay against its real module graph and websocket.
#[derive(Debug, Clone, Default)]
pub struct SignalQueue {
    signals: Vec<DevSignal>,
}

impl SignalQueue {
    pub fn new() -> Self {
        SignalQueue::default()
    }

    pub fn signals(&self) -> &[DevSignal] {
        &self.signals
    }

    pub fn drain(&mut self) -> Vec<DevSignal> {
        std::mem::take(&mut self.signals)
    }
}

impl DevServer for SignalQueue {
    fn invalidate_module(&mut self, id: &str) -> bool {
        self.signals.push(DevSignal::InvalidateModule { id: id.to_string() });
        true
    }

    fn full_reload(&mut self, path: &str) {
        self.signals.push(DevSignal::FullReload {
            path: path.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyGraph {
        reloads: usize,
    }

    impl DevServer for EmptyGraph {
        fn invalidate_module(&mut self, _id: &str) -> bool {
            false
        }

        fn full_reload(&mut self, _path: &str) {
            self.reloads += 1;
        }
    }

    #[test]
    fn test_virtual_module_reflects_cache() {
        let mut cache = StyleCache::new();
        assert_eq!(virtual_module_source(&cache), r#"export const styles = """#);

        cache.record("a.css", ".a{content:\"x\"}");
        assert_eq!(
            virtual_module_source(&cache),
            r#"export const styles = ".a{content:\"x\"}""#
        );
    }

    #[test]
    fn test_invalidate_sends_reload() {
        let mut queue = SignalQueue::new();
        invalidate_styles(&mut queue);
        assert_eq!(
            queue.drain(),
            vec![
                DevSignal::InvalidateModule {
                    id: VIRTUAL_STYLE_ID.to_string()
                },
                DevSignal::FullReload {
                    path: "*".to_string()
                },
            ]
        );
        assert!(queue.signals().is_empty());
    }

    #[test]
    fn test_unknown_module_skips_reload() {
        let mut graph = EmptyGraph { reloads: 0 };
        invalidate_styles(&mut graph);
        assert_eq!(graph.reloads, 0);
    }

    #[test]
    fn test_signal_serialization() {
        let json = serde_json::to_string(&DevSignal::FullReload {
            path: "*".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"full-reload","path":"*"}"#);
    }
}
