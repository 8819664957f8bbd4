//! Hoisting session: one per build or dev-server lifetime.
//!
//! Owns the style cache, the asset ledger and the resolved options, and
//! exposes the bundler hooks. Transform runs once per candidate module;
//! `generate_bundle` runs once per build pass after every transform.
//!
//! Build mode is a two-phase text protocol:
//! 1. transform swaps each style value for an anchor literal and mirrors any
//!    asset tokens into binding statements the bundler will resolve;
//! 2. emission reads the resolved bindings back into the concatenated
//!    payload, strips them, then replaces host anchors with the payload and
//!    guest anchors with an empty string.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::anchor::{find_anchors, json_inner, json_quote, Anchor};
use crate::assets::{AssetAdapter, AssetLedger, ViteAssetAdapter};
use crate::dev::{invalidate_styles, virtual_module_source, DevServer, SignalQueue, VIRTUAL_STYLE_ID};
use crate::error::{HoistError, HoistResult};
use crate::extract::{extract_default_string, is_style_module};
use crate::options::{Command, HoistOptions, ResolvedOptions};
use crate::style_cache::StyleCache;

const GUEST_STYLES: &str = "''";

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleSideEffects {
    /// Keep the module and all its statements through tree-shaking.
    #[serde(rename = "no-treeshake")]
    NoTreeshake,
}

impl ModuleSideEffects {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleSideEffects::NoTreeshake => "no-treeshake",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub code: String,
    pub module_side_effects: ModuleSideEffects,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi_derive::napi(object))]
#[serde(rename_all = "camelCase")]
pub struct OutputChunk {
    pub file_name: String,
    pub code: String,
}

impl OutputChunk {
    pub fn new(file_name: &str, code: &str) -> Self {
        OutputChunk {
            file_name: file_name.to_string(),
            code: code.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi_derive::napi(object))]
#[serde(rename_all = "camelCase")]
pub struct EmitReport {
    pub chunks_scanned: u32,
    pub anchors_resolved: u32,
    pub host_payloads: u32,
    pub bindings_stripped: u32,
}

pub struct HoistSession<S: DevServer = SignalQueue> {
    options: ResolvedOptions,
    command: Command,
    cache: StyleCache,
    ledger: AssetLedger,
    adapter: Box<dyn AssetAdapter>,
    server: Option<S>,
}

impl<S: DevServer> HoistSession<S> {
    pub fn new(options: &HoistOptions, command: Command) -> HoistResult<Self> {
        Ok(HoistSession {
            options: options.resolve(command)?,
            command,
            cache: StyleCache::new(),
            ledger: AssetLedger::new(),
            adapter: Box::new(ViteAssetAdapter),
            server: None,
        })
    }

    pub fn with_adapter(mut self, adapter: Box<dyn AssetAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Attach the dev server once it is up. Invalidations requested before
    /// this point are dropped.
    pub fn configure_server(&mut self, server: S) {
        self.server = Some(server);
    }

    pub fn dev_server(&self) -> Option<&S> {
        self.server.as_ref()
    }

    pub fn dev_server_mut(&mut self) -> Option<&mut S> {
        self.server.as_mut()
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn cache(&self) -> &StyleCache {
        &self.cache
    }

    pub fn ledger(&self) -> &AssetLedger {
        &self.ledger
    }

    pub fn resolve_id(&self, id: &str) -> Option<&'static str> {
        (id == VIRTUAL_STYLE_ID).then_some(VIRTUAL_STYLE_ID)
    }

    /// Source of the virtual style module. Serve mode only; recomputed from
    /// the cache on every request.
    pub fn load(&self, id: &str) -> Option<String> {
        if id != VIRTUAL_STYLE_ID || self.command != Command::Serve {
            return None;
        }
        Some(virtual_module_source(&self.cache))
    }

    /// Hoist the style string out of `id`. `Ok(None)` leaves the module as is.
    pub fn transform(&mut self, code: &str, id: &str) -> HoistResult<Option<TransformOutput>> {
        if !is_style_module(id) {
            return Ok(None);
        }
        let Some(style) = extract_default_string(id, code)? else {
            trace!(id, "style module without a string default export");
            return Ok(None);
        };

        self.cache.record(id, &style);

        let code = match self.command {
            Command::Serve => self.serve_module(id),
            Command::Build => self.build_module(id, &style),
        };

        Ok(Some(TransformOutput {
            code,
            module_side_effects: ModuleSideEffects::NoTreeshake,
        }))
    }

    fn serve_module(&mut self, id: &str) -> String {
        match self.server.as_mut() {
            Some(server) => invalidate_styles(server),
            None => debug!(id, "no dev server attached, style invalidation skipped"),
        }

        if self.options.is_host(id) {
            format!(
                "import {{ styles }} from {}\nexport default styles",
                json_quote(VIRTUAL_STYLE_ID)
            )
        } else {
            format!("export default {}", GUEST_STYLES)
        }
    }

    fn build_module(&mut self, id: &str, style: &str) -> String {
        let refs = self.adapter.extract_references(style);
        debug!(id, bytes = style.len(), assets = refs.len(), "hoisted styles");

        let mut code = format!(
            "const styles = {};\nexport default styles;",
            Anchor::new(id).literal()
        );
        for reference in &refs {
            self.ledger.record(reference);
            code.push('\n');
            code.push_str(&self.adapter.binding_statement(reference));
        }
        code
    }

    /// Final emission over the whole bundle. Chunks are only written back
    /// once every eligible chunk has been processed without error.
    pub fn generate_bundle(&self, chunks: &mut [OutputChunk]) -> HoistResult<EmitReport> {
        let mut report = EmitReport::default();
        let eligible: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| self.options.is_entry_index(&c.file_name))
            .map(|(i, _)| i)
            .collect();
        report.chunks_scanned = count(eligible.len());

        // Rehoming must finish before any anchor receives the payload. The
        // bundler renders each resolved value for a double-quoted literal, so
        // splice it into the quoted payload, not the raw text.
        let mut host_styles = json_quote(&self.cache.concatenate());
        let mut rewritten: Vec<(usize, String)> = Vec::with_capacity(eligible.len());
        for &idx in &eligible {
            let chunk = &chunks[idx];
            let bindings = self.adapter.resolved_bindings(&chunk.code);
            if bindings.is_empty() {
                rewritten.push((idx, chunk.code.clone()));
                continue;
            }
            for binding in &bindings {
                let raw = self
                    .ledger
                    .get(&binding.hash)
                    .ok_or_else(|| HoistError::UnresolvedAsset {
                        hash: binding.hash.clone(),
                        file: chunk.file_name.clone(),
                    })?;
                host_styles = host_styles.replace(&json_inner(raw), &binding.resolved);
            }
            report.bindings_stripped = report.bindings_stripped.saturating_add(count(bindings.len()));
            rewritten.push((idx, self.adapter.strip_bindings(&chunk.code)));
        }

        for (idx, code) in rewritten.iter_mut() {
            let file = &chunks[*idx].file_name;
            let anchors = find_anchors(code, file)?;
            if anchors.is_empty() {
                continue;
            }

            let mut out = String::with_capacity(code.len() + host_styles.len());
            let mut last = 0;
            for found in &anchors {
                out.push_str(&code[last..found.range.start]);
                if self.options.is_host(found.anchor.origin()) {
                    out.push_str(&host_styles);
                    report.host_payloads = report.host_payloads.saturating_add(1);
                } else {
                    out.push_str(GUEST_STYLES);
                }
                last = found.range.end;
            }
            out.push_str(&code[last..]);

            report.anchors_resolved = report.anchors_resolved.saturating_add(count(anchors.len()));
            *code = out;
        }

        for (idx, code) in rewritten {
            chunks[idx].code = code;
        }

        info!(
            chunks = report.chunks_scanned,
            anchors = report.anchors_resolved,
            hosts = report.host_payloads,
            bindings = report.bindings_stripped,
            styles = self.cache.len(),
            "hoisted styles emitted"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_saturates() {
        assert_eq!(count(3), 3);
        assert_eq!(count(u32::MAX as usize), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(count(u32::MAX as usize + 1), u32::MAX);
    }
}
