//! JavaScript bindings. The bundler plugin glue constructs one
//! `HoistSession` per build or dev-server lifetime and forwards its hooks.

use napi_derive::napi;

use crate::dev::SignalQueue;
use crate::options::{Command, HoistOptions};
use crate::session::{EmitReport, HoistSession, OutputChunk};

#[napi(object)]
pub struct TransformResultNative {
    pub code: String,
    pub module_side_effects: String,
    pub map: Option<String>,
}

#[napi(object)]
pub struct GenerateBundleResult {
    pub chunks: Vec<OutputChunk>,
    pub report: EmitReport,
}

#[napi(js_name = "HoistSession")]
pub struct HoistSessionNative {
    inner: HoistSession<SignalQueue>,
}

#[napi]
impl HoistSessionNative {
    #[napi(constructor)]
    pub fn new(options: Option<serde_json::Value>, command: String) -> napi::Result<Self> {
        let options: HoistOptions = options
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| napi::Error::from_reason(format!("Invalid options: {}", e)))?
            .unwrap_or_default();
        let command: Command = command.parse()?;
        Ok(HoistSessionNative {
            inner: HoistSession::new(&options, command)?,
        })
    }

    /// Called from `configureServer`. Signals queue up from here on.
    #[napi]
    pub fn attach_dev_server(&mut self) {
        self.inner.configure_server(SignalQueue::new());
    }

    /// Pending `invalidate-module` / `full-reload` signals, oldest first.
    #[napi]
    pub fn take_dev_signals(&mut self) -> napi::Result<serde_json::Value> {
        let signals = self
            .inner
            .dev_server_mut()
            .map(SignalQueue::drain)
            .unwrap_or_default();
        serde_json::to_value(signals).map_err(|e| napi::Error::from_reason(e.to_string()))
    }

    #[napi]
    pub fn resolve_id(&self, id: String) -> Option<String> {
        self.inner.resolve_id(&id).map(str::to_string)
    }

    #[napi]
    pub fn load(&self, id: String) -> Option<String> {
        self.inner.load(&id)
    }

    #[napi]
    pub fn transform(&mut self, code: String, id: String) -> napi::Result<Option<TransformResultNative>> {
        let output = self.inner.transform(&code, &id)?;
        Ok(output.map(|out| TransformResultNative {
            code: out.code,
            module_side_effects: out.module_side_effects.as_str().to_string(),
            map: None,
        }))
    }

    /// Rewrites the given chunks and hands them back; the glue copies each
    /// `code` onto the matching bundle entry.
    #[napi]
    pub fn generate_bundle(&self, chunks: Vec<OutputChunk>) -> napi::Result<GenerateBundleResult> {
        let mut chunks = chunks;
        let report = self.inner.generate_bundle(&mut chunks)?;
        Ok(GenerateBundleResult { chunks, report })
    }
}
