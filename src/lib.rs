//! # Custom-Element Style Hoisting
//!
//! Moves the style string out of every custom-element style module and
//! serves it, concatenated, from one designated host component.
//!
//! ## Invariants
//!
//! 1. **One Record Per Module**: the style cache holds at most one entry per
//!    module id. Recompiling a module replaces its text in place; its
//!    position (and so its cascade precedence) never moves.
//!
//! 2. **Host/Guest Split**: every module id is either host (matches the
//!    `hostComponent` pattern, receives the full payload) or guest (receives
//!    `''`). Classification is stateless.
//!
//! 3. **Rehome Before Substitute**: resolved asset URLs are written into the
//!    payload before any anchor is replaced with it.
//!
//! 4. **Idempotent Emission**: emission removes every anchor and binding
//!    statement it consumes, so a second run over the same output changes
//!    nothing.
//!
//! 5. **All Or Nothing**: a failing emission leaves every chunk untouched.

mod anchor;
mod assets;
mod dev;
mod error;
mod extract;
mod options;
mod session;
mod style_cache;

#[cfg(feature = "napi")]
mod napi_bridge;


pub use anchor::{find_anchors, Anchor, AnchorMatch, ANCHOR_BEGIN, ANCHOR_END};
pub use assets::{AssetAdapter, AssetLedger, AssetReference, ResolvedBinding, ViteAssetAdapter};
pub use dev::{virtual_module_source, DevServer, DevSignal, SignalQueue, VIRTUAL_STYLE_ID};
pub use error::{HoistError, HoistResult};
pub use extract::{extract_default_string, is_style_module};
pub use options::{Command, HoistOptions, ResolvedOptions, DEFAULT_INDEX_PATTERN};
pub use session::{EmitReport, HoistSession, ModuleSideEffects, OutputChunk, TransformOutput};
pub use style_cache::{ModuleStyleRecord, StyleCache};

#[cfg(feature = "napi")]
pub use napi_bridge::HoistSessionNative;
