//! Asset Reference Ledger and the host asset-encoding adapter.
//!
//! Style text captured at transform time can carry unresolved asset tokens
//! (`__VITE_ASSET__<hash>__`). The bundler only resolves tokens that sit in
//! real chunk code, so every token is mirrored into a binding statement in the
//! transformed module, and the resolved right-hand side is read back at
//! emission.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// Unresolved asset token, with the optional `$_<postfix>__` suffix.
    static ref VITE_ASSET_RE: Regex =
        Regex::new(r"__VITE_ASSET__([a-z\d]{8})__(?:\$_(.*?)__)?").unwrap();

    /// Binding statement after the bundler rewrote its right-hand side.
    static ref VITE_BINDING_RE: Regex =
        Regex::new(r"\n?const __([a-z\d]{8})__ = (.*?);").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub hash: String,
    pub raw_expression: String,
}

/// A binding statement found in emitted chunk code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub hash: String,
    pub resolved: String,
}

/// Narrow contract between the hoisting core and the bundler's internal
/// asset encoding. Swap the implementation if the encoding changes.
pub trait AssetAdapter {
    /// Asset tokens in `style_text`, first occurrence order, one per hash.
    fn extract_references(&self, style_text: &str) -> Vec<AssetReference>;

    /// A statement that keeps `raw_expression` visible to the bundler's resolver.
    fn binding_statement(&self, reference: &AssetReference) -> String;

    /// Binding statements present in rendered chunk code.
    fn resolved_bindings(&self, chunk_code: &str) -> Vec<ResolvedBinding>;

    /// `chunk_code` with every binding statement removed.
    fn strip_bindings(&self, chunk_code: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViteAssetAdapter;

impl AssetAdapter for ViteAssetAdapter {
    fn extract_references(&self, style_text: &str) -> Vec<AssetReference> {
        let mut refs: Vec<AssetReference> = Vec::new();
        for cap in VITE_ASSET_RE.captures_iter(style_text) {
            let hash = &cap[1];
            if refs.iter().any(|r| r.hash == hash) {
                continue;
            }
            refs.push(AssetReference {
                hash: hash.to_string(),
                raw_expression: cap[0].to_string(),
            });
        }
        refs
    }

    fn binding_statement(&self, reference: &AssetReference) -> String {
        format!(
            "const __{}__ = {};",
            reference.hash, reference.raw_expression
        )
    }

    fn resolved_bindings(&self, chunk_code: &str) -> Vec<ResolvedBinding> {
        VITE_BINDING_RE
            .captures_iter(chunk_code)
            .map(|cap| ResolvedBinding {
                hash: cap[1].to_string(),
                resolved: cap[2].to_string(),
            })
            .collect()
    }

    fn strip_bindings(&self, chunk_code: &str) -> String {
        VITE_BINDING_RE.replace_all(chunk_code, "").into_owned()
    }
}

/// Accumulated `hash -> raw expression` mapping across every transformed
/// module. Entries are only ever added or overwritten, never removed.
#[derive(Debug, Clone, Default)]
pub struct AssetLedger {
    entries: HashMap<String, String>,
}

impl AssetLedger {
    pub fn new() -> Self {
        AssetLedger::default()
    }

    pub fn record(&mut self, reference: &AssetReference) {
        self.entries
            .insert(reference.hash.clone(), reference.raw_expression.clone());
    }

    pub fn get(&self, hash: &str) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_and_postfixed_tokens() {
        let css = ".a{background:url(__VITE_ASSET__1a2b3c4d__)}\
                   .b{background:url(__VITE_ASSET__9f8e7d6c__$_?inline__)}";
        let refs = ViteAssetAdapter.extract_references(css);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].hash, "1a2b3c4d");
        assert_eq!(refs[0].raw_expression, "__VITE_ASSET__1a2b3c4d__");
        assert_eq!(refs[1].hash, "9f8e7d6c");
        assert_eq!(refs[1].raw_expression, "__VITE_ASSET__9f8e7d6c__$_?inline__");
    }

    #[test]
    fn test_extract_dedupes_repeated_hash() {
        let css = ".a{background:url(__VITE_ASSET__aaaaaaaa__)}.b{mask:url(__VITE_ASSET__aaaaaaaa__)}";
        let refs = ViteAssetAdapter.extract_references(css);
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_no_tokens() {
        assert!(ViteAssetAdapter
            .extract_references(".a{color:red}")
            .is_empty());
    }

    #[test]
    fn test_binding_statement_format() {
        let reference = AssetReference {
            hash: "1a2b3c4d".to_string(),
            raw_expression: "__VITE_ASSET__1a2b3c4d__".to_string(),
        };
        assert_eq!(
            ViteAssetAdapter.binding_statement(&reference),
            "const __1a2b3c4d__ = __VITE_ASSET__1a2b3c4d__;"
        );
    }

    #[test]
    fn test_resolved_bindings_and_strip() {
        let chunk = "const a = 1;\nconst __1a2b3c4d__ = /assets/bg.5f3a.png;\nexport { a };";
        let bindings = ViteAssetAdapter.resolved_bindings(chunk);

        assert_eq!(
            bindings,
            vec![ResolvedBinding {
                hash: "1a2b3c4d".to_string(),
                resolved: "/assets/bg.5f3a.png".to_string(),
            }]
        );
        assert_eq!(
            ViteAssetAdapter.strip_bindings(chunk),
            "const a = 1;\nexport { a };"
        );
    }

    #[test]
    fn test_ledger_accumulates() {
        let mut ledger = AssetLedger::new();
        for reference in ViteAssetAdapter.extract_references("url(__VITE_ASSET__11111111__)") {
            ledger.record(&reference);
        }
        for reference in ViteAssetAdapter.extract_references("url(__VITE_ASSET__22222222__)") {
            ledger.record(&reference);
        }
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get("11111111"), Some("__VITE_ASSET__11111111__"));
        assert_eq!(ledger.get("33333333"), None);
    }
}
