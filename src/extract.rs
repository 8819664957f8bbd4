//! Style module detection.
//!
//! A custom-element SFC compiled in style mode emits a module of the exact
//! form `export default "<css>"`. That string is what gets hoisted.

use oxc_allocator::Allocator;
use oxc_ast::ast::{ExportDefaultDeclarationKind, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::{HoistError, HoistResult};

/// Does `id` name a module whose output may be a style string?
/// `&direct` requests are raw CSS served to `<link>` tags and never hoisted.
pub fn is_style_module(id: &str) -> bool {
    if id.contains("&direct") {
        return false;
    }
    id.contains(".css") || id.contains("&type=style")
}

/// The style text of a module whose first statement is a default-exported
/// string literal. `Ok(None)` for any other shape, or an empty string.
pub fn extract_default_string(id: &str, code: &str) -> HoistResult<Option<String>> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let ret = Parser::new(&allocator, code, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(HoistError::Parse {
            id: id.to_string(),
            message,
        });
    }

    let Some(Statement::ExportDefaultDeclaration(decl)) = ret.program.body.first() else {
        return Ok(None);
    };

    match &decl.declaration {
        ExportDefaultDeclarationKind::StringLiteral(lit) if !lit.value.is_empty() => {
            Ok(Some(lit.value.to_string()))
        }
        _ => Ok(None),
    }
}
