pub mod ast;
pub mod cell;
pub mod document;
pub mod drawio;
pub mod error;
pub mod field;
pub mod id;
pub mod lexer;
pub mod measure;
pub mod parser;
pub mod puml;
pub mod resolve;
pub mod shape;
pub mod style;

use std::io::ErrorKind;
use std::path::Path;

use wasm_bindgen::prelude::*;

use ast::Schema;
use document::{DiagramOptions, DocumentAssembler};
pub use error::Error;
use id::{IdSource, RandomIds};
use parser::Parser;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

pub fn parse_schema(source: &str) -> Result<Schema, Error> {
    let mut parser = Parser::new(source)?;
    Ok(parser.parse()?)
}

/// Reads and parses a schema file. A missing file is `InputUnavailable`.
pub fn read_schema(path: &Path) -> Result<Schema, Error> {
    let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::InputUnavailable(path.to_path_buf()),
        _ => Error::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    parse_schema(&source)
}

pub fn schema_to_drawio(
    schema: &Schema,
    options: DiagramOptions,
    ids: &mut dyn IdSource,
) -> Result<String, Error> {
    let doc = DocumentAssembler::new(options).assemble(schema, ids)?;
    Ok(drawio::serialize(&doc))
}

pub fn dbml_to_drawio(source: &str, options: DiagramOptions, ids: &mut dyn IdSource) -> Result<String, Error> {
    let schema = parse_schema(source)?;
    schema_to_drawio(&schema, options, ids)
}

pub fn dbml_to_puml(source: &str, title: &str) -> Result<String, Error> {
    let schema = parse_schema(source)?;
    Ok(puml::render(&schema, title))
}

/// File name up to its first `.`: `dist/files/shop.v2.dbml` -> `shop`.
pub fn output_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or(name);
    if stem.is_empty() { None } else { Some(stem) }
}

/// Render DBML source to draw.io XML
#[wasm_bindgen(js_name = "dbmlToDrawio")]
pub fn render_drawio(source: &str, strict: Option<bool>) -> Result<String, String> {
    let options = DiagramOptions {
        strict: strict.unwrap_or(false),
        ..Default::default()
    };
    dbml_to_drawio(source, options, &mut RandomIds::new()).map_err(|e| e.to_string())
}

/// Render DBML source to PlantUML
#[wasm_bindgen(js_name = "dbmlToPuml")]
pub fn render_puml(source: &str, title: Option<String>) -> Result<String, String> {
    let title = title.as_deref().unwrap_or(puml::DEFAULT_TITLE);
    dbml_to_puml(source, title).map_err(|e| e.to_string())
}
