//! VirtualWorld implementation of the Typst World trait
//!
//! The world holds exactly one source file (the proposal template), the
//! fonts selected for this export and the template inputs. Nothing is read
//! from the filesystem.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Array, Bytes, Datetime, Dict, Str, Value};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, World};

use crate::error::ExportError;
use crate::fonts::FontCache;

const MAIN_PATH: &str = "/main.typ";

/// A virtual world for in-memory Typst compilation
pub struct VirtualWorld {
    main: Source,
    fonts: Arc<FontCache>,
    /// System inputs (accessible via sys.inputs in Typst)
    inputs: Dict,
    /// Date reported to the template, fixed for deterministic output
    today: NaiveDate,
    library: LazyHash<Library>,
}

impl VirtualWorld {
    /// Create a world compiling `source` with the given JSON object as `sys.inputs`
    pub fn new(
        source: &str,
        inputs: serde_json::Value,
        fonts: Arc<FontCache>,
        today: NaiveDate,
    ) -> Result<Self, ExportError> {
        let id = FileId::new(None, VirtualPath::new(MAIN_PATH));
        let TemplateInputs(inputs) = TemplateInputs::try_from(inputs)?;
        let library = Library::builder().with_inputs(inputs.clone()).build();

        Ok(Self {
            main: Source::new(id, source.to_string()),
            fonts,
            inputs,
            today,
            library: LazyHash::new(library),
        })
    }

    pub fn inputs(&self) -> &Dict {
        &self.inputs
    }
}

/// Top-level `sys.inputs` dictionary
struct TemplateInputs(Dict);

impl TryFrom<serde_json::Value> for TemplateInputs {
    type Error = ExportError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match typst_value(json)? {
            Value::Dict(dict) => Ok(Self(dict)),
            _ => Err(ExportError::InvalidInput(
                "template inputs must be a JSON object".to_string(),
            )),
        }
    }
}

fn typst_value(json: serde_json::Value) -> Result<Value, ExportError> {
    use serde_json::Value as Json;

    let value = match json {
        Json::Null => Value::None,
        Json::Bool(flag) => Value::Bool(flag),
        Json::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(int), _) => Value::Int(int),
            (None, Some(float)) => Value::Float(float),
            (None, None) => {
                return Err(ExportError::InvalidInput(format!(
                    "number out of range: {number}"
                )))
            }
        },
        Json::String(text) => Value::Str(text.into()),
        Json::Array(items) => Value::Array(
            items
                .into_iter()
                .map(typst_value)
                .collect::<Result<Array, _>>()?,
        ),
        Json::Object(fields) => Value::Dict(
            fields
                .into_iter()
                .map(|(key, field)| Ok((Str::from(key), typst_value(field)?)))
                .collect::<Result<Dict, ExportError>>()?,
        ),
    };
    Ok(value)
}

impl World for VirtualWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.fonts.book()
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.font(index)
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        Datetime::from_ymd(
            self.today.year(),
            self.today.month() as u8,
            self.today.day() as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::embedded_font_cache;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_virtual_world_serves_main_source() {
        let world = VirtualWorld::new(
            "Hello, World!",
            serde_json::json!({}),
            embedded_font_cache(),
            date(),
        )
        .unwrap();

        let source = world.source(world.main()).unwrap();
        assert_eq!(source.text(), "Hello, World!");
    }

    #[test]
    fn test_other_files_are_not_found() {
        let world =
            VirtualWorld::new("x", serde_json::json!({}), embedded_font_cache(), date()).unwrap();
        let other = FileId::new(None, VirtualPath::new("/logo.png"));

        assert!(world.file(other).is_err());
        assert!(world.source(other).is_err());
    }

    #[test]
    fn test_nested_input_conversion() {
        let inputs = serde_json::json!({
            "proposal": {
                "title": "Offer",
                "sections": [{"items": [["a", "1"]]}],
                "count": 3
            }
        });
        let world = VirtualWorld::new("x", inputs, embedded_font_cache(), date()).unwrap();
        assert!(world.inputs().contains("proposal"));
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let inputs = serde_json::json!({ "amount": u64::MAX, "qty": 4 });
        let world = VirtualWorld::new("x", inputs, embedded_font_cache(), date()).unwrap();

        assert!(matches!(world.inputs().get("amount"), Ok(Value::Float(_))));
        assert!(matches!(world.inputs().get("qty"), Ok(Value::Int(4))));
    }

    #[test]
    fn test_non_object_inputs_are_rejected() {
        let inputs = serde_json::json!([1, 2]);
        let result = VirtualWorld::new("x", inputs, embedded_font_cache(), date());
        assert!(matches!(result, Err(ExportError::InvalidInput(_))));
    }

    #[test]
    fn test_today_is_fixed() {
        let world =
            VirtualWorld::new("x", serde_json::json!({}), embedded_font_cache(), date()).unwrap();
        let today = world.today(None).unwrap();
        assert_eq!(today.year(), Some(2026));
        assert_eq!(today.month(), Some(10));
        assert_eq!(today.day(), Some(19));
    }
}
