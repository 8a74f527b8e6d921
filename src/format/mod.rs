//! Text-format handlers for the concrete mapping file dialects.
//!
//! Each handler knows one line-oriented format and moves data between text
//! and [`FrozenMappings`] through the builder and iteration surfaces.
//! Handlers are looked up by file extension through a [`FormatRegistry`],
//! which the embedding application constructs once: the built-in table plus
//! whatever external handlers it wants to register.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use failure::Error;
use failure_derive::Fail;
use indexmap::IndexMap;

use crate::mappings::FrozenMappings;

mod exc;
mod frg;
mod rgs;
mod srg;

pub use self::exc::ExcMappingsFormat;
pub use self::frg::FrgMappingsFormat;
pub use self::rgs::RgsMappingsFormat;
pub use self::srg::SrgMappingsFormat;

/// A handler for one mapping file dialect.
///
/// The capability flags tell driver code what a dialect can express; a
/// handler that reports `false` for a capability silently drops that data
/// when writing and never produces it when parsing.
pub trait MappingsFormat {
    /// The file extensions this handler instance answers to.
    fn extensions(&self) -> &[&'static str];
    /// Parses whole mapping text into frozen mappings.
    fn parse_text(&self, text: &str) -> Result<FrozenMappings, Error>;
    /// Serializes mappings in this handler's dialect.
    fn write(&self, _mappings: &FrozenMappings, _output: &mut dyn Write) -> Result<(), Error> {
        Err(UnsupportedOperation(self.extensions().join(", ")).into())
    }
    /// Whether this dialect carries method exception data.
    fn supports_exception_data(&self) -> bool {
        false
    }
    /// Whether this dialect carries parameter name data.
    fn supports_parameter_data(&self) -> bool {
        false
    }
    /// Whether this dialect distinguishes fields by descriptor.
    fn supports_field_descriptors(&self) -> bool {
        false
    }
    /// Whether this dialect carries class/field/method renames at all.
    fn supports_remapping_data(&self) -> bool {
        true
    }
}

/// A parse failure tagged with the 1-based line it occurred on.
#[derive(Debug, Fail)]
#[fail(display = "Error reading line {}: {}", line, message)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}
impl ParseError {
    pub(crate) fn new<S: Into<String>>(line: usize, message: S) -> Error {
        ParseError { line, message: message.into() }.into()
    }
}

/// Splits a slash-joined member path like `my/pkg/Foo/count` into its
/// class and member name parts. Both parts must be non-empty.
pub(crate) fn split_member_path(path: &str, number: usize) -> Result<(&str, &str), Error> {
    match path.rfind('/') {
        Some(index) if index > 0 && index + 1 < path.len() => {
            Ok((&path[..index], &path[index + 1..]))
        }
        Some(_) => Err(ParseError::new(number, "Empty segment in member path")),
        None => Err(ParseError::new(number, "Class member names must contain slash")),
    }
}

#[derive(Debug, Fail)]
#[fail(display = "No mappings format registered for {:?}", _0)]
pub struct UnsupportedFormat(pub String);

#[derive(Debug, Fail)]
#[fail(display = "The {} format does not support writing", _0)]
pub struct UnsupportedOperation(String);

pub type FormatHandler = Arc<dyn MappingsFormat + Send + Sync>;

/// Extension -> handler table with init-once semantics: build it at process
/// start from [`FormatRegistry::builtin`] plus any externally registered
/// handlers, then share it read-only.
pub struct FormatRegistry {
    handlers: IndexMap<String, FormatHandler>,
}
impl FormatRegistry {
    /// An empty table.
    pub fn empty() -> FormatRegistry {
        FormatRegistry { handlers: IndexMap::new() }
    }
    /// The table of built-in handlers: frg, frg2, srg, rgs and exc.
    pub fn builtin() -> FormatRegistry {
        let mut registry = FormatRegistry::empty();
        registry.register(Arc::new(FrgMappingsFormat::new(false)));
        registry.register(Arc::new(FrgMappingsFormat::new(true)));
        registry.register(Arc::new(SrgMappingsFormat));
        registry.register(Arc::new(RgsMappingsFormat));
        registry.register(Arc::new(ExcMappingsFormat));
        registry
    }
    /// Registers a handler for all its extensions; the latest registration
    /// wins per extension.
    pub fn register(&mut self, handler: FormatHandler) {
        for extension in handler.extensions() {
            self.handlers.insert((*extension).to_owned(), handler.clone());
        }
    }
    pub fn find(&self, extension: &str) -> Option<&(dyn MappingsFormat + Send + Sync)> {
        self.handlers.get(extension).map(|handler| &**handler)
    }
    /// Resolves a handler from the text after a file name's last dot.
    pub fn find_for_file(&self, file_name: &str) -> Option<&(dyn MappingsFormat + Send + Sync)> {
        let extension = match file_name.rfind('.') {
            Some(index) => &file_name[index + 1..],
            None => file_name,
        };
        self.find(extension)
    }
    /// Parses the mappings file at `path` with the handler its extension
    /// selects.
    pub fn parse_path(&self, path: &Path) -> Result<FrozenMappings, Error> {
        let handler = self.handler_for_path(path)?;
        let text = fs::read_to_string(path)?;
        handler.parse_text(&text)
    }
    /// Writes `mappings` to `path` with the handler its extension selects.
    pub fn write_path(&self, mappings: &FrozenMappings, path: &Path) -> Result<(), Error> {
        let handler = self.handler_for_path(path)?;
        let mut writer = BufWriter::new(File::create(path)?);
        handler.write(mappings, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
    fn handler_for_path(&self, path: &Path) -> Result<&(dyn MappingsFormat + Send + Sync), Error> {
        let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");
        self.find_for_file(file_name)
            .ok_or_else(|| Error::from(UnsupportedFormat(file_name.to_owned())))
    }
}
impl Default for FormatRegistry {
    #[inline]
    fn default() -> FormatRegistry {
        FormatRegistry::builtin()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_extensions_resolve() {
        let registry = FormatRegistry::builtin();
        for extension in &["frg", "frg2", "srg", "rgs", "exc"] {
            assert!(registry.find(extension).is_some(), "missing handler for {}", extension);
        }
        assert!(registry.find("tiny").is_none());
    }

    #[test]
    fn file_names_resolve_by_last_extension() {
        let registry = FormatRegistry::builtin();
        assert!(registry.find_for_file("client.1.0.srg").is_some());
        assert!(registry.find_for_file("noextension").is_none());
    }

    #[test]
    fn capability_flags() {
        let registry = FormatRegistry::builtin();
        let frg = registry.find("frg").unwrap();
        assert!(frg.supports_exception_data());
        assert!(frg.supports_field_descriptors());
        assert!(frg.supports_remapping_data());
        let exc = registry.find("exc").unwrap();
        assert!(exc.supports_exception_data());
        assert!(exc.supports_parameter_data());
        assert!(!exc.supports_remapping_data());
        let srg = registry.find("srg").unwrap();
        assert!(!srg.supports_exception_data());
        assert!(!srg.supports_field_descriptors());
    }

    struct NullFormat;
    impl MappingsFormat for NullFormat {
        fn extensions(&self) -> &[&'static str] {
            &["frg", "null"]
        }
        fn parse_text(&self, _text: &str) -> Result<FrozenMappings, Error> {
            Ok(FrozenMappings::default())
        }
        fn supports_remapping_data(&self) -> bool {
            false
        }
    }

    #[test]
    fn external_registrations_override_builtins() {
        let mut registry = FormatRegistry::builtin();
        registry.register(Arc::new(NullFormat));
        assert!(registry.find("null").is_some());
        assert!(!registry.find("frg").unwrap().supports_remapping_data());
    }

    #[test]
    fn rgs_has_no_writer() {
        let registry = FormatRegistry::builtin();
        let rgs = registry.find("rgs").unwrap();
        let mut buffer = Vec::new();
        assert!(rgs.write(&FrozenMappings::default(), &mut buffer).is_err());
    }
}
