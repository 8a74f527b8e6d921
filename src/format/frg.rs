//! Fergie mappings: `CL:`/`FD:`/`MD:` lines, plus `DF:` field entries with
//! descriptors in the second-generation `frg2` dialect. `MD:` lines may
//! carry trailing exception class names.

use std::io::Write;

use failure::Error;
use log::warn;

use crate::builder::MappingsBuilder;
use crate::format::{MappingsFormat, ParseError};
use crate::mappings::FrozenMappings;
use crate::member::MemberKey;

pub struct FrgMappingsFormat {
    /// frg2 writes `DF:` lines for descriptor-carrying field entries.
    emit_field_descriptors: bool,
}
impl FrgMappingsFormat {
    pub fn new(emit_field_descriptors: bool) -> FrgMappingsFormat {
        FrgMappingsFormat { emit_field_descriptors }
    }
}
impl MappingsFormat for FrgMappingsFormat {
    fn extensions(&self) -> &[&'static str] {
        if self.emit_field_descriptors { &["frg2"] } else { &["frg"] }
    }
    fn parse_text(&self, text: &str) -> Result<FrozenMappings, Error> {
        let mut builder = MappingsBuilder::new();
        for (index, line) in text.lines().enumerate() {
            let number = index + 1;
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split(' ').collect();
            match parts[0] {
                "CL:" | "FD:" | "DF:" | "MD:" if parts.iter().any(|part| part.is_empty()) => {
                    return Err(ParseError::new(number, "Blank argument in line"));
                }
                "CL:" => {
                    if parts.len() != 3 {
                        return Err(ParseError::new(
                            number,
                            format!("Class mappings need 2 arguments, {} given", parts.len() - 1),
                        ));
                    }
                    builder.add_class_mapping(parts[1], parts[2]);
                }
                "FD:" => {
                    if parts.len() != 4 {
                        return Err(ParseError::new(
                            number,
                            format!("Field mappings need 3 arguments, {} given", parts.len() - 1),
                        ));
                    }
                    builder.add_field_mapping(parts[1], MemberKey::named(parts[2]), parts[3]);
                }
                "DF:" => {
                    if parts.len() != 5 {
                        return Err(ParseError::new(
                            number,
                            format!("Descriptored field mappings need 4 arguments, {} given", parts.len() - 1),
                        ));
                    }
                    builder.add_field_mapping(parts[1], MemberKey::typed(parts[2], parts[3]), parts[4]);
                }
                "MD:" => {
                    if parts.len() < 5 {
                        return Err(ParseError::new(
                            number,
                            format!("Method mappings need at least 4 arguments, {} given", parts.len() - 1),
                        ));
                    }
                    let key = MemberKey::typed(parts[2], parts[3]);
                    builder.add_method_mapping(parts[1], key.clone(), parts[4]);
                    if parts.len() > 5 {
                        builder.add_exceptions(
                            parts[1],
                            key,
                            parts[5..].iter().map(|s| (*s).to_owned()),
                        );
                    }
                }
                _ => warn!("Not operating on line {:?}", line),
            }
        }
        Ok(builder.build())
    }
    fn write(&self, mappings: &FrozenMappings, output: &mut dyn Write) -> Result<(), Error> {
        let mut lines = Vec::new();
        for (class_name, renamed) in mappings.classes() {
            lines.push(format!("CL: {} {}", class_name, renamed));
        }
        for (class_name, key, renamed) in mappings.fields() {
            match key.desc() {
                Some(desc) if self.emit_field_descriptors => {
                    lines.push(format!("DF: {} {} {} {}", class_name, key.name(), desc, renamed));
                }
                _ => lines.push(format!("FD: {} {} {}", class_name, key.name(), renamed)),
            }
        }
        for (class_name, key, renamed) in mappings.methods() {
            let mut line = format!(
                "MD: {} {} {} {}",
                class_name,
                key.name(),
                key.desc().unwrap_or(""),
                renamed
            );
            let mut exceptions: Vec<String> = mappings.exceptions(class_name, key).into_iter().collect();
            exceptions.sort();
            for exception in &exceptions {
                line.push(' ');
                line.push_str(exception);
            }
            lines.push(line);
        }
        lines.sort();
        for line in &lines {
            writeln!(output, "{}", line)?;
        }
        Ok(())
    }
    fn supports_exception_data(&self) -> bool {
        true
    }
    fn supports_field_descriptors(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "\
CL: a my/pkg/Foo
DF: a c I total
FD: a b count
MD: a d (La;)V update java/io/IOException
";

    #[test]
    fn parses_all_entry_kinds() {
        let mappings = FrgMappingsFormat::new(true).parse_text(SAMPLE).unwrap();
        assert_eq!(mappings.remap_class("a"), "my/pkg/Foo");
        assert_eq!(mappings.field_name("a", &MemberKey::named("b")), Some("count"));
        assert_eq!(mappings.field_name("a", &MemberKey::typed("c", "I")), Some("total"));
        let key = MemberKey::typed("d", "(La;)V");
        assert_eq!(mappings.method_name("a", &key), Some("update"));
        assert!(mappings.exceptions("a", &key).contains("java/io/IOException"));
    }

    #[test]
    fn unknown_prefixes_are_skipped() {
        let mappings = FrgMappingsFormat::new(false)
            .parse_text("XX: who knows\nCL: a Foo\n")
            .unwrap();
        assert_eq!(mappings.remap_class("a"), "Foo");
    }

    #[test]
    fn short_class_line_is_an_error() {
        assert!(FrgMappingsFormat::new(false).parse_text("CL: a\n").is_err());
    }

    #[test]
    fn blank_arguments_are_errors_not_panics() {
        let error = FrgMappingsFormat::new(false).parse_text("FD: a  b\n").unwrap_err();
        assert!(format!("{}", error).contains("line 1"));
        assert!(FrgMappingsFormat::new(true).parse_text("MD: a  (La;)V x\n").is_err());
        assert!(FrgMappingsFormat::new(true).parse_text("DF: a c  total\n").is_err());
    }

    #[test]
    fn writes_sorted_lines_with_exceptions() {
        let mappings = FrgMappingsFormat::new(true).parse_text(SAMPLE).unwrap();
        let mut buffer = Vec::new();
        FrgMappingsFormat::new(true).write(&mappings, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), SAMPLE);
    }

    #[test]
    fn frg_writer_flattens_descriptored_fields() {
        let mappings = FrgMappingsFormat::new(true).parse_text("DF: a c I total\n").unwrap();
        let mut buffer = Vec::new();
        FrgMappingsFormat::new(false).write(&mappings, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "FD: a c total\n");
    }
}
