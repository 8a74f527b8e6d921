//! SRG mappings: `CL:`/`FD:`/`MD:` lines with slash-joined member paths.
//! `PK:` package lines are recognized but carry nothing we model as a
//! per-package rename, so they are skipped.

use std::io::Write;

use failure::Error;

use crate::builder::MappingsBuilder;
use crate::format::{split_member_path, MappingsFormat, ParseError};
use crate::mappings::FrozenMappings;
use crate::member::MemberKey;

pub struct SrgMappingsFormat;

impl MappingsFormat for SrgMappingsFormat {
    fn extensions(&self) -> &[&'static str] {
        &["srg"]
    }
    fn parse_text(&self, text: &str) -> Result<FrozenMappings, Error> {
        let mut builder = MappingsBuilder::new();
        for (index, line) in text.lines().enumerate() {
            let number = index + 1;
            if !line.contains(' ') {
                return Err(ParseError::new(number, "Line does not contain command"));
            }
            let parts: Vec<&str> = line.split(' ').collect();
            if parts.iter().any(|part| part.is_empty()) {
                return Err(ParseError::new(number, "Blank token in line"));
            }
            match parts[0] {
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
                    if parts.len() != 3 {
                        return Err(ParseError::new(
                            number,
                            format!("Field mappings need 2 arguments, {} given", parts.len() - 1),
                        ));
                    }
                    let (class_name, name) = split_member_path(parts[1], number)?;
                    let (_, renamed) = split_member_path(parts[2], number)?;
                    builder.add_field_mapping(class_name, MemberKey::named(name), renamed);
                }
                "MD:" => {
                    if parts.len() != 5 {
                        return Err(ParseError::new(
                            number,
                            format!("Method mappings need 4 arguments, {} given", parts.len() - 1),
                        ));
                    }
                    let (class_name, name) = split_member_path(parts[1], number)?;
                    let (_, renamed) = split_member_path(parts[3], number)?;
                    // parts[4] is the pre-remapped descriptor, re-derivable
                    builder.add_method_mapping(class_name, MemberKey::typed(name, parts[2]), renamed);
                }
                "PK:" => {}
                command => {
                    return Err(ParseError::new(number, format!("Unknown entry {:?}", command)));
                }
            }
        }
        Ok(builder.build())
    }
    fn write(&self, mappings: &FrozenMappings, output: &mut dyn Write) -> Result<(), Error> {
        for (class_name, renamed) in mappings.classes() {
            writeln!(output, "CL: {} {}", class_name, renamed)?;
        }
        for (class_name, key, renamed) in mappings.fields() {
            writeln!(
                output,
                "FD: {}/{} {}/{}",
                class_name,
                key.name(),
                mappings.remap_class(class_name),
                renamed
            )?;
        }
        for (class_name, key, renamed) in mappings.methods() {
            let desc = key.desc().unwrap_or("");
            writeln!(
                output,
                "MD: {}/{} {} {}/{} {}",
                class_name,
                key.name(),
                desc,
                mappings.remap_class(class_name),
                renamed,
                mappings.remap_descriptor(desc)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "\
PK: ./ net/minecraft/src
CL: a my/pkg/Foo
FD: a/b my/pkg/Foo/count
MD: a/c (La;)V my/pkg/Foo/update (Lmy/pkg/Foo;)V
";

    #[test]
    fn parses_slash_joined_paths() {
        let mappings = SrgMappingsFormat.parse_text(SAMPLE).unwrap();
        assert_eq!(mappings.remap_class("a"), "my/pkg/Foo");
        assert_eq!(mappings.field_name("a", &MemberKey::named("b")), Some("count"));
        assert_eq!(
            mappings.method_name("a", &MemberKey::typed("c", "(La;)V")),
            Some("update")
        );
    }

    #[test]
    fn rejects_unknown_commands_and_bad_arity() {
        assert!(SrgMappingsFormat.parse_text("QQ: a b\n").is_err());
        assert!(SrgMappingsFormat.parse_text("CL: a\n").is_err());
        assert!(SrgMappingsFormat.parse_text("FD: nopath alsonone\n").is_err());
        assert!(SrgMappingsFormat.parse_text("nocommand\n").is_err());
    }

    #[test]
    fn empty_path_segments_are_errors_not_panics() {
        let error = SrgMappingsFormat.parse_text("FD: a/ b/c\n").unwrap_err();
        assert!(format!("{}", error).contains("line 1"));
        assert!(SrgMappingsFormat.parse_text("FD: /b c/d\n").is_err());
        assert!(SrgMappingsFormat.parse_text("CL: a  b\n").is_err());
        assert!(SrgMappingsFormat.parse_text("MD: a/  (La;)V b/c (Lb;)V\n").is_err());
    }

    #[test]
    fn writes_remapped_paths_and_descriptors() {
        let mappings = SrgMappingsFormat.parse_text(SAMPLE).unwrap();
        let mut buffer = Vec::new();
        SrgMappingsFormat.write(&mappings, &mut buffer).unwrap();
        let written = String::from_utf8(buffer).unwrap();
        assert!(written.contains("CL: a my/pkg/Foo"));
        assert!(written.contains("FD: a/b my/pkg/Foo/count"));
        assert!(written.contains("MD: a/c (La;)V my/pkg/Foo/update (Lmy/pkg/Foo;)V"));
    }
}
