//! RetroGuard scripts. Only four directives matter to us: `.class_map`,
//! `.field_map` and `.method_map` carry renames, and bare `.class` glob
//! directives come in pairs that describe a package relocation (the first
//! glob selects classes, the second names the target package).

use failure::Error;

use crate::builder::MappingsBuilder;
use crate::format::{split_member_path, MappingsFormat, ParseError};
use crate::mappings::FrozenMappings;
use crate::member::MemberKey;

pub struct RgsMappingsFormat;

impl MappingsFormat for RgsMappingsFormat {
    fn extensions(&self) -> &[&'static str] {
        &["rgs"]
    }
    fn parse_text(&self, text: &str) -> Result<FrozenMappings, Error> {
        let mut builder = MappingsBuilder::new();
        let mut globs: Vec<(usize, &str)> = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let number = index + 1;
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            let words: Vec<&str> = line.split(' ').collect();
            if words.len() < 2 {
                return Err(ParseError::new(number, "Directive given with no arguments"));
            }
            match words[0] {
                ".class" | ".class_map" | ".field_map" | ".method_map"
                    if words.iter().any(|word| word.is_empty()) =>
                {
                    return Err(ParseError::new(number, "Blank argument in directive"));
                }
                ".class" => {
                    // .class lines with trailing access modifiers don't
                    // describe relocations
                    if words.len() == 2 {
                        globs.push((number, words[1]));
                    }
                }
                ".class_map" => {
                    if words.len() < 3 {
                        return Err(ParseError::new(
                            number,
                            format!("Expected at least 2 arguments, got {}", words.len() - 1),
                        ));
                    }
                    builder.add_class_mapping(words[1], words[2]);
                }
                ".field_map" => {
                    if words.len() < 3 {
                        return Err(ParseError::new(
                            number,
                            format!("Expected at least 2 arguments, got {}", words.len() - 1),
                        ));
                    }
                    let (class_name, name) = split_member_path(words[1], number)?;
                    builder.add_field_mapping(class_name, MemberKey::named(name), words[2]);
                }
                ".method_map" => {
                    if words.len() < 4 {
                        return Err(ParseError::new(
                            number,
                            format!("Expected at least 3 arguments, got {}", words.len() - 1),
                        ));
                    }
                    let (class_name, name) = split_member_path(words[1], number)?;
                    builder.add_method_mapping(class_name, MemberKey::typed(name, words[2]), words[3]);
                }
                // RGS files carry plenty of other directives (access
                // modifiers, attribute filters); none of them map to renames
                _ => {}
            }
        }
        let mut pairs = globs.chunks_exact(2);
        for pair in &mut pairs {
            let (number, pattern_glob) = pair[0];
            let (_, target_glob) = pair[1];
            let prefix = match pattern_glob.rfind('*') {
                Some(index) => &pattern_glob[..index],
                None => return Err(ParseError::new(number, "Relocation source must contain a glob")),
            };
            builder
                .add_package_relocation(&format!("{}[^/]+", regex::escape(prefix)), target_glob.replace("**", ""))
                .map_err(|e| ParseError::new(number, format!("{}", e)))?;
        }
        if let Some(&(number, _)) = pairs.remainder().first() {
            return Err(ParseError::new(number, "Unpaired .class relocation directive"));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "\
# RetroGuard script
.class old/pkg/* public
.class old/pkg/*
.class new/pkg/**
.class_map a my/pkg/Foo
.field_map a/b count
.method_map a/c (La;)V update
.option Application
";

    #[test]
    fn parses_directives() {
        let mappings = RgsMappingsFormat.parse_text(SAMPLE).unwrap();
        assert_eq!(mappings.remap_class("a"), "my/pkg/Foo");
        assert_eq!(mappings.field_name("a", &MemberKey::named("b")), Some("count"));
        assert_eq!(
            mappings.method_name("a", &MemberKey::typed("c", "(La;)V")),
            Some("update")
        );
    }

    #[test]
    fn paired_class_globs_become_relocations() {
        let mappings = RgsMappingsFormat.parse_text(SAMPLE).unwrap();
        assert_eq!(mappings.remap_class("old/pkg/Thing"), "new/pkg/Thing");
        // The relocated class still gets its bare rename applied
        assert_eq!(mappings.remap_class("old/pkg/a"), "new/pkg/my/pkg/Foo");
        assert_eq!(mappings.remap_class("elsewhere/Thing"), "elsewhere/Thing");
    }

    #[test]
    fn blank_arguments_are_errors_not_panics() {
        let error = RgsMappingsFormat
            .parse_text(".method_map a/c  (La;)V update\n")
            .unwrap_err();
        assert!(format!("{}", error).contains("line 1"));
        assert!(RgsMappingsFormat.parse_text(".field_map a/ x\n").is_err());
    }

    #[test]
    fn unpaired_glob_is_an_error() {
        assert!(RgsMappingsFormat.parse_text(".class old/pkg/*\n").is_err());
    }

    #[test]
    fn comments_and_unknown_directives_are_skipped() {
        let mappings = RgsMappingsFormat.parse_text("# nothing\n.option Application\n").unwrap();
        assert!(mappings.is_empty());
    }
}
