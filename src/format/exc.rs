//! EXC metadata files: one `cls.method(desc)=Exc1,Exc2|p1,p2` line per
//! method. The dialect carries exception and parameter data only, no
//! renames.

use std::io::Write;

use failure::Error;
use itertools::Itertools;

use crate::builder::MappingsBuilder;
use crate::format::{MappingsFormat, ParseError};
use crate::mappings::FrozenMappings;
use crate::member::MemberKey;

pub struct ExcMappingsFormat;

impl MappingsFormat for ExcMappingsFormat {
    fn extensions(&self) -> &[&'static str] {
        &["exc"]
    }
    fn parse_text(&self, text: &str) -> Result<FrozenMappings, Error> {
        let mut builder = MappingsBuilder::new();
        for (index, line) in text.lines().enumerate() {
            let number = index + 1;
            if line.is_empty() {
                continue;
            }
            let (class_name, rest) = split_once(line, '.')
                .ok_or_else(|| ParseError::new(number, "Missing '.' between class and method"))?;
            let open = rest.find('(')
                .ok_or_else(|| ParseError::new(number, "Missing method descriptor"))?;
            let method_name = &rest[..open];
            if class_name.is_empty() || method_name.is_empty() {
                return Err(ParseError::new(number, "Empty class or method name"));
            }
            let (desc, rest) = split_once(&rest[open..], '=')
                .ok_or_else(|| ParseError::new(number, "Missing '=' after descriptor"))?;
            let (exceptions, parameters) = split_once(rest, '|')
                .ok_or_else(|| ParseError::new(number, "Missing '|' between exceptions and parameters"))?;
            let key = MemberKey::typed(method_name, desc);
            builder.add_exceptions(
                class_name,
                key.clone(),
                exceptions.split(',').filter(|s| !s.is_empty()).map(ToOwned::to_owned),
            );
            builder.set_parameters(
                class_name,
                key,
                parameters.split(',').filter(|s| !s.is_empty()).map(ToOwned::to_owned).collect(),
            );
        }
        Ok(builder.build())
    }
    fn write(&self, mappings: &FrozenMappings, output: &mut dyn Write) -> Result<(), Error> {
        let mut lines = Vec::new();
        for (class_name, key, extra) in mappings.method_extras() {
            let mut exceptions: Vec<&String> = extra.exceptions().iter().collect();
            exceptions.sort();
            lines.push(format!(
                "{}.{}{}={}|{}",
                class_name,
                key.name(),
                key.desc().unwrap_or(""),
                exceptions.iter().join(","),
                extra.parameters().iter().join(",")
            ));
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
    fn supports_parameter_data(&self) -> bool {
        true
    }
    fn supports_remapping_data(&self) -> bool {
        false
    }
}

fn split_once(text: &str, separator: char) -> Option<(&str, &str)> {
    let index = text.find(separator)?;
    Some((&text[..index], &text[index + 1..]))
}
