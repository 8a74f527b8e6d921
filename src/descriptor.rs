//! Rewrites JVM type and method descriptors under the class rename table.

use crate::mappings::FrozenMappings;

/// Primitive type codes, which never need remapping.
const PRIMITIVES: &[&str] = &["B", "C", "D", "F", "I", "J", "S", "V", "Z"];

impl FrozenMappings {
    /// Rewrites every reference type embedded in a field or method
    /// descriptor through [`FrozenMappings::remap_class`].
    ///
    /// Primitives, array markers and class names without a mapping pass
    /// through untouched. The input must be a well-formed descriptor;
    /// malformed input is returned as-is on a best-effort basis, validation
    /// is the job of whoever parsed it.
    pub fn remap_descriptor(&self, descriptor: &str) -> String {
        let mut result = String::with_capacity(descriptor.len());
        let mut remaining = descriptor;
        // Method descriptors start with '(': remap each argument, then fall
        // through to the return type
        if remaining.starts_with('(') {
            let close = remaining.find(')').unwrap_or(remaining.len());
            let arguments = &remaining[1..close];
            result.push('(');
            let mut reference = String::new();
            let mut in_reference = false;
            for c in arguments.chars() {
                if in_reference {
                    reference.push(c);
                    // ';' ends a reference type descriptor
                    if c == ';' {
                        result.push_str(&self.remap_descriptor(&reference));
                        reference.clear();
                        in_reference = false;
                    }
                } else if c == 'L' {
                    in_reference = true;
                    reference.push(c);
                } else {
                    // A primitive code or array marker, copied verbatim
                    result.push(c);
                }
            }
            result.push(')');
            remaining = if close < remaining.len() { &remaining[close + 1..] } else { "" };
        }
        // Strip array markers, remembering the dimensions for re-emission
        let stripped = remaining.trim_start_matches('[');
        let dimensions = remaining.len() - stripped.len();
        if PRIMITIVES.contains(&stripped) || !stripped.starts_with('L') || !stripped.ends_with(';') {
            result.push_str(remaining);
            return result;
        }
        // Lmy/package/Class; -> my/package/Class
        let class_name = &stripped[1..stripped.len() - 1];
        if !self.has_class_mapping(class_name) {
            // Not ours to rename, e.g. java/lang/String
            result.push_str(remaining);
            return result;
        }
        for _ in 0..dimensions {
            result.push('[');
        }
        result.push('L');
        result.push_str(&self.remap_class(class_name));
        result.push(';');
        result
    }
}

#[cfg(test)]
mod test {
    use crate::builder::MappingsBuilder;
    use crate::mappings::FrozenMappings;

    fn mappings() -> FrozenMappings {
        let mut builder = MappingsBuilder::new();
        builder.add_class_mapping("my/Foo", "a/B");
        builder.build()
    }

    #[test]
    fn remaps_arguments_and_return_type() {
        assert_eq!(
            mappings().remap_descriptor("(ILmy/Foo;)[Lmy/Foo;"),
            "(ILa/B;)[La/B;"
        );
    }

    #[test]
    fn primitives_pass_through() {
        let mappings = mappings();
        assert_eq!(mappings.remap_descriptor("(IJ)V"), "(IJ)V");
        assert_eq!(mappings.remap_descriptor("[[D"), "[[D");
        assert_eq!(mappings.remap_descriptor("Z"), "Z");
    }

    #[test]
    fn unmapped_classes_pass_through() {
        assert_eq!(
            mappings().remap_descriptor("Ljava/lang/String;"),
            "Ljava/lang/String;"
        );
        assert_eq!(
            mappings().remap_descriptor("(Ljava/lang/String;)Ljava/util/List;"),
            "(Ljava/lang/String;)Ljava/util/List;"
        );
    }

    #[test]
    fn array_dimensions_survive() {
        assert_eq!(mappings().remap_descriptor("[[Lmy/Foo;"), "[[La/B;");
        assert_eq!(mappings().remap_descriptor("([Lmy/Foo;I)V"), "([La/B;I)V");
    }

    #[test]
    fn empty_argument_list() {
        assert_eq!(mappings().remap_descriptor("()Lmy/Foo;"), "()La/B;");
    }

    #[test]
    fn mixed_argument_list() {
        assert_eq!(
            mappings().remap_descriptor("(J[Ljava/lang/String;Lmy/Foo;S)[I"),
            "(J[Ljava/lang/String;La/B;S)[I"
        );
    }

    #[test]
    fn relocated_classes_are_remapped() {
        let mut builder = MappingsBuilder::new();
        builder.add_package_relocation("old/[^/]+", "new/pkg/").unwrap();
        let mappings = builder.build();
        assert_eq!(mappings.remap_descriptor("(Lold/Thing;)V"), "(Lnew/pkg/Thing;)V");
    }
}
