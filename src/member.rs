use std::fmt::{self, Display, Formatter};

use indexmap::IndexSet;

/// Identifies a single field or method within a class.
///
/// Legacy formats don't track field descriptors, so a key either carries a
/// descriptor or it doesn't. Descriptor-aware lookups fall back to the
/// untyped key, letting both kinds of entries coexist for the same field.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemberKey {
    name: String,
    desc: Option<String>,
}
impl MemberKey {
    /// A key identifying a member by name alone.
    pub fn named<S: Into<String>>(name: S) -> MemberKey {
        let name = name.into();
        assert!(!name.is_empty(), "Member name must not be empty");
        MemberKey { name, desc: None }
    }
    /// A key identifying a member by name and descriptor.
    pub fn typed<S: Into<String>, D: Into<String>>(name: S, desc: D) -> MemberKey {
        let name = name.into();
        let desc = desc.into();
        assert!(!name.is_empty(), "Member name must not be empty");
        assert!(!desc.is_empty(), "Member descriptor must not be empty");
        MemberKey { name, desc: Some(desc) }
    }
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[inline]
    pub fn desc(&self) -> Option<&str> {
        self.desc.as_ref().map(|s| &**s)
    }
    /// The untyped twin of this key, used as the lookup fallback.
    #[inline]
    pub(crate) fn untyped(&self) -> MemberKey {
        MemberKey { name: self.name.clone(), desc: None }
    }
}
impl Display for MemberKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(ref desc) = self.desc {
            f.write_str(desc)?;
        }
        Ok(())
    }
}

/// Exception and parameter metadata attached to a method mapping.
///
/// Exception names have set semantics, parameter names are positional.
/// Lookups that find nothing hand out an empty instance, never an absence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MethodExtra {
    pub(crate) exceptions: IndexSet<String>,
    pub(crate) parameters: Vec<String>,
}
impl MethodExtra {
    #[inline]
    pub fn exceptions(&self) -> &IndexSet<String> {
        &self.exceptions
    }
    #[inline]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty() && self.parameters.is_empty()
    }
}
