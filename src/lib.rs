//! Bidirectional renaming tables ("mappings") between two naming schemes of
//! an obfuscated JVM class hierarchy.
//!
//! The heart of the crate is [`FrozenMappings`]: an immutable relation over
//! class, field and method names plus package relocations and per-method
//! exception/parameter metadata. Frozen mappings can be queried, iterated,
//! and combined like functions (reversed, chained, mediated, joined and
//! cleaned), with every operation producing a fresh instance. New mappings
//! are staged through a [`MappingsBuilder`], and the [`format`] module moves
//! them to and from the concrete text dialects.

extern crate failure;
extern crate failure_derive;
extern crate indexmap;
extern crate itertools;
extern crate log;
extern crate regex;

mod builder;
mod descriptor;
mod mappings;
mod member;
pub mod format;

pub use crate::builder::MappingsBuilder;
pub use crate::mappings::{FrozenMappings, InvalidRelocationPattern, PackageRelocation};
pub use crate::member::{MemberKey, MethodExtra};

pub mod prelude {
    pub use crate::builder::MappingsBuilder;
    pub use crate::format::{FormatRegistry, MappingsFormat};
    pub use crate::mappings::FrozenMappings;
    pub use crate::member::{MemberKey, MethodExtra};
}
