use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use failure_derive::Fail;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::builder::MappingsBuilder;
use crate::member::{MemberKey, MethodExtra};

pub(crate) type MemberMap = IndexMap<MemberKey, String>;
pub(crate) type ExtraMap = IndexMap<MemberKey, MethodExtra>;

/// A rule moving every class whose full binary name matches a pattern into a
/// different target package, independent of any per-class rename.
#[derive(Clone)]
pub struct PackageRelocation {
    raw: String,
    pattern: Regex,
    target: String,
}
impl PackageRelocation {
    pub(crate) fn compile(pattern: &str, target: String) -> Result<PackageRelocation, InvalidRelocationPattern> {
        // Anchored so a pattern matches the full class name, like Java's
        // String.matches does
        let anchored = Regex::new(&format!("\\A(?:{})\\z", pattern))
            .map_err(|cause| InvalidRelocationPattern { pattern: pattern.into(), cause })?;
        Ok(PackageRelocation { raw: pattern.into(), pattern: anchored, target })
    }
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.raw
    }
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }
    #[inline]
    fn matches(&self, class_name: &str) -> bool {
        self.pattern.is_match(class_name)
    }
}
impl PartialEq for PackageRelocation {
    fn eq(&self, other: &PackageRelocation) -> bool {
        self.raw == other.raw && self.target == other.target
    }
}
impl Eq for PackageRelocation {}
impl Debug for PackageRelocation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "PackageRelocation({:?} -> {:?})", self.raw, self.target)
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Invalid relocation pattern {:?}: {}", pattern, cause)]
pub struct InvalidRelocationPattern {
    pattern: String,
    #[cause]
    cause: ::regex::Error,
}

/// The working buffer shared between the builder and frozen snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MappingsData {
    /// Match order is significant, first match wins.
    pub relocations: Vec<PackageRelocation>,
    pub classes: IndexMap<String, String>,
    pub fields: IndexMap<String, MemberMap>,
    pub methods: IndexMap<String, MemberMap>,
    pub extra: IndexMap<String, ExtraMap>,
}

/// An immutable set of renaming tables between two naming schemes of a class
/// hierarchy, always read as one directed relation a->b.
///
/// Every producing operation hands back a fresh instance; the backing data is
/// shared behind an `Arc`, so cloning is cheap and snapshots never observe
/// later builder mutation. New instances come from [`MappingsBuilder::build`]
/// or from one of the algebra operations below.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrozenMappings {
    pub(crate) data: Arc<MappingsData>,
}
impl FrozenMappings {
    pub(crate) fn from_data(data: MappingsData) -> FrozenMappings {
        FrozenMappings { data: Arc::new(data) }
    }
    /// A seeded builder holding a copy of these mappings.
    pub fn rebuild(&self) -> MappingsBuilder {
        MappingsBuilder::from_data((*self.data).clone())
    }
    pub fn is_empty(&self) -> bool {
        let data = &*self.data;
        data.relocations.is_empty() && data.classes.is_empty() && data.fields.is_empty()
            && data.methods.is_empty() && data.extra.is_empty()
    }

    /// Remaps a class name, falling back to the input when nothing applies.
    ///
    /// Package relocations are consulted first; on a match the class is
    /// looked up by its bare name and moved under the relocation target.
    pub fn remap_class(&self, class_name: &str) -> String {
        for relocation in &self.data.relocations {
            if relocation.matches(class_name) {
                let bare = bare_name(class_name);
                let renamed = self.data.classes.get(bare).map(|s| &**s).unwrap_or(bare);
                return format!("{}{}", relocation.target, renamed);
            }
        }
        match self.data.classes.get(class_name) {
            Some(renamed) => renamed.clone(),
            None => class_name.to_owned(),
        }
    }
    /// The direct class rename entry, ignoring package relocations.
    pub fn get_remapped_class(&self, class_name: &str) -> Option<&str> {
        self.data.classes.get(class_name).map(|s| &**s)
    }
    pub fn has_class_mapping(&self, class_name: &str) -> bool {
        self.data.classes.contains_key(class_name)
            || self.data.relocations.iter().any(|r| r.matches(class_name))
    }

    pub fn method_name(&self, class_name: &str, key: &MemberKey) -> Option<&str> {
        self.data.methods.get(class_name)?.get(key).map(|s| &**s)
    }
    pub fn has_method_mapping(&self, class_name: &str, key: &MemberKey) -> bool {
        self.method_name(class_name, key).is_some()
    }
    /// Looks up a field, trying the exact key before the descriptor-less one.
    ///
    /// Descriptor-sensitive entries take priority; entries recorded without a
    /// descriptor still answer typed lookups.
    pub fn field_name(&self, class_name: &str, key: &MemberKey) -> Option<&str> {
        let fields = self.data.fields.get(class_name)?;
        fields.get(key)
            .or_else(|| fields.get(&key.untyped()))
            .map(|s| &**s)
    }
    pub fn has_field_mapping(&self, class_name: &str, key: &MemberKey) -> bool {
        self.field_name(class_name, key).is_some()
    }

    /// All exceptions recorded for a method; empty when none are known.
    pub fn exceptions(&self, class_name: &str, key: &MemberKey) -> IndexSet<String> {
        self.extra_for(class_name, key)
            .map(|extra| extra.exceptions.clone())
            .unwrap_or_default()
    }
    /// The recorded parameter names for a method; empty when none are known.
    pub fn parameters(&self, class_name: &str, key: &MemberKey) -> Vec<String> {
        self.extra_for(class_name, key)
            .map(|extra| extra.parameters.clone())
            .unwrap_or_default()
    }
    pub fn method_extra(&self, class_name: &str, key: &MemberKey) -> MethodExtra {
        self.extra_for(class_name, key).cloned().unwrap_or_default()
    }
    fn extra_for(&self, class_name: &str, key: &MemberKey) -> Option<&MethodExtra> {
        self.data.extra.get(class_name)?.get(key)
    }

    pub fn relocations(&self) -> impl Iterator<Item = &PackageRelocation> + '_ {
        self.data.relocations.iter()
    }
    pub fn classes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.data.classes.iter().map(|(name, renamed)| (&**name, &**renamed))
    }
    pub fn fields(&self) -> impl Iterator<Item = (&str, &MemberKey, &str)> + '_ {
        iter_members(&self.data.fields)
    }
    pub fn methods(&self) -> impl Iterator<Item = (&str, &MemberKey, &str)> + '_ {
        iter_members(&self.data.methods)
    }
    pub fn method_extras(&self) -> impl Iterator<Item = (&str, &MemberKey, &MethodExtra)> + '_ {
        self.data.extra.iter().flat_map(|(class_name, members)| {
            members.iter().map(move |(key, extra)| (&**class_name, key, extra))
        })
    }

    /// Reverses a->b into b->a.
    ///
    /// Member keys are re-filed under their renamed class and descriptor.
    /// Parameter and exception metadata has no inverse meaning and is not
    /// carried over.
    pub fn inverted(&self) -> FrozenMappings {
        let mut data = MappingsData::default();
        for (name, renamed) in &self.data.classes {
            data.classes.insert(renamed.clone(), name.clone());
        }
        for (class_name, members) in &self.data.fields {
            data.fields.insert(self.remap_class(class_name), self.invert_members(members));
        }
        for (class_name, members) in &self.data.methods {
            data.methods.insert(self.remap_class(class_name), self.invert_members(members));
        }
        FrozenMappings::from_data(data)
    }
    fn invert_members(&self, members: &MemberMap) -> MemberMap {
        members.iter()
            .map(|(key, renamed)| (self.renamed_key(key, renamed), key.name().to_owned()))
            .collect()
    }
    /// The key a member is known by on the renamed side of the relation.
    fn renamed_key(&self, key: &MemberKey, renamed: &str) -> MemberKey {
        match key.desc() {
            Some(desc) => MemberKey::typed(renamed, self.remap_descriptor(desc)),
            None => MemberKey::named(renamed),
        }
    }

    /// Drops entries that carry no renaming information.
    ///
    /// A single identity entry discards a class's whole field map, while its
    /// method map is only discarded when every entry is both name-identity
    /// and free of extra metadata. The asymmetry is long-standing behavior
    /// that existing mapping sets rely on, and is reproduced deliberately.
    pub fn clean(&self) -> FrozenMappings {
        let mut data = MappingsData::default();
        for (name, renamed) in &self.data.classes {
            if name != renamed {
                data.classes.insert(name.clone(), renamed.clone());
            }
        }
        for (class_name, members) in &self.data.fields {
            if members.iter().any(|(key, renamed)| key.name() == renamed) {
                continue;
            }
            let kept: MemberMap = members.iter()
                .filter(|(key, renamed)| key.name() != renamed.as_str())
                .map(|(key, renamed)| (key.clone(), renamed.clone()))
                .collect();
            data.fields.insert(class_name.clone(), kept);
        }
        for (class_name, members) in &self.data.methods {
            let has_extra = |key: &MemberKey| {
                self.data.extra.get(class_name).map_or(false, |extras| extras.contains_key(key))
            };
            if members.iter().all(|(key, renamed)| key.name() == renamed && !has_extra(key)) {
                continue;
            }
            let kept: MemberMap = members.iter()
                .filter(|(key, renamed)| key.name() != renamed.as_str() || has_extra(key))
                .map(|(key, renamed)| (key.clone(), renamed.clone()))
                .collect();
            data.methods.insert(class_name.clone(), kept);
        }
        data.extra = self.data.extra.clone();
        FrozenMappings::from_data(data)
    }

    /// Mediates between two mappings sharing a source: given self = a->b and
    /// other = a->c, the result is b->c.
    ///
    /// Entries whose renamed values agree on both sides are no-ops and are
    /// omitted, as are entries with no counterpart in `other`.
    pub fn mediate(&self, other: &FrozenMappings) -> FrozenMappings {
        let mut data = MappingsData::default();
        for (name, renamed) in &self.data.classes {
            if let Some(target) = other.data.classes.get(name) {
                if renamed != target {
                    data.classes.insert(renamed.clone(), target.clone());
                }
            }
        }
        data.fields = self.mediate_members(&self.data.fields, &other.data.fields);
        data.methods = self.mediate_members(&self.data.methods, &other.data.methods);
        FrozenMappings::from_data(data)
    }
    fn mediate_members(
        &self,
        ours: &IndexMap<String, MemberMap>,
        theirs: &IndexMap<String, MemberMap>,
    ) -> IndexMap<String, MemberMap> {
        let mut result = IndexMap::new();
        for (class_name, members) in ours {
            let counterpart = match theirs.get(class_name) {
                Some(counterpart) => counterpart,
                None => continue,
            };
            let mut mediated = MemberMap::new();
            for (key, renamed) in members {
                if let Some(target) = counterpart.get(key) {
                    if renamed != target {
                        mediated.insert(self.renamed_key(key, renamed), target.clone());
                    }
                }
            }
            result.insert(self.remap_class(class_name), mediated);
        }
        result
    }

    /// Chains two mappings end to end: given self = a->b and other = b->c,
    /// the result is a->c.
    ///
    /// Members `other` doesn't know keep their b-side name, treating the
    /// second relation as identity past that point. Results stay filed under
    /// the original a-side class keys.
    pub fn chain(&self, other: &FrozenMappings) -> FrozenMappings {
        let mut data = MappingsData::default();
        for (name, renamed) in &self.data.classes {
            data.classes.insert(name.clone(), other.remap_class(renamed));
        }
        data.fields = self.chain_members(&self.data.fields, &other.data.fields);
        data.methods = self.chain_members(&self.data.methods, &other.data.methods);
        FrozenMappings::from_data(data)
    }
    fn chain_members(
        &self,
        ours: &IndexMap<String, MemberMap>,
        theirs: &IndexMap<String, MemberMap>,
    ) -> IndexMap<String, MemberMap> {
        let mut result = IndexMap::new();
        for (class_name, members) in ours {
            let counterpart = theirs.get(&self.remap_class(class_name));
            let mut chained = MemberMap::new();
            for (key, renamed) in members {
                let target = counterpart
                    .and_then(|members| members.get(&self.renamed_key(key, renamed)))
                    .cloned()
                    .unwrap_or_else(|| renamed.clone());
                chained.insert(key.clone(), target);
            }
            result.insert(class_name.clone(), chained);
        }
        result
    }

    /// Unions two mappings, letting `self`'s entries win on collision.
    ///
    /// Exception sets are merged from both sides; a parameter list present on
    /// `self` replaces `other`'s wholesale.
    pub fn join(&self, other: &FrozenMappings) -> FrozenMappings {
        let mut data = (*other.data).clone();
        for (name, renamed) in &self.data.classes {
            data.classes.insert(name.clone(), renamed.clone());
        }
        overlay_members(&mut data.fields, &self.data.fields);
        overlay_members(&mut data.methods, &self.data.methods);
        for (class_name, members) in &self.data.extra {
            for (key, extra) in members {
                let merged = data.extra.entry(class_name.clone())
                    .or_insert_with(ExtraMap::new)
                    .entry(key.clone())
                    .or_insert_with(MethodExtra::default);
                merged.exceptions.extend(extra.exceptions.iter().cloned());
                merged.parameters.clear();
                merged.parameters.extend(extra.parameters.iter().cloned());
            }
        }
        FrozenMappings::from_data(data)
    }
}

fn overlay_members(base: &mut IndexMap<String, MemberMap>, overlay: &IndexMap<String, MemberMap>) {
    for (class_name, members) in overlay {
        let target = base.entry(class_name.clone()).or_insert_with(MemberMap::new);
        for (key, renamed) in members {
            target.insert(key.clone(), renamed.clone());
        }
    }
}

fn iter_members(
    members: &IndexMap<String, MemberMap>,
) -> impl Iterator<Item = (&str, &MemberKey, &str)> + '_ {
    members.iter().flat_map(|(class_name, entries)| {
        entries.iter().map(move |(key, renamed)| (&**class_name, key, &**renamed))
    })
}

#[inline]
fn bare_name(class_name: &str) -> &str {
    match class_name.rfind('/') {
        Some(index) => &class_name[index + 1..],
        None => class_name,
    }
}
