use crate::mappings::{ExtraMap, FrozenMappings, InvalidRelocationPattern, MappingsData, MemberMap, PackageRelocation};
use crate::member::{MemberKey, MethodExtra};

/// Mutable staging area for composing new [`FrozenMappings`].
///
/// The builder owns a single working buffer; every [`build`](Self::build)
/// call snapshots it into an independent frozen instance, so later mutation
/// is never observable through previously built mappings. A builder belongs
/// to one logical owner and carries no internal synchronization.
#[derive(Clone, Debug, Default)]
pub struct MappingsBuilder {
    data: MappingsData,
}
impl MappingsBuilder {
    #[inline]
    pub fn new() -> MappingsBuilder {
        MappingsBuilder::default()
    }
    pub(crate) fn from_data(data: MappingsData) -> MappingsBuilder {
        MappingsBuilder { data }
    }
    /// Snapshots the current working state into immutable mappings.
    pub fn build(&self) -> FrozenMappings {
        FrozenMappings::from_data(self.data.clone())
    }

    /// Adds a class mapping, overriding any existing entry.
    pub fn add_class_mapping<S: Into<String>, R: Into<String>>(&mut self, class_name: S, renamed: R) {
        self.data.classes.insert(class_name.into(), renamed.into());
    }
    /// Adds a package relocation behind all previously added ones.
    ///
    /// The pattern is a regular expression matched against full binary class
    /// names; relocations apply in insertion order, first match wins.
    pub fn add_package_relocation<S: Into<String>>(
        &mut self,
        pattern: &str,
        target: S,
    ) -> Result<(), InvalidRelocationPattern> {
        let relocation = PackageRelocation::compile(pattern, target.into())?;
        self.data.relocations.push(relocation);
        Ok(())
    }
    /// Adds a field mapping, overriding any existing entry for the same key.
    pub fn add_field_mapping<S: Into<String>, R: Into<String>>(
        &mut self,
        class_name: S,
        key: MemberKey,
        renamed: R,
    ) {
        self.data.fields.entry(class_name.into())
            .or_insert_with(MemberMap::new)
            .insert(key, renamed.into());
    }
    /// Adds a method mapping, overriding any existing entry for the same key.
    pub fn add_method_mapping<S: Into<String>, R: Into<String>>(
        &mut self,
        class_name: S,
        key: MemberKey,
        renamed: R,
    ) {
        self.data.methods.entry(class_name.into())
            .or_insert_with(MemberMap::new)
            .insert(key, renamed.into());
    }
    /// Appends exceptions for a method to the already recorded ones.
    pub fn add_exceptions<S, I>(&mut self, class_name: S, key: MemberKey, exceptions: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = String>,
    {
        self.extra_entry(class_name.into(), key)
            .exceptions
            .extend(exceptions);
    }
    /// Replaces the recorded parameter names for a method wholesale.
    pub fn set_parameters<S: Into<String>>(&mut self, class_name: S, key: MemberKey, parameters: Vec<String>) {
        let extra = self.extra_entry(class_name.into(), key);
        extra.parameters.clear();
        extra.parameters.extend(parameters);
    }
    fn extra_entry(&mut self, class_name: String, key: MemberKey) -> &mut MethodExtra {
        self.data.extra.entry(class_name)
            .or_insert_with(ExtraMap::new)
            .entry(key)
            .or_insert_with(MethodExtra::default)
    }

    // Existence probes over the entries added so far. Unlike the frozen
    // queries these never consult package relocations; relocation matching
    // is a query-time feature only.
    pub fn has_class_mapping(&self, class_name: &str) -> bool {
        self.data.classes.contains_key(class_name)
    }
    /// Whether any class mapping already targets the given renamed name.
    pub fn has_class_name_target(&self, renamed: &str) -> bool {
        self.data.classes.values().any(|target| target == renamed)
    }
    pub fn has_field_mapping(&self, class_name: &str, key: &MemberKey) -> bool {
        self.data.fields.get(class_name).map_or(false, |fields| {
            fields.contains_key(key) || fields.contains_key(&key.untyped())
        })
    }
    pub fn has_method_mapping(&self, class_name: &str, key: &MemberKey) -> bool {
        self.data.methods.get(class_name).map_or(false, |methods| methods.contains_key(key))
    }
    pub fn has_exceptions_for(&self, class_name: &str, key: &MemberKey) -> bool {
        self.data.extra.get(class_name)
            .and_then(|extras| extras.get(key))
            .map_or(false, |extra| !extra.exceptions.is_empty())
    }

    /// Keeps only class mappings the predicate accepts.
    pub fn retain_classes<F: FnMut(&str, &str) -> bool>(&mut self, mut keep: F) {
        self.data.classes.retain(|name, renamed| keep(name, renamed));
    }
    /// Keeps only field mappings the predicate accepts, dropping classes
    /// whose member map empties out.
    pub fn retain_fields<F: FnMut(&str, &MemberKey, &str) -> bool>(&mut self, mut keep: F) {
        retain_members(&mut self.data.fields, &mut keep);
    }
    /// Keeps only method mappings the predicate accepts, dropping classes
    /// whose member map empties out.
    pub fn retain_methods<F: FnMut(&str, &MemberKey, &str) -> bool>(&mut self, mut keep: F) {
        retain_members(&mut self.data.methods, &mut keep);
    }
    pub fn clear_classes(&mut self) {
        self.data.classes.clear();
    }
    pub fn clear_fields(&mut self) {
        self.data.fields.clear();
    }
    pub fn clear_methods(&mut self) {
        self.data.methods.clear();
    }
}

fn retain_members<F>(members: &mut indexmap::IndexMap<String, MemberMap>, keep: &mut F)
where
    F: FnMut(&str, &MemberKey, &str) -> bool,
{
    for (class_name, entries) in members.iter_mut() {
        entries.retain(|key, renamed| keep(class_name, key, renamed));
    }
    members.retain(|_, entries| !entries.is_empty());
}
