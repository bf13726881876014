//! Formatter registration surface exposed to the host.
//!
//! Decoders attach to container type-name patterns inside named
//! categories that enable and disable as a unit. Installation replaces
//! a category wholesale (delete then recreate) so repeated
//! registration can never stack duplicate formatters.

use crate::decoder::{self, pair, vector, ContainerView, DecoderConfig, ViewKind};
use crate::session::InspectSession;
use crate::value::Field;
use indexmap::IndexMap;
use regex::Regex;

/// Which decoder services a matched type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    Vector,
    String,
    Pair,
}

/// One registered formatter: a type-name pattern plus the producers it
/// provides.
#[derive(Debug)]
pub struct FormatterEntry {
    pub pattern: Regex,
    pub decoder: DecoderKind,
    pub summary: bool,
    pub synthetic: bool,
}

#[derive(Debug, Default)]
struct Category {
    enabled: bool,
    entries: Vec<FormatterEntry>,
}

/// Named groups of formatter entries, matched in insertion order.
#[derive(Debug, Default)]
pub struct FormatterRegistry {
    categories: IndexMap<String, Category>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a category and all its entries. Returns whether it
    /// existed.
    pub fn delete_category(&mut self, name: &str) -> bool {
        self.categories.shift_remove(name).is_some()
    }

    pub fn enable(&mut self, name: &str) {
        self.categories.entry(name.to_string()).or_default().enabled = true;
    }

    pub fn disable(&mut self, name: &str) {
        if let Some(category) = self.categories.get_mut(name) {
            category.enabled = false;
        }
    }

    pub fn add_summary(
        &mut self,
        category: &str,
        pattern: &str,
        decoder: DecoderKind,
    ) -> Result<(), regex::Error> {
        self.add_entry(category, pattern, decoder, true, false)
    }

    pub fn add_synthetic(
        &mut self,
        category: &str,
        pattern: &str,
        decoder: DecoderKind,
    ) -> Result<(), regex::Error> {
        self.add_entry(category, pattern, decoder, false, true)
    }

    fn add_entry(
        &mut self,
        category: &str,
        pattern: &str,
        decoder: DecoderKind,
        summary: bool,
        synthetic: bool,
    ) -> Result<(), regex::Error> {
        let pattern = Regex::new(pattern)?;
        let category = self.categories.entry(category.to_string()).or_default();

        // Merge producers into an existing entry for the same pattern
        // and decoder instead of duplicating it.
        if let Some(entry) = category
            .entries
            .iter_mut()
            .find(|e| e.pattern.as_str() == pattern.as_str() && e.decoder == decoder)
        {
            entry.summary |= summary;
            entry.synthetic |= synthetic;
            return Ok(());
        }

        category.entries.push(FormatterEntry {
            pattern,
            decoder,
            summary,
            synthetic,
        });
        Ok(())
    }

    /// First entry of an enabled category whose pattern matches the
    /// type name.
    pub fn lookup(&self, type_name: &str) -> Option<&FormatterEntry> {
        self.categories
            .values()
            .filter(|category| category.enabled)
            .flat_map(|category| category.entries.iter())
            .find(|entry| entry.pattern.is_match(type_name))
    }
}

/// Name of the capability group holding the EASTL formatters.
pub const EASTL_CATEGORY: &str = "EASTL";

/// Register the EASTL decoders. Any previous `EASTL` category is
/// deleted first, then the category is recreated and enabled.
pub fn install(registry: &mut FormatterRegistry) -> Result<(), regex::Error> {
    registry.delete_category(EASTL_CATEGORY);

    registry.add_summary(EASTL_CATEGORY, r"^eastl::VectorBase<.*>$", DecoderKind::Vector)?;
    registry.add_synthetic(EASTL_CATEGORY, r"^eastl::VectorBase<.*>$", DecoderKind::Vector)?;
    registry.add_synthetic(
        EASTL_CATEGORY,
        r"^eastl::basic_string<.*>$",
        DecoderKind::String,
    )?;
    registry.add_summary(EASTL_CATEGORY, r"^eastl::pair<.*>$", DecoderKind::Pair)?;

    registry.enable(EASTL_CATEGORY);
    Ok(())
}

/// Dispatch a matched entry to its summary producer, if it has one.
pub fn summarize<S: InspectSession>(
    session: &S,
    entry: &FormatterEntry,
    region: Field,
    config: &DecoderConfig,
) -> Option<String> {
    if !entry.summary {
        return None;
    }
    match entry.decoder {
        DecoderKind::Vector => Some(vector::summarize(session, region, config)),
        DecoderKind::Pair => Some(pair::summarize(session, region)),
        DecoderKind::String => None,
    }
}

/// Dispatch a matched entry to a refreshed child-enumeration view, if
/// it provides one.
pub fn synthetic_view<'a, S: InspectSession>(
    session: &'a S,
    entry: &FormatterEntry,
    region: Field,
    config: &DecoderConfig,
) -> Option<ContainerView<'a, S>> {
    if !entry.synthetic {
        return None;
    }
    let kind = match entry.decoder {
        DecoderKind::Vector => ViewKind::Vector,
        DecoderKind::String => ViewKind::String,
        DecoderKind::Pair => return None,
    };
    let mut view = decoder::make_view(session, region, config, kind);
    view.refresh();
    Some(view)
}
