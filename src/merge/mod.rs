//! Merges canonical tokens into existing kit records.
//!
//! Matching goes by `_id` first and then by case-folded title. A matched
//! record keeps every key the engine does not write. New values only
//! overwrite when they are non-empty.

mod fields;
mod ids;

pub use ids::{IdGenerator, RandomIds, ID_SUFFIX_LEN};

#[cfg(test)]
pub use ids::SequentialIds;

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::kit::{detect_prefix, str_field, KitCollections, KitRecord, ID_KEY, TITLE_KEY};
use crate::tokens::{title_key, ColorToken, FontToken, TokenKind};

/// What happens to existing records the new set does not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Kept in place.
    Merge,
    /// Dropped; the output is exactly the new set.
    #[default]
    Replace,
}

impl MergePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Replace => "replace",
        }
    }
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "merge" => Ok(Self::Merge),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown mode `{other}` (expected merge or replace)")),
        }
    }
}

trait Mergeable {
    const KIND: TokenKind;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    /// Tokens that cannot be written are dropped before matching.
    fn is_writable(&self) -> bool;
    fn write(&self, record: &mut KitRecord, prefix: &str);
}

impl Mergeable for ColorToken {
    const KIND: TokenKind = TokenKind::Color;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn is_writable(&self) -> bool {
        self.is_complete()
    }

    fn write(&self, record: &mut KitRecord, _prefix: &str) {
        fields::write_color(record, self);
    }
}

impl Mergeable for FontToken {
    const KIND: TokenKind = TokenKind::Font;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn is_writable(&self) -> bool {
        !self.title.is_empty()
    }

    fn write(&self, record: &mut KitRecord, prefix: &str) {
        fields::write_font(record, self, prefix);
    }
}

struct RecordIndex<'a> {
    by_id: HashMap<&'a str, usize>,
    by_title: HashMap<String, usize>,
}

impl<'a> RecordIndex<'a> {
    fn build(records: &'a [KitRecord]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_title = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            let id = str_field(record, ID_KEY);
            if !id.is_empty() {
                by_id.insert(id, idx);
            }
            let title = str_field(record, TITLE_KEY);
            if !title.is_empty() {
                by_title.insert(title_key(title), idx);
            }
        }
        Self { by_id, by_title }
    }

    /// Base record index and the id the output should carry (possibly empty).
    fn resolve(&self, records: &[KitRecord], id: &str, title: &str) -> (Option<usize>, String) {
        if let Some(&idx) = (!id.is_empty()).then(|| self.by_id.get(id)).flatten() {
            return (Some(idx), id.to_string());
        }
        if let Some(&idx) = self.by_title.get(&title_key(title)) {
            let adopted = str_field(&records[idx], ID_KEY);
            let id = if adopted.is_empty() { id } else { adopted };
            return (Some(idx), id.to_string());
        }
        (None, id.to_string())
    }
}

/// Later duplicates of a case-folded title replace earlier ones and take
/// their position.
fn dedupe_titles<T: Mergeable>(new: &[T]) -> Vec<&T> {
    let mut slots: IndexMap<String, &T> = IndexMap::new();
    for token in new.iter().filter(|token| token.is_writable()) {
        slots.insert(title_key(token.title()), token);
    }
    slots.into_values().collect()
}

fn fresh_id(
    kind: TokenKind,
    ids: &mut dyn IdGenerator,
    existing: &HashSet<&str>,
    emitted: &HashSet<String>,
) -> String {
    loop {
        let id = ids.next_id(kind);
        if !existing.contains(id.as_str()) && !emitted.contains(&id) {
            return id;
        }
    }
}

fn merge_records<T: Mergeable>(
    existing: &[KitRecord],
    new: &[T],
    prefix: &str,
    policy: MergePolicy,
    ids: &mut dyn IdGenerator,
) -> Vec<KitRecord> {
    let index = RecordIndex::build(existing);
    let existing_ids: HashSet<&str> = index.by_id.keys().copied().collect();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut outputs: Vec<(Option<usize>, KitRecord)> = Vec::new();

    for token in dedupe_titles(new) {
        let (mut base, mut id) = index.resolve(existing, token.id(), token.title());
        if emitted.contains(&id) {
            tracing::debug!(kind = T::KIND.as_str(), id = %id, "id already emitted; issuing a fresh one");
            base = None;
            id.clear();
        }
        if id.is_empty() {
            id = fresh_id(T::KIND, ids, &existing_ids, &emitted);
        }

        let mut record = base.map(|idx| existing[idx].clone()).unwrap_or_default();
        record.insert(ID_KEY.to_string(), json!(id));
        record.insert(TITLE_KEY.to_string(), json!(token.title()));
        token.write(&mut record, prefix);

        emitted.insert(id);
        outputs.push((base, record));
    }

    match policy {
        MergePolicy::Replace => outputs.into_iter().map(|(_, record)| record).collect(),
        MergePolicy::Merge => overlay_existing(existing, outputs),
    }
}

/// Existing order, matched records replaced in place, unmatched new records
/// appended. Unmatched existing records whose title a new record claims are
/// dropped.
fn overlay_existing(
    existing: &[KitRecord],
    outputs: Vec<(Option<usize>, KitRecord)>,
) -> Vec<KitRecord> {
    let claimed_titles: HashSet<String> = outputs
        .iter()
        .map(|(_, record)| title_key(str_field(record, TITLE_KEY)))
        .collect();

    let mut in_place: HashMap<usize, KitRecord> = HashMap::new();
    let mut appended = Vec::new();
    for (base, record) in outputs {
        match base {
            Some(idx) if !in_place.contains_key(&idx) => {
                in_place.insert(idx, record);
            }
            _ => appended.push(record),
        }
    }

    let mut merged = Vec::with_capacity(existing.len() + appended.len());
    for (idx, record) in existing.iter().enumerate() {
        if let Some(updated) = in_place.remove(&idx) {
            merged.push(updated);
        } else if claimed_titles.contains(&title_key(str_field(record, TITLE_KEY))) {
            tracing::debug!(
                title = str_field(record, TITLE_KEY),
                "dropping existing record shadowed by a new title"
            );
        } else {
            merged.push(record.clone());
        }
    }
    merged.extend(appended);
    merged
}

pub fn merge_colors(
    existing: &[KitRecord],
    colors: &[ColorToken],
    policy: MergePolicy,
    ids: &mut dyn IdGenerator,
) -> Vec<KitRecord> {
    merge_records(existing, colors, "", policy, ids)
}

/// `prefix` is the schema prefix detected on the existing records.
pub fn merge_fonts(
    existing: &[KitRecord],
    fonts: &[FontToken],
    prefix: &str,
    policy: MergePolicy,
    ids: &mut dyn IdGenerator,
) -> Vec<KitRecord> {
    merge_records(existing, fonts, prefix, policy, ids)
}

/// Merges both collections of a kit document, detecting the typography
/// prefix on the existing records.
pub fn merge_kit(
    existing: &KitCollections,
    colors: &[ColorToken],
    fonts: &[FontToken],
    policy: MergePolicy,
    ids: &mut dyn IdGenerator,
) -> KitCollections {
    let prefix = detect_prefix(&existing.fonts);
    tracing::debug!(
        prefix = %prefix,
        policy = policy.as_str(),
        colors = colors.len(),
        fonts = fonts.len(),
        "merging tokens into kit"
    );
    KitCollections {
        colors: merge_colors(&existing.colors, colors, policy, ids),
        fonts: merge_fonts(&existing.fonts, fonts, &prefix, policy, ids),
    }
}
