// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record store built from a byte-offset entity scan.
//!
//! Construction is a single eager pass: a memchr scan finds every
//! `#id=...;` span, each span is tokenized, and malformed spans are skipped
//! with a warning so one bad line never poisons the rest of the model.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::{Error, Result};
use crate::parser::parse_record;
use crate::record::{AttributeValue, EntityKind, Record};

/// Byte spans of candidate entity records, in file order.
fn scan_entity_spans(content: &str) -> Vec<(usize, usize)> {
    let bytes = content.as_bytes();
    let len = bytes.len();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < len {
        let hash_offset = match memchr::memchr(b'#', &bytes[pos..]) {
            Some(offset) => offset,
            None => break,
        };
        let start = pos + hash_offset;
        pos = start + 1;

        let id_start = pos;
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let id_end = pos;

        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        // Only `#<digits> =` starts a record; other '#' occurrences are
        // references inside an attribute list.
        if id_end > id_start && pos < len && bytes[pos] == b'=' {
            match memchr::memchr(b';', &bytes[pos..]) {
                Some(semicolon_offset) => {
                    pos += semicolon_offset + 1;
                    spans.push((start, pos));
                }
                None => break,
            }
        }
    }

    spans
}

/// Read-only record store: the model-access surface of the pipeline.
///
/// Enumeration order for [`ModelStore::ids_of`] is the first-seen order of
/// the input, which makes downstream processing deterministic.
pub struct ModelStore {
    records: FxHashMap<u32, Record>,
    kind_index: FxHashMap<EntityKind, Vec<u32>>,
}

impl ModelStore {
    /// Decode a model from STEP text.
    ///
    /// Malformed records are skipped with a warning. Fails only when the
    /// input yields no records at all.
    pub fn open(content: &str) -> Result<Self> {
        let spans = scan_entity_spans(content);
        let mut records =
            FxHashMap::with_capacity_and_hasher(spans.len(), Default::default());
        let mut kind_index: FxHashMap<EntityKind, Vec<u32>> = FxHashMap::default();

        for (start, end) in spans {
            let line = &content[start..end];
            let (id, kind, tokens) = match parse_record(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(offset = start, error = %e, "skipping malformed record");
                    continue;
                }
            };

            if records.contains_key(&id) {
                warn!(id, "duplicate record id, keeping first occurrence");
                continue;
            }

            let attributes = tokens.iter().map(AttributeValue::from_token).collect();
            records.insert(id, Record::new(id, kind, attributes));
            kind_index.entry(kind).or_default().push(id);
        }

        if records.is_empty() {
            return Err(Error::EmptyModel);
        }

        Ok(Self {
            records,
            kind_index,
        })
    }

    /// Record by id.
    pub fn record(&self, id: u32) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Record by id, with a typed error for required lookups.
    pub fn require(&self, id: u32) -> Result<&Record> {
        self.records.get(&id).ok_or(Error::RecordNotFound(id))
    }

    /// All ids of a kind, in first-seen order.
    pub fn ids_of(&self, kind: EntityKind) -> &[u32] {
        self.kind_index
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Dereference an attribute that holds an entity reference.
    pub fn resolve(&self, attr: &AttributeValue) -> Option<&Record> {
        attr.as_entity_ref().and_then(|id| self.record(id))
    }

    /// Dereference a reference attribute of `record` by position.
    pub fn resolve_field(&self, record: &Record, index: usize) -> Option<&Record> {
        record.get_ref(index).and_then(|id| self.record(id))
    }

    /// Number of decoded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_MODEL: &str = "\
#1=IFCSPACE('s-guid',$,'Space',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n\
#2=IFCWALLSTANDARDCASE('w-guid',$,'Wall',$,$,#4,$,$);\n\
#3=IFCWALLSTANDARDCASE('w2-guid',$,'Wall 2',$,$,$,$,$);\n\
#4=IFCLOCALPLACEMENT($,#5);\n\
#5=IFCAXIS2PLACEMENT3D(#6,$,$);\n\
#6=IFCCARTESIANPOINT((0.,0.,0.));\n";

    #[test]
    fn open_and_query() {
        let store = ModelStore::open(SMALL_MODEL).unwrap();
        assert_eq!(store.len(), 6);
        assert_eq!(store.ids_of(EntityKind::Space), &[1]);
        assert_eq!(store.ids_of(EntityKind::WallStandardCase), &[2, 3]);
        assert_eq!(store.ids_of(EntityKind::Door), &[] as &[u32]);

        let wall = store.record(2).unwrap();
        assert_eq!(wall.kind, EntityKind::WallStandardCase);
        assert_eq!(wall.get_string(2), Some("Wall"));
    }

    #[test]
    fn resolve_reference_chain() {
        let store = ModelStore::open(SMALL_MODEL).unwrap();
        let wall = store.record(2).unwrap();

        let placement = store.resolve_field(wall, 5).unwrap();
        assert_eq!(placement.kind, EntityKind::LocalPlacement);

        let axis = store.resolve_field(placement, 1).unwrap();
        assert_eq!(axis.kind, EntityKind::Axis2Placement3D);

        let location = store.resolve_field(axis, 0).unwrap();
        assert_eq!(location.kind, EntityKind::CartesianPoint);
    }

    #[test]
    fn malformed_record_is_skipped() {
        let content = "\
#1=IFCSPACE('s',$,$,$,$,$,$,$,$,$,$);\n\
#2=IFCWALL(@broken@);\n\
#3=IFCDOOR('d',$,$,$,$,$,$,$,$,$);\n";
        let store = ModelStore::open(content).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.record(1).is_some());
        assert!(store.record(3).is_some());
        assert!(store.record(2).is_none());
    }

    #[test]
    fn duplicate_id_keeps_first() {
        let content = "\
#1=IFCSPACE('first',$,$,$,$,$,$,$,$,$,$);\n\
#1=IFCSPACE('second',$,$,$,$,$,$,$,$,$,$);\n";
        let store = ModelStore::open(content).unwrap();
        assert_eq!(store.ids_of(EntityKind::Space), &[1]);
        assert_eq!(store.record(1).unwrap().get_string(0), Some("first"));
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(matches!(ModelStore::open(""), Err(Error::EmptyModel)));
        assert!(matches!(
            ModelStore::open("HEADER; nothing here"),
            Err(Error::EmptyModel)
        ));
    }

    #[test]
    fn references_inside_lists_are_not_records() {
        let content = "#10=IFCPOLYLINE((#11,#12));\n\
#11=IFCCARTESIANPOINT((0.,0.));\n\
#12=IFCCARTESIANPOINT((1.,0.));\n";
        let store = ModelStore::open(content).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.ids_of(EntityKind::Polyline), &[10]);
    }
}
