// Copyright 2024 rct-proto contributors.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The OID registry: an immutable lookup of [`ObjectInfo`] by 32-bit id or
//! by dotted-path name.
//!
//! The table is supplied at construction time and indexed into two
//! `HashMap`s built once and never mutated — the OID catalog is ~700 rows of
//! embedder data, not a handful of fixed protocol constants, so a hash table
//! replaces a `match`-driven lookup once it's real-world sized.

use crate::error::LookupError;
use crate::types::DataType;
use std::collections::HashMap;
use std::rc::Rc;

/// Coarse functional area an OID belongs to. Purely a classification tag;
/// no behavior in this crate hangs off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Battery,
    Grid,
    Inverter,
    Energy,
    Other,
}

/// One entry in the registry: everything known about a single OID.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub object_id: u32,
    pub name: String,
    pub group: Group,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub request_data_type: DataType,
    pub response_data_type: DataType,
    /// Only meaningful when `response_data_type` is [`DataType::Enum`]:
    /// maps the wire integer to a textual label.
    pub enum_map: Option<HashMap<u8, String>>,
    /// Default value a simulator should return for this OID. Not used by
    /// the frame/value codec itself.
    pub sim_data: Option<String>,
}

/// An immutable collection of [`ObjectInfo`], indexed by `object_id` and by
/// `name`. Built once, shared read-only for the life of the registry —
/// there are no mutators.
#[derive(Debug, Clone)]
pub struct Registry {
    by_id: HashMap<u32, Rc<ObjectInfo>>,
    by_name: HashMap<String, Rc<ObjectInfo>>,
}

impl Registry {
    /// Build a registry from a table of entries. Fails loudly if any
    /// `object_id` or `name` repeats — a duplicate OID is a catalog bug,
    /// not something to silently shadow.
    pub fn build(entries: Vec<ObjectInfo>) -> Result<Registry, LookupError> {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut by_name = HashMap::with_capacity(entries.len());

        for entry in entries {
            if by_id.contains_key(&entry.object_id) {
                return Err(LookupError::DuplicateId(entry.object_id));
            }
            if by_name.contains_key(&entry.name) {
                return Err(LookupError::DuplicateName(entry.name));
            }
            let entry = Rc::new(entry);
            by_name.insert(entry.name.clone(), Rc::clone(&entry));
            by_id.insert(entry.object_id, entry);
        }

        Ok(Registry { by_id, by_name })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn by_id(&self, object_id: u32) -> Result<&ObjectInfo, LookupError> {
        self.by_id
            .get(&object_id)
            .map(|entry| entry.as_ref())
            .ok_or(LookupError::UnknownId(object_id))
    }

    pub fn by_name(&self, name: &str) -> Result<&ObjectInfo, LookupError> {
        self.by_name
            .get(name)
            .map(|entry| entry.as_ref())
            .ok_or_else(|| LookupError::UnknownName(name.to_string()))
    }
}

/// Fold the four UINT32 OIDs of a fault bitfield into a flat 128-bit view,
/// LSB-first within each word. Purely mechanical: which bit means what is a
/// consumer concern this crate doesn't claim to know.
pub fn fault_bits(words: [u32; 4]) -> [bool; 128] {
    let mut bits = [false; 128];
    for (word_index, word) in words.iter().enumerate() {
        for bit_index in 0..32 {
            bits[word_index * 32 + bit_index] = (word >> bit_index) & 1 != 0;
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ObjectInfo> {
        vec![
            ObjectInfo {
                object_id: 0x959930BF,
                name: "battery.soc".to_string(),
                group: Group::Battery,
                description: Some("state of charge".to_string()),
                unit: Some("%".to_string()),
                request_data_type: DataType::Float,
                response_data_type: DataType::Float,
                enum_map: None,
                sim_data: None,
            },
            ObjectInfo {
                object_id: 0x01234567,
                name: "grid.state".to_string(),
                group: Group::Grid,
                description: None,
                unit: None,
                request_data_type: DataType::Enum,
                response_data_type: DataType::Enum,
                enum_map: Some(HashMap::from([(0, "off".to_string()), (1, "on".to_string())])),
                sim_data: None,
            },
        ]
    }

    #[test]
    fn build_indexes_every_entry_by_both_keys() {
        let reg = Registry::build(sample()).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.by_id(0x959930BF).unwrap().name, "battery.soc");
        assert_eq!(reg.by_name("grid.state").unwrap().object_id, 0x01234567);
    }

    #[test]
    fn lookup_miss_is_an_error_not_a_placeholder() {
        let reg = Registry::build(sample()).unwrap();
        assert_eq!(reg.by_id(0xDEADBEEF).unwrap_err(), LookupError::UnknownId(0xDEADBEEF));
        assert_eq!(
            reg.by_name("no.such.oid").unwrap_err(),
            LookupError::UnknownName("no.such.oid".to_string())
        );
    }

    #[test]
    fn duplicate_id_fails_construction() {
        let mut entries = sample();
        let mut dup = entries[0].clone();
        dup.name = "different.name".to_string();
        entries.push(dup);
        assert_eq!(
            Registry::build(entries).unwrap_err(),
            LookupError::DuplicateId(0x959930BF)
        );
    }

    #[test]
    fn duplicate_name_fails_construction() {
        let mut entries = sample();
        let mut dup = entries[0].clone();
        dup.object_id = 0xAAAAAAAA;
        entries.push(dup);
        assert_eq!(
            Registry::build(entries).unwrap_err(),
            LookupError::DuplicateName("battery.soc".to_string())
        );
    }

    #[test]
    fn empty_registry_is_valid() {
        let reg = Registry::build(vec![]).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn fault_bits_are_lsb_first_per_word() {
        let bits = fault_bits([0b1, 0, 0, 0b10]);
        assert!(bits[0]);
        assert!(!bits[1]);
        assert!(bits[96 + 1]);
        assert!(!bits[96]);
    }
}
