// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline context: id generation and cross-reference tables.
//!
//! All intermediate tables are owned here and passed by reference through
//! the pipeline stages. Nothing is process-global.

use rustc_hash::FxHashMap;

use crate::ids::IdGenerator;

/// Mutable state threaded through the conversion stages.
#[derive(Debug, Default)]
pub struct ConvertContext {
    pub ids: IdGenerator,
    /// space id → generated room id
    pub space_room: FxHashMap<u32, String>,
    /// room id → index into the room list
    pub room_index: FxHashMap<String, usize>,
    /// wall element id → face ids built from its boundaries
    pub wall_faces: FxHashMap<u32, Vec<String>>,
    /// face id → wall element id
    pub face_wall: FxHashMap<String, u32>,
    /// face or sub-opening id → owning space ids (first one is used; a
    /// boundary can rarely reference more than one space)
    pub face_space: FxHashMap<String, Vec<u32>>,
}

impl ConvertContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a space, minting its room id and room-list slot.
    pub fn register_space(&mut self, space_id: u32, room_slot: usize) -> String {
        let room_id = self.ids.next_id();
        self.space_room.insert(space_id, room_id.clone());
        self.room_index.insert(room_id.clone(), room_slot);
        room_id
    }

    /// Record an owning space for a face or sub-opening.
    pub fn record_owner(&mut self, identifier: &str, space_id: u32) {
        self.face_space
            .entry(identifier.to_string())
            .or_default()
            .push(space_id);
    }

    /// First owning space of a face or sub-opening.
    pub fn first_owner(&self, identifier: &str) -> Option<u32> {
        self.face_space
            .get(identifier)
            .and_then(|spaces| spaces.first())
            .copied()
    }
}
