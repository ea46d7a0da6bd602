// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room assembly and the exported room-face hierarchy.
//!
//! Rooms are minted from the model's spaces up front; after matching,
//! every completed face lands in its owning room's face list in builder
//! registration order. The exported structure mirrors the HBJSON shape
//! consumed by downstream energy tooling.

use serde::Serialize;
use tracing::{debug, warn};

use ifc_rooms_core::{EntityKind, ModelStore};

use crate::boundary::PolygonLoop;
use crate::condition::BoundaryCondition;
use crate::context::ConvertContext;
use crate::error::{Error, Result};
use crate::faces::{Face, FaceType, SubOpening};

/// The finished conversion output.
#[derive(Debug, Serialize)]
pub struct RoomModel {
    pub rooms: Vec<Room>,
}

impl RoomModel {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Serialize)]
pub struct Room {
    pub identifier: String,
    #[serde(rename = "type")]
    pub type_tag: &'static str,
    pub faces: Vec<FaceExport>,
    pub properties: &'static str,
}

/// One exported face, aperture, or door.
#[derive(Debug, Serialize)]
pub struct FaceExport {
    pub identifier: String,
    #[serde(rename = "type")]
    pub type_tag: &'static str,
    pub geometry: Face3D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_type: Option<FaceType>,
    pub boundary_condition: BoundaryCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apertures: Option<Vec<FaceExport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors: Option<Vec<FaceExport>>,
    pub properties: &'static str,
}

/// Planar polygon geometry with optional holes.
#[derive(Debug, Serialize)]
pub struct Face3D {
    #[serde(rename = "type")]
    pub type_tag: &'static str,
    pub boundary: Vec<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holes: Option<Vec<Vec<[f64; 3]>>>,
}

fn loop_coords(polygon: &PolygonLoop) -> Vec<[f64; 3]> {
    polygon.iter().map(|p| [p.x, p.y, p.z]).collect()
}

impl From<SubOpening> for FaceExport {
    fn from(sub: SubOpening) -> Self {
        let holes = if sub.holes.is_empty() {
            None
        } else {
            Some(sub.holes.iter().map(|h| loop_coords(h)).collect())
        };
        FaceExport {
            type_tag: sub.kind.type_tag(),
            properties: sub.kind.properties_tag(),
            identifier: sub.identifier,
            geometry: Face3D {
                type_tag: "Face3D",
                boundary: loop_coords(&sub.outer),
                holes,
            },
            face_type: None,
            boundary_condition: sub.boundary_condition,
            apertures: None,
            doors: None,
        }
    }
}

impl From<Face> for FaceExport {
    fn from(face: Face) -> Self {
        FaceExport {
            type_tag: "Face",
            properties: "FacePropertiesAbridged",
            identifier: face.identifier,
            geometry: Face3D {
                type_tag: "Face3D",
                boundary: loop_coords(&face.outer),
                // opening holes belong to the sub-openings, not the face
                holes: None,
            },
            face_type: Some(face.face_type),
            boundary_condition: face.boundary_condition,
            apertures: Some(face.apertures.into_iter().map(Into::into).collect()),
            doors: Some(face.doors.into_iter().map(Into::into).collect()),
        }
    }
}

/// Mint one room per space, in enumeration order.
pub fn init_rooms(store: &ModelStore, ctx: &mut ConvertContext) -> Vec<Room> {
    let mut rooms = Vec::new();
    for (slot, &space_id) in store.ids_of(EntityKind::Space).iter().enumerate() {
        let identifier = ctx.register_space(space_id, slot);
        rooms.push(Room {
            identifier,
            type_tag: "Room",
            faces: Vec::new(),
            properties: "RoomPropertiesAbridged",
        });
    }
    rooms
}

/// Append every completed face to its owning room.
///
/// A face whose owning space never registered is dropped with a warning;
/// extra recorded owners beyond the first are noted at debug level.
pub fn assemble_rooms(faces: Vec<Face>, rooms: &mut [Room], ctx: &ConvertContext) {
    for face in faces {
        let slot = match room_slot(ctx, &face) {
            Ok(slot) => slot,
            Err(e) => {
                warn!(face = %face.identifier, error = %e, "dropping face");
                continue;
            }
        };
        rooms[slot].faces.push(face.into());
    }
}

fn room_slot(ctx: &ConvertContext, face: &Face) -> Result<usize> {
    let owners = ctx
        .face_space
        .get(&face.identifier)
        .filter(|owners| !owners.is_empty())
        .ok_or(Error::UnresolvedSpace(face.space))?;
    if owners.len() > 1 {
        debug!(
            face = %face.identifier,
            owners = owners.len(),
            "face records multiple owning spaces, using the first"
        );
    }
    let space_id = owners[0];
    let room_id = ctx
        .space_room
        .get(&space_id)
        .ok_or(Error::UnresolvedSpace(space_id))?;
    let slot = ctx
        .room_index
        .get(room_id)
        .ok_or(Error::UnresolvedSpace(space_id))?;
    Ok(*slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::SurfacePlane;
    use nalgebra::{Point3, Vector3};

    fn face(identifier: &str, space: u32) -> Face {
        Face {
            identifier: identifier.to_string(),
            face_type: FaceType::Wall,
            outer: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
            ],
            plane: SurfacePlane {
                normal: Vector3::new(0.0, 1.0, 0.0),
                origin: Point3::new(0.0, 0.0, 0.0),
                x_axis: Vector3::new(1.0, 0.0, 0.0),
            },
            boundary_condition: BoundaryCondition::outdoors(),
            apertures: Vec::new(),
            doors: Vec::new(),
            space,
        }
    }

    fn spaces_model() -> ModelStore {
        ModelStore::open(
            "#1=IFCSPACE('s1',$,'One',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n\
             #2=IFCSPACE('s2',$,'Two',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n",
        )
        .unwrap()
    }

    #[test]
    fn one_room_per_space_in_enumeration_order() {
        let store = spaces_model();
        let mut ctx = ConvertContext::new();
        let rooms = init_rooms(&store, &mut ctx);

        assert_eq!(rooms.len(), 2);
        assert_eq!(ctx.room_index[&rooms[0].identifier], 0);
        assert_eq!(ctx.room_index[&rooms[1].identifier], 1);
        assert_eq!(ctx.space_room[&1], rooms[0].identifier);
        assert_eq!(ctx.space_room[&2], rooms[1].identifier);
    }

    #[test]
    fn every_face_lands_in_exactly_one_room() {
        let store = spaces_model();
        let mut ctx = ConvertContext::new();
        let mut rooms = init_rooms(&store, &mut ctx);

        let faces = vec![face("F1", 1), face("F2", 2), face("F3", 1)];
        for f in &faces {
            ctx.record_owner(&f.identifier, f.space);
        }
        assemble_rooms(faces, &mut rooms, &ctx);

        let total: usize = rooms.iter().map(|r| r.faces.len()).sum();
        assert_eq!(total, 3);
        assert_eq!(rooms[0].faces.len(), 2);
        assert_eq!(rooms[1].faces.len(), 1);
        assert_eq!(rooms[0].faces[0].identifier, "F1");
        assert_eq!(rooms[0].faces[1].identifier, "F3");
    }

    #[test]
    fn faces_of_unregistered_spaces_are_dropped() {
        let store = spaces_model();
        let mut ctx = ConvertContext::new();
        let mut rooms = init_rooms(&store, &mut ctx);

        let stray = face("F9", 99);
        ctx.record_owner("F9", 99);
        assemble_rooms(vec![stray], &mut rooms, &ctx);
        assert!(rooms.iter().all(|r| r.faces.is_empty()));
    }

    #[test]
    fn export_shape_matches_the_output_schema() {
        let f = face("F1", 1);
        let export: FaceExport = f.into();
        let value = serde_json::to_value(&export).unwrap();

        assert_eq!(value["type"], "Face");
        assert_eq!(value["geometry"]["type"], "Face3D");
        assert_eq!(value["geometry"]["boundary"][1][0], 1.0);
        assert!(value["geometry"].get("holes").is_none());
        assert_eq!(value["face_type"], "Wall");
        assert_eq!(value["boundary_condition"]["type"], "Outdoors");
        assert_eq!(value["properties"], "FacePropertiesAbridged");
        assert_eq!(value["apertures"], serde_json::json!([]));
    }
}
