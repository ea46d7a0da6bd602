// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face building.
//!
//! Classifies every space-boundary record by its related building element
//! and builds primary faces (walls, floors) and sub-openings (apertures,
//! doors). Runs as two strictly ordered passes: all primary faces exist
//! before any sub-opening resolves its provisional parent, so parent lookup
//! never depends on record order.

use nalgebra::Point3;
use serde::Serialize;
use tracing::{debug, warn};

use ifc_rooms_core::{EntityKind, ModelStore, Record};

use crate::boundary::{
    decode_boundary_geometry, PolygonLoop, SurfacePlane, ATTR_INTERNAL_OR_EXTERNAL,
    ATTR_RELATED_ELEMENT, ATTR_RELATING_SPACE,
};
use crate::condition::{classify, BoundaryCondition};
use crate::context::ConvertContext;
use crate::host::HostIndex;

/// IfcSlab: PredefinedType.
const ATTR_SLAB_PREDEFINED_TYPE: usize = 8;

/// Primary face types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FaceType {
    Wall,
    Floor,
}

/// Sub-opening kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubKind {
    Aperture,
    Door,
}

impl SubKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            SubKind::Aperture => "Aperture",
            SubKind::Door => "Door",
        }
    }

    pub fn properties_tag(&self) -> &'static str {
        match self {
            SubKind::Aperture => "AperturePropertiesAbridged",
            SubKind::Door => "DoorPropertiesAbridged",
        }
    }
}

/// A primary boundary surface of a room.
#[derive(Debug, Clone)]
pub struct Face {
    pub identifier: String,
    pub face_type: FaceType,
    pub outer: PolygonLoop,
    pub plane: SurfacePlane,
    pub boundary_condition: BoundaryCondition,
    pub apertures: Vec<SubOpening>,
    pub doors: Vec<SubOpening>,
    /// Owning space (model-native id).
    pub space: u32,
}

/// A window or door surface, attached to a host face by the matcher.
#[derive(Debug, Clone)]
pub struct SubOpening {
    pub identifier: String,
    pub kind: SubKind,
    pub outer: PolygonLoop,
    pub holes: Vec<PolygonLoop>,
    pub plane: SurfacePlane,
    pub boundary_condition: BoundaryCondition,
    pub space: u32,
    /// Hosting wall element, from the placement-chain resolver.
    pub host_wall: Option<u32>,
    /// Provisional parent face ids registered for the hosting wall.
    pub host_faces: Vec<String>,
}

impl SubOpening {
    /// Component-wise sum of the outer-loop coordinates, the fingerprint
    /// used by sibling matching.
    pub fn coordinate_sums(&self) -> Point3<f64> {
        let mut sums = Point3::new(0.0, 0.0, 0.0);
        for p in &self.outer {
            sums.x += p.x;
            sums.y += p.y;
            sums.z += p.z;
        }
        sums
    }
}

/// Output of the face builder.
#[derive(Debug, Default)]
pub struct BuiltFaces {
    pub faces: Vec<Face>,
    pub sub_openings: Vec<SubOpening>,
}

/// Build faces and sub-openings from every space-boundary record.
///
/// Per-boundary failures (undecodable geometry, missing references) drop
/// that one boundary with a warning; the rest of the model continues.
pub fn build_faces(
    store: &ModelStore,
    hosts: &HostIndex,
    ctx: &mut ConvertContext,
) -> BuiltFaces {
    let mut primary = Vec::new();
    let mut openings = Vec::new();

    for &boundary_id in store.ids_of(EntityKind::RelSpaceBoundary) {
        let Some(boundary) = store.record(boundary_id) else {
            continue;
        };
        let Some(element) = store.resolve_field(boundary, ATTR_RELATED_ELEMENT) else {
            warn!(boundary = boundary_id, "boundary has no related building element");
            continue;
        };

        match element.kind {
            kind if kind.is_wall_family() => primary.push((boundary, element)),
            EntityKind::Slab => primary.push((boundary, element)),
            EntityKind::Window | EntityKind::Door => openings.push((boundary, element)),
            other => debug!(
                boundary = boundary_id,
                element = element.id,
                kind = other.name(),
                "boundary element kind not processed"
            ),
        }
    }

    let mut built = BuiltFaces::default();

    // Pass 1: primary faces, registering the wall→face tables.
    for (boundary, element) in primary {
        let Some(space_id) = boundary.get_ref(ATTR_RELATING_SPACE) else {
            warn!(boundary = boundary.id, "boundary has no relating space");
            continue;
        };

        let face_type = match element.kind {
            kind if kind.is_wall_family() => FaceType::Wall,
            EntityKind::Slab => {
                if element.get_enum(ATTR_SLAB_PREDEFINED_TYPE) == Some("FLOOR") {
                    FaceType::Floor
                } else {
                    warn!(
                        boundary = boundary.id,
                        slab = element.id,
                        "skipping slab boundary without FLOOR predefined type"
                    );
                    continue;
                }
            }
            _ => continue,
        };

        let geometry = match decode_boundary_geometry(store, boundary) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!(boundary = boundary.id, error = %e, "dropping boundary with undecodable geometry");
                continue;
            }
        };

        let identifier = ctx.ids.next_id();
        if face_type == FaceType::Wall {
            ctx.wall_faces
                .entry(element.id)
                .or_default()
                .push(identifier.clone());
            ctx.face_wall.insert(identifier.clone(), element.id);
        }
        ctx.record_owner(&identifier, space_id);

        built.faces.push(Face {
            identifier,
            face_type,
            outer: geometry.outer,
            plane: geometry.plane,
            boundary_condition: boundary_condition(boundary),
            apertures: Vec::new(),
            doors: Vec::new(),
            space: space_id,
        });
    }

    // Pass 2: sub-openings, with provisional parents from the host index.
    for (boundary, element) in openings {
        let Some(space_id) = boundary.get_ref(ATTR_RELATING_SPACE) else {
            warn!(boundary = boundary.id, "boundary has no relating space");
            continue;
        };

        let kind = match element.kind {
            EntityKind::Window => SubKind::Aperture,
            EntityKind::Door => SubKind::Door,
            _ => continue,
        };

        let geometry = match decode_boundary_geometry(store, boundary) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!(boundary = boundary.id, error = %e, "dropping boundary with undecodable geometry");
                continue;
            }
        };

        let host_wall = hosts.host_of(element.id);
        let host_faces = host_wall
            .and_then(|wall| ctx.wall_faces.get(&wall))
            .cloned()
            .unwrap_or_default();
        if host_wall.is_none() {
            warn!(
                element = element.id,
                boundary = boundary.id,
                "sub-opening host wall unresolved"
            );
        }

        let identifier = ctx.ids.next_id();
        ctx.record_owner(&identifier, space_id);

        built.sub_openings.push(SubOpening {
            identifier,
            kind,
            outer: geometry.outer,
            holes: geometry.holes,
            plane: geometry.plane,
            boundary_condition: boundary_condition(boundary),
            space: space_id,
            host_wall,
            host_faces,
        });
    }

    built
}

/// Classify the boundary tag, recovering from unknown values.
fn boundary_condition(boundary: &Record) -> BoundaryCondition {
    match classify(boundary.get_enum(ATTR_INTERNAL_OR_EXTERNAL)) {
        Ok(condition) => condition,
        Err(e) => {
            warn!(boundary = boundary.id, error = %e, "defaulting boundary condition to Outdoors");
            BoundaryCondition::outdoors()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostIndex;

    fn geometry_chain(base: u32, polyline: &str) -> String {
        format!(
            "#{g}=IFCCONNECTIONSURFACEGEOMETRY(#{cbp},$);\n\
             #{cbp}=IFCCURVEBOUNDEDPLANE(#{pl},#{poly},());\n\
             #{pl}=IFCPLANE(#{ax});\n\
             #{ax}=IFCAXIS2PLACEMENT3D(#{o},#{z},#{x});\n\
             #{o}=IFCCARTESIANPOINT((0.,0.,0.));\n\
             #{z}=IFCDIRECTION((0.,1.,0.));\n\
             #{x}=IFCDIRECTION((1.,0.,0.));\n\
             {polyline}",
            g = base,
            cbp = base + 1,
            pl = base + 2,
            ax = base + 3,
            o = base + 4,
            z = base + 5,
            x = base + 6,
            poly = base + 7,
        )
    }

    fn square_polyline(base: u32) -> String {
        format!(
            "#{p}=IFCPOLYLINE((#{a},#{b},#{c},#{d}));\n\
             #{a}=IFCCARTESIANPOINT((0.,0.));\n\
             #{b}=IFCCARTESIANPOINT((4.,0.));\n\
             #{c}=IFCCARTESIANPOINT((4.,-3.));\n\
             #{d}=IFCCARTESIANPOINT((0.,-3.));\n",
            p = base + 7,
            a = base + 8,
            b = base + 9,
            c = base + 10,
            d = base + 11,
        )
    }

    fn wall_and_window_model() -> String {
        let mut content = String::from(
            "#1=IFCSPACE('s',$,'Space',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n\
             #10=IFCWALLSTANDARDCASE('w',$,'Wall',$,$,#62,$,$);\n\
             #11=IFCWINDOW('win',$,'Window',$,$,#60,$,$,1.,1.);\n\
             #60=IFCLOCALPLACEMENT(#61,#103);\n\
             #61=IFCLOCALPLACEMENT(#62,#103);\n\
             #62=IFCLOCALPLACEMENT($,#103);\n\
             #20=IFCRELSPACEBOUNDARY('b1',$,$,$,#1,#10,#100,.PHYSICAL.,.INTERNAL.);\n\
             #21=IFCRELSPACEBOUNDARY('b2',$,$,$,#1,#11,#200,.PHYSICAL.,.INTERNAL.);\n",
        );
        content.push_str(&geometry_chain(100, &square_polyline(100)));
        content.push_str(&geometry_chain(200, &square_polyline(200)));
        content
    }

    #[test]
    fn walls_become_faces_and_windows_become_sub_openings() {
        let store = ModelStore::open(&wall_and_window_model()).unwrap();
        let hosts = HostIndex::build(&store);
        let mut ctx = ConvertContext::new();
        let built = build_faces(&store, &hosts, &mut ctx);

        assert_eq!(built.faces.len(), 1);
        assert_eq!(built.sub_openings.len(), 1);

        let face = &built.faces[0];
        assert_eq!(face.face_type, FaceType::Wall);
        assert_eq!(face.space, 1);
        assert!(face.boundary_condition.is_surface());

        let sub = &built.sub_openings[0];
        assert_eq!(sub.kind, SubKind::Aperture);
        assert_eq!(sub.host_wall, Some(10));
        assert_eq!(sub.host_faces, vec![face.identifier.clone()]);
    }

    #[test]
    fn cross_reference_tables_are_registered() {
        let store = ModelStore::open(&wall_and_window_model()).unwrap();
        let hosts = HostIndex::build(&store);
        let mut ctx = ConvertContext::new();
        let built = build_faces(&store, &hosts, &mut ctx);

        let face_id = &built.faces[0].identifier;
        assert_eq!(ctx.wall_faces.get(&10), Some(&vec![face_id.clone()]));
        assert_eq!(ctx.face_wall.get(face_id), Some(&10));
        assert_eq!(ctx.first_owner(face_id), Some(1));
        assert_eq!(ctx.first_owner(&built.sub_openings[0].identifier), Some(1));
    }

    #[test]
    fn non_floor_slab_boundaries_are_skipped() {
        let mut content = String::from(
            "#1=IFCSPACE('s',$,'Space',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n\
             #10=IFCSLAB('slab',$,'Roof',$,$,$,$,'tag',.ROOF.);\n\
             #20=IFCRELSPACEBOUNDARY('b1',$,$,$,#1,#10,#100,.PHYSICAL.,.EXTERNAL.);\n",
        );
        content.push_str(&geometry_chain(100, &square_polyline(100)));

        let store = ModelStore::open(&content).unwrap();
        let hosts = HostIndex::build(&store);
        let mut ctx = ConvertContext::new();
        let built = build_faces(&store, &hosts, &mut ctx);
        assert!(built.faces.is_empty());
    }

    #[test]
    fn floor_slab_boundaries_become_floor_faces() {
        let mut content = String::from(
            "#1=IFCSPACE('s',$,'Space',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n\
             #10=IFCSLAB('slab',$,'Floor',$,$,$,$,'tag',.FLOOR.);\n\
             #20=IFCRELSPACEBOUNDARY('b1',$,$,$,#1,#10,#100,.PHYSICAL.,.EXTERNAL.);\n",
        );
        content.push_str(&geometry_chain(100, &square_polyline(100)));

        let store = ModelStore::open(&content).unwrap();
        let hosts = HostIndex::build(&store);
        let mut ctx = ConvertContext::new();
        let built = build_faces(&store, &hosts, &mut ctx);

        assert_eq!(built.faces.len(), 1);
        assert_eq!(built.faces[0].face_type, FaceType::Floor);
        // floors register no wall cross-references
        assert!(ctx.wall_faces.is_empty());
    }

    #[test]
    fn undecodable_geometry_drops_only_that_boundary() {
        // #21 has no connection geometry; #20 is intact
        let mut content = String::from(
            "#1=IFCSPACE('s',$,'Space',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n\
             #10=IFCWALLSTANDARDCASE('w',$,'Wall',$,$,$,$,$);\n\
             #11=IFCWALLSTANDARDCASE('w2',$,'Wall 2',$,$,$,$,$);\n\
             #20=IFCRELSPACEBOUNDARY('b1',$,$,$,#1,#10,#100,.PHYSICAL.,.EXTERNAL.);\n\
             #21=IFCRELSPACEBOUNDARY('b2',$,$,$,#1,#11,$,.PHYSICAL.,.EXTERNAL.);\n",
        );
        content.push_str(&geometry_chain(100, &square_polyline(100)));

        let store = ModelStore::open(&content).unwrap();
        let hosts = HostIndex::build(&store);
        let mut ctx = ConvertContext::new();
        let built = build_faces(&store, &hosts, &mut ctx);
        assert_eq!(built.faces.len(), 1);
    }

    #[test]
    fn unknown_boundary_tag_defaults_to_outdoors() {
        let mut content = String::from(
            "#1=IFCSPACE('s',$,'Space',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);\n\
             #10=IFCWALLSTANDARDCASE('w',$,'Wall',$,$,$,$,$);\n\
             #20=IFCRELSPACEBOUNDARY('b1',$,$,$,#1,#10,#100,.PHYSICAL.,.NOTDEFINED.);\n",
        );
        content.push_str(&geometry_chain(100, &square_polyline(100)));

        let store = ModelStore::open(&content).unwrap();
        let hosts = HostIndex::build(&store);
        let mut ctx = ConvertContext::new();
        let built = build_faces(&store, &hosts, &mut ctx);
        assert_eq!(
            built.faces[0].boundary_condition,
            BoundaryCondition::outdoors()
        );
    }
}
