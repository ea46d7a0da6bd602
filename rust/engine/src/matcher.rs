// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology matching.
//!
//! Two stages over the built faces: sub-openings attach to the wall face of
//! their space that geometrically contains them, then door sub-openings on
//! opposite sides of a partition are cross-linked as siblings. The source
//! model guarantees no ordering or linkage for either, so both are inferred
//! from coplanarity, containment, and loop-fingerprint tests under a fixed
//! tolerance.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::boundary::SurfacePlane;
use crate::condition::BoundaryCondition;
use crate::context::ConvertContext;
use crate::faces::{Face, FaceType, SubKind, SubOpening};

/// Tolerance for coplanarity, containment, and sibling fingerprint tests.
pub const EPSILON: f64 = 1e-10;

/// Attach each sub-opening to the wall face of its owning space that
/// contains it.
///
/// A sub-opening satisfying containment against several faces keeps the
/// last match in enumeration order. Returns the sub-openings that matched
/// no face; they are excluded from the output.
pub fn attach_sub_openings(faces: &mut [Face], sub_openings: Vec<SubOpening>) -> Vec<SubOpening> {
    let mut unattached = Vec::new();

    for sub in sub_openings {
        let mut target = None;

        for (index, face) in faces.iter().enumerate() {
            if face.face_type != FaceType::Wall || face.space != sub.space {
                continue;
            }
            if !coplanar(&sub.plane, &face.plane) || !contained(&sub, &face.plane) {
                continue;
            }
            if let Some(previous) = target.replace(index) {
                debug!(
                    sub = %sub.identifier,
                    previous,
                    chosen = index,
                    "sub-opening contained in multiple faces, keeping the last"
                );
            }
        }

        match target {
            Some(index) => {
                let face = &mut faces[index];
                match sub.kind {
                    SubKind::Aperture => face.apertures.push(sub),
                    SubKind::Door => face.doors.push(sub),
                }
            }
            None => {
                warn!(
                    sub = %sub.identifier,
                    "sub-opening not contained in any wall face of its space"
                );
                unattached.push(sub);
            }
        }
    }

    unattached
}

/// Plane normals are parallel or anti-parallel.
fn coplanar(a: &SurfacePlane, b: &SurfacePlane) -> bool {
    a.normal.cross(&b.normal).norm() < EPSILON
}

/// Every outer-loop point lies on the face's plane.
fn contained(sub: &SubOpening, plane: &SurfacePlane) -> bool {
    sub.outer
        .iter()
        .all(|p| plane.signed_distance(p).abs() < EPSILON)
}

/// Cross-link sibling doors across interior partitions.
///
/// Two attached doors are siblings when their normals are anti-parallel
/// and their outer-loop coordinate sums agree on every axis except the one
/// the normals differ along. Each sibling's boundary condition then
/// references the other door, the other door's parent face, and that
/// face's room. First match wins: identical repeat writes are skipped,
/// conflicting ones are dropped with a data-quality warning.
pub fn link_sibling_doors(faces: &mut [Face], ctx: &ConvertContext) {
    let slots: Vec<(usize, usize)> = faces
        .iter()
        .enumerate()
        .flat_map(|(face_index, face)| (0..face.doors.len()).map(move |door| (face_index, door)))
        .collect();

    let mut writes = Vec::new();

    for &(a_face, a_door) in &slots {
        let a = &faces[a_face].doors[a_door];
        if !a.boundary_condition.is_surface() {
            continue;
        }
        for &(b_face, b_door) in &slots {
            if (a_face, a_door) == (b_face, b_door) {
                continue;
            }
            let b = &faces[b_face].doors[b_door];
            if !is_sibling_pair(a, b) {
                continue;
            }

            writes.push(((a_face, a_door), sibling_condition(b, &faces[b_face], ctx)));
            writes.push(((b_face, b_door), sibling_condition(a, &faces[a_face], ctx)));
        }
    }

    for ((face_index, door_index), condition) in writes {
        let door = &mut faces[face_index].doors[door_index];
        if door.boundary_condition.objects().is_empty() {
            door.boundary_condition = condition;
        } else if door.boundary_condition.objects() != condition.objects() {
            warn!(
                door = %door.identifier,
                "conflicting repeated sibling link ignored"
            );
        }
    }
}

fn is_sibling_pair(a: &SubOpening, b: &SubOpening) -> bool {
    let dot = a.plane.normal.dot(&b.plane.normal);
    if (dot + 1.0).abs() >= EPSILON {
        return false;
    }

    // the axis the anti-parallel normals differ along
    let mut differing = None;
    for axis in 0..3 {
        if (a.plane.normal[axis] - b.plane.normal[axis]).abs() > EPSILON {
            differing = Some(axis);
        }
    }
    let Some(differing) = differing else {
        return false;
    };

    let sums_a = a.coordinate_sums();
    let sums_b = b.coordinate_sums();
    let axis_matches: [bool; 3] = std::array::from_fn(|axis| {
        (sums_a[axis] - sums_b[axis]).abs() <= EPSILON
    });

    // siblings coincide except along the partition's thickness
    !axis_matches[differing]
        && (0..3)
            .filter(|&axis| axis != differing)
            .all(|axis| axis_matches[axis])
}

fn sibling_condition(
    other: &SubOpening,
    other_parent: &Face,
    ctx: &ConvertContext,
) -> BoundaryCondition {
    let mut objects = SmallVec::new();
    objects.push(other.identifier.clone());
    objects.push(other_parent.identifier.clone());
    match ctx.space_room.get(&other_parent.space) {
        Some(room) => objects.push(room.clone()),
        None => warn!(
            space = other_parent.space,
            "sibling parent face owned by an unregistered space"
        ),
    }
    BoundaryCondition::surface_with(objects)
}
