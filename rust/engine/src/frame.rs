// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement frame resolution.
//!
//! An axis2-placement record carries a location point, an axis direction
//! (local z / plane normal) and a reference direction (local x). The frame
//! derives y = z × x. If the inputs are unit length and orthogonal the
//! frame is orthonormal; the resolver does not re-normalize y, matching the
//! source model's conventions.

use nalgebra::{Point3, Vector3};

use ifc_rooms_core::{EntityKind, ModelStore, Record};

use crate::error::{Error, Result};

/// IfcAxis2Placement3D attribute positions.
const ATTR_LOCATION: usize = 0;
const ATTR_AXIS: usize = 1;
const ATTR_REF_DIRECTION: usize = 2;

/// A local coordinate frame in world space.
#[derive(Debug, Clone)]
pub struct PlacementFrame {
    pub origin: Point3<f64>,
    pub x_axis: Vector3<f64>,
    pub y_axis: Vector3<f64>,
    pub z_axis: Vector3<f64>,
}

impl PlacementFrame {
    /// Map local plane coordinates into world space:
    /// `P = origin + u·x + v·y`.
    pub fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.origin + u * self.x_axis + v * self.y_axis
    }
}

/// Resolve a placement record into a world-space frame.
///
/// Location, axis, and reference direction are all required; an absent or
/// null reference is a [`Error::MissingReference`].
pub fn resolve_frame(store: &ModelStore, placement: &Record) -> Result<PlacementFrame> {
    expect_kind(placement, EntityKind::Axis2Placement3D)?;

    let location = store
        .resolve_field(placement, ATTR_LOCATION)
        .ok_or_else(|| Error::missing(placement.id, "Location"))?;
    let axis = store
        .resolve_field(placement, ATTR_AXIS)
        .ok_or_else(|| Error::missing(placement.id, "Axis"))?;
    let ref_direction = store
        .resolve_field(placement, ATTR_REF_DIRECTION)
        .ok_or_else(|| Error::missing(placement.id, "RefDirection"))?;

    let origin = read_point(location)?;
    let z_axis = read_direction(axis)?;
    let x_axis = read_direction(ref_direction)?;
    let y_axis = z_axis.cross(&x_axis);

    Ok(PlacementFrame {
        origin,
        x_axis,
        y_axis,
        z_axis,
    })
}

/// Coordinates of a cartesian point record. 2D points get z = 0.
pub fn read_point(record: &Record) -> Result<Point3<f64>> {
    expect_kind(record, EntityKind::CartesianPoint)?;
    let [x, y, z] = read_triple(record)?;
    Ok(Point3::new(x, y, z))
}

/// Direction ratios of a direction record.
pub fn read_direction(record: &Record) -> Result<Vector3<f64>> {
    expect_kind(record, EntityKind::Direction)?;
    let [x, y, z] = read_triple(record)?;
    Ok(Vector3::new(x, y, z))
}

fn read_triple(record: &Record) -> Result<[f64; 3]> {
    let coords = record
        .get_list(0)
        .ok_or_else(|| Error::missing(record.id, "Coordinates"))?;
    if coords.len() < 2 {
        return Err(Error::missing(record.id, "Coordinates"));
    }
    let x = coords[0].as_float().unwrap_or(0.0);
    let y = coords[1].as_float().unwrap_or(0.0);
    let z = coords.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);
    Ok([x, y, z])
}

fn expect_kind(record: &Record, expected: EntityKind) -> Result<()> {
    if record.kind != expected {
        return Err(Error::UnexpectedKind {
            id: record.id,
            expected: expected.name(),
            actual: record.kind.name(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn placement_model(axis: &str, ref_dir: &str) -> String {
        format!(
            "#33=IFCAXIS2PLACEMENT3D(#34,{axis},{ref_dir});\n\
             #34=IFCCARTESIANPOINT((1.,2.,3.));\n\
             #35=IFCDIRECTION((0.,1.,0.));\n\
             #36=IFCDIRECTION((1.,0.,0.));\n"
        )
    }

    #[test]
    fn frame_axes_are_orthogonal_and_right_handed() {
        let store = ModelStore::open(&placement_model("#35", "#36")).unwrap();
        let placement = store.record(33).unwrap();
        let frame = resolve_frame(&store, placement).unwrap();

        assert_relative_eq!(frame.origin, Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(frame.x_axis.dot(&frame.z_axis), 0.0);
        assert_relative_eq!(frame.y_axis, frame.z_axis.cross(&frame.x_axis));
        // z=(0,1,0), x=(1,0,0) -> y = z × x = (0,0,-1)
        assert_relative_eq!(frame.y_axis, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn point_at_maps_local_plane_coordinates() {
        let store = ModelStore::open(&placement_model("#35", "#36")).unwrap();
        let frame = resolve_frame(&store, store.record(33).unwrap()).unwrap();

        let p = frame.point_at(4.0, -3.0);
        assert_relative_eq!(p, Point3::new(5.0, 2.0, 6.0));
    }

    #[test]
    fn absent_axis_is_a_missing_reference() {
        let store = ModelStore::open(&placement_model("$", "#36")).unwrap();
        let err = resolve_frame(&store, store.record(33).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingReference { id: 33, field: "Axis" }
        ));
    }

    #[test]
    fn absent_ref_direction_is_a_missing_reference() {
        let store = ModelStore::open(&placement_model("#35", "$")).unwrap();
        let err = resolve_frame(&store, store.record(33).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingReference {
                id: 33,
                field: "RefDirection"
            }
        ));
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let store = ModelStore::open("#1=IFCCARTESIANPOINT((0.,0.));\n").unwrap();
        let err = resolve_frame(&store, store.record(1).unwrap()).unwrap_err();
        assert!(matches!(err, Error::UnexpectedKind { .. }));
    }

    #[test]
    fn two_dimensional_points_read_with_zero_z() {
        let store = ModelStore::open("#1=IFCCARTESIANPOINT((4.,-3.));\n").unwrap();
        let p = read_point(store.record(1).unwrap()).unwrap();
        assert_relative_eq!(p, Point3::new(4.0, -3.0, 0.0));
    }
}
