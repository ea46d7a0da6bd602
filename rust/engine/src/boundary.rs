// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary geometry decoding.
//!
//! Walks a space boundary's connection geometry down to the curve-bounded
//! plane, resolves the plane's placement frame, and maps the local (u,v)
//! boundary loops into world-space polygon loops. This is the sole
//! coordinate-transform primitive of the pipeline; every polygon it emits
//! lies on the supporting plane by construction. Coordinates stay in the
//! model's native length unit.

use nalgebra::{Point3, Vector3};

use ifc_rooms_core::{AttributeValue, EntityKind, ModelStore, Record};

use crate::error::{Error, Result};
use crate::frame::{resolve_frame, PlacementFrame};

/// IfcRelSpaceBoundary attribute positions.
pub(crate) const ATTR_RELATING_SPACE: usize = 4;
pub(crate) const ATTR_RELATED_ELEMENT: usize = 5;
const ATTR_CONNECTION_GEOMETRY: usize = 6;
pub(crate) const ATTR_INTERNAL_OR_EXTERNAL: usize = 8;

/// IfcConnectionSurfaceGeometry: SurfaceOnRelatingElement.
const ATTR_SURFACE_ON_RELATING: usize = 0;
/// IfcCurveBoundedPlane: BasisSurface, OuterBoundary, InnerBoundaries.
const ATTR_BASIS_SURFACE: usize = 0;
const ATTR_OUTER_BOUNDARY: usize = 1;
const ATTR_INNER_BOUNDARIES: usize = 2;
/// IfcPlane: Position.
const ATTR_PLANE_POSITION: usize = 0;

/// An ordered, closed world-space polygon loop.
pub type PolygonLoop = Vec<Point3<f64>>;

/// The supporting plane of a decoded boundary.
#[derive(Debug, Clone)]
pub struct SurfacePlane {
    pub normal: Vector3<f64>,
    pub origin: Point3<f64>,
    pub x_axis: Vector3<f64>,
}

impl SurfacePlane {
    /// Signed distance of a point from the plane:
    /// `d = normal·p − normal·origin`.
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.normal.dot(&self.origin.coords)
    }
}

/// World-space geometry of one space boundary.
#[derive(Debug, Clone)]
pub struct BoundaryGeometry {
    pub outer: PolygonLoop,
    pub holes: Vec<PolygonLoop>,
    pub plane: SurfacePlane,
}

/// Decode a space boundary's connection geometry into world-space loops.
pub fn decode_boundary_geometry(
    store: &ModelStore,
    boundary: &Record,
) -> Result<BoundaryGeometry> {
    let connection = store
        .resolve_field(boundary, ATTR_CONNECTION_GEOMETRY)
        .ok_or_else(|| Error::missing(boundary.id, "ConnectionGeometry"))?;

    let bounded_plane = store
        .resolve_field(connection, ATTR_SURFACE_ON_RELATING)
        .ok_or_else(|| Error::missing(connection.id, "SurfaceOnRelatingElement"))?;
    expect_kind(bounded_plane, EntityKind::CurveBoundedPlane)?;

    let plane_record = store
        .resolve_field(bounded_plane, ATTR_BASIS_SURFACE)
        .ok_or_else(|| Error::missing(bounded_plane.id, "BasisSurface"))?;
    expect_kind(plane_record, EntityKind::Plane)?;

    let placement = store
        .resolve_field(plane_record, ATTR_PLANE_POSITION)
        .ok_or_else(|| Error::missing(plane_record.id, "Position"))?;
    let frame = resolve_frame(store, placement)?;

    let outer_curve = store
        .resolve_field(bounded_plane, ATTR_OUTER_BOUNDARY)
        .ok_or_else(|| Error::missing(bounded_plane.id, "OuterBoundary"))?;
    let outer = decode_loop(store, outer_curve, &frame)?;

    let mut holes = Vec::new();
    if let Some(inner) = bounded_plane.get_list(ATTR_INNER_BOUNDARIES) {
        for attr in inner {
            let curve = store
                .resolve(attr)
                .ok_or_else(|| Error::missing(bounded_plane.id, "InnerBoundaries"))?;
            holes.push(decode_loop(store, curve, &frame)?);
        }
    }

    Ok(BoundaryGeometry {
        outer,
        holes,
        plane: SurfacePlane {
            normal: frame.z_axis,
            origin: frame.origin,
            x_axis: frame.x_axis,
        },
    })
}

/// Map one point-list curve through the frame into a world-space loop.
fn decode_loop(
    store: &ModelStore,
    curve: &Record,
    frame: &PlacementFrame,
) -> Result<PolygonLoop> {
    expect_kind(curve, EntityKind::Polyline)?;
    let points = curve
        .get_list(0)
        .ok_or_else(|| Error::missing(curve.id, "Points"))?;

    let mut world = Vec::with_capacity(points.len());
    for attr in points {
        let (u, v) = read_uv(store, curve.id, attr)?;
        world.push(frame.point_at(u, v));
    }

    // Polylines may repeat the first point to close the loop explicitly.
    if world.len() > 1 && world.first() == world.last() {
        world.pop();
    }

    if world.len() < 3 {
        return Err(Error::DegenerateLoop(world.len()));
    }
    Ok(world)
}

fn read_uv(store: &ModelStore, curve_id: u32, attr: &AttributeValue) -> Result<(f64, f64)> {
    let point = store
        .resolve(attr)
        .ok_or_else(|| Error::missing(curve_id, "Points"))?;
    expect_kind(point, EntityKind::CartesianPoint)?;
    let coords = point
        .get_list(0)
        .ok_or_else(|| Error::missing(point.id, "Coordinates"))?;
    if coords.len() < 2 {
        return Err(Error::missing(point.id, "Coordinates"));
    }
    Ok((
        coords[0].as_float().unwrap_or(0.0),
        coords[1].as_float().unwrap_or(0.0),
    ))
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
