// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Rooms Engine
//!
//! Geometry reconstruction and room-topology matching over IFC space
//! boundaries.
//!
//! The engine turns a model's space-boundary records into a normalized,
//! room-centric hierarchy: rooms containing oriented planar faces, each
//! face carrying its apertures and doors, each surface annotated with an
//! Outdoors or Surface boundary condition. Downstream energy-simulation
//! tooling consumes the result as HBJSON.
//!
//! ## Pipeline
//!
//! 1. Mint one room per space ([`assemble::init_rooms`]).
//! 2. Resolve window/door hosting walls through the placement chain
//!    ([`host::HostIndex`]).
//! 3. Build faces and sub-openings from every boundary record, two passes
//!    ([`faces::build_faces`]).
//! 4. Attach sub-openings to containing wall faces and cross-link sibling
//!    doors ([`matcher`]).
//! 5. Assemble the room-face hierarchy ([`assemble::assemble_rooms`]).
//!
//! ```rust,ignore
//! use ifc_rooms_core::ModelStore;
//! use ifc_rooms_engine::convert;
//!
//! let store = ModelStore::open(&std::fs::read_to_string("model.ifc")?)?;
//! let rooms = convert(&store)?;
//! println!("{}", rooms.to_json()?);
//! ```
//!
//! All geometric comparisons use a fixed tolerance,
//! [`matcher::EPSILON`]; the source model offers no ordering or linkage
//! guarantees, so coplanarity, containment, and sibling fingerprints are
//! inferred rather than trusted.

pub mod assemble;
pub mod boundary;
pub mod condition;
pub mod context;
pub mod convert;
pub mod error;
pub mod faces;
pub mod frame;
pub mod host;
pub mod ids;
pub mod matcher;

pub use assemble::{Face3D, FaceExport, Room, RoomModel};
pub use boundary::{decode_boundary_geometry, BoundaryGeometry, PolygonLoop, SurfacePlane};
pub use condition::{classify, BoundaryCondition};
pub use context::ConvertContext;
pub use convert::{convert, convert_to_json};
pub use error::{Error, Result};
pub use faces::{build_faces, Face, FaceType, SubKind, SubOpening};
pub use frame::{resolve_frame, PlacementFrame};
pub use host::HostIndex;
pub use ids::IdGenerator;
pub use matcher::{attach_sub_openings, link_sibling_doors, EPSILON};
