// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Rooms Core
//!
//! STEP (ISO-10303-21) record store for the `ifc-rooms` engine, built with
//! [nom](https://docs.rs/nom).
//!
//! This crate is the model-access collaborator of the pipeline: it decodes
//! `#id=TYPE(...);` entity-instance lines into typed records and answers the
//! three queries the engine needs:
//!
//! - record by numeric id,
//! - all ids of an entity kind, in first-seen order,
//! - resolution of an embedded reference attribute.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_rooms_core::{EntityKind, ModelStore};
//!
//! let store = ModelStore::open("#1=IFCSPACE('guid',$,$,$,$,$,$,$,$,$,$);")?;
//! for &id in store.ids_of(EntityKind::Space) {
//!     let space = store.record(id).unwrap();
//!     println!("space #{} = {:?}", id, space.get_string(0));
//! }
//! ```
//!
//! Malformed entity lines are skipped with a diagnostic; the rest of the
//! model stays usable. Entity kinds outside the handful the room pipeline
//! consumes decode as [`EntityKind::Other`] and remain resolvable as
//! reference targets.

pub mod error;
pub mod parser;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use parser::{parse_record, Token};
pub use record::{AttributeValue, EntityKind, Record};
pub use store::ModelStore;
