// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion pipeline.
//!
//! Fixed stage order over one model: mint rooms from spaces, resolve
//! opening hosts, build faces and sub-openings (two passes), attach
//! sub-openings to their wall faces, cross-link sibling doors, assemble
//! rooms. Single-threaded and synchronous; the caller owns the store and
//! drops it after conversion.

use tracing::{debug, warn};

use ifc_rooms_core::ModelStore;

use crate::assemble::{assemble_rooms, init_rooms, RoomModel};
use crate::context::ConvertContext;
use crate::error::{Error, Result};
use crate::faces::build_faces;
use crate::host::HostIndex;
use crate::matcher::{attach_sub_openings, link_sibling_doors};

/// Convert a model into its room-face hierarchy.
pub fn convert(store: &ModelStore) -> Result<RoomModel> {
    let mut ctx = ConvertContext::new();

    let mut rooms = init_rooms(store, &mut ctx);
    debug!(rooms = rooms.len(), "minted rooms");

    let hosts = HostIndex::build(store);
    let built = build_faces(store, &hosts, &mut ctx);
    debug!(
        faces = built.faces.len(),
        sub_openings = built.sub_openings.len(),
        "built boundary surfaces"
    );

    let mut faces = built.faces;
    let unattached = attach_sub_openings(&mut faces, built.sub_openings);
    if !unattached.is_empty() {
        warn!(
            count = unattached.len(),
            "sub-openings excluded from output: no containing face"
        );
    }

    link_sibling_doors(&mut faces, &ctx);
    assemble_rooms(faces, &mut rooms, &ctx);

    Ok(RoomModel { rooms })
}

/// Convert a model straight to its JSON serialization.
pub fn convert_to_json(store: &ModelStore) -> Result<String> {
    let model = convert(store)?;
    model
        .to_json()
        .map_err(|e| Error::Serialization(e.to_string()))
}
