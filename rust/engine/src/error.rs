// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for reconstruction and matching operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconstructing room topology.
#[derive(Error, Debug)]
pub enum Error {
    /// A required reference attribute is absent or unresolvable. Geometry
    /// for the affected record cannot be reconstructed.
    #[error("record #{id} has no resolvable {field} reference")]
    MissingReference { id: u32, field: &'static str },

    /// A reference resolved to a record of the wrong kind.
    #[error("record #{id}: expected {expected}, got {actual}")]
    UnexpectedKind {
        id: u32,
        expected: &'static str,
        actual: &'static str,
    },

    /// An internal-or-external tag outside {EXTERNAL, INTERNAL}.
    #[error("unknown boundary type {0:?} (expected EXTERNAL or INTERNAL)")]
    UnknownBoundaryType(String),

    /// A boundary loop with fewer than three points.
    #[error("degenerate boundary loop with {0} points")]
    DegenerateLoop(usize),

    /// A face's owning space is not part of the model's space set.
    #[error("space #{0} is not part of the model's space set")]
    UnresolvedSpace(u32),

    /// Output serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Model-access failure.
    #[error("model store error: {0}")]
    Core(#[from] ifc_rooms_core::Error),
}

impl Error {
    pub fn missing(id: u32, field: &'static str) -> Self {
        Error::MissingReference { id, field }
    }
}
