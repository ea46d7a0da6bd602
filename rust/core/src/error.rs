// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model access.

use thiserror::Error;

/// Result type for model-access operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or querying a model.
#[derive(Error, Debug)]
pub enum Error {
    /// An entity line could not be tokenized. During store construction the
    /// offending record is skipped; the error surfaces only when a single
    /// line is parsed directly.
    #[error("malformed record at byte {offset}: {message}")]
    MalformedRecord { offset: usize, message: String },

    /// A record id was queried that the model does not contain.
    #[error("record #{0} not found")]
    RecordNotFound(u32),

    /// The input contained no decodable entity records at all.
    #[error("no entity records found in model input")]
    EmptyModel,
}

impl Error {
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Error::MalformedRecord {
            offset,
            message: message.into(),
        }
    }
}
