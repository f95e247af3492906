use anyhow::{bail, Result};

use crate::models::{RawDocument, ResultRecord};

/// Maps a raw remote document into a `ResultRecord`.
///
/// A document without an identifier is a data error in the remote
/// collection and fails fast; no placeholder id is ever substituted.
pub fn map_document(document: RawDocument) -> Result<ResultRecord> {
    if document.id.is_empty() {
        bail!("remote document is missing its identifier");
    }

    Ok(ResultRecord {
        id: document.id,
        payload: document.data,
    })
}
