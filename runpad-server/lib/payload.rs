//! Request and response payloads for the runpad API.
//!
//! Field names follow the wire contract the frontend already speaks:
//! camelCase keys, a `success`/`message` pair on mutating responses, and
//! snapshot history as `versions`, newest first.

use chrono::{DateTime, Utc};
use runpad_core::store::Snapshot;
use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types: Requests
//--------------------------------------------------------------------------------------------------

/// Request payload for running a code submission.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Source text to execute.
    pub code: String,
}

/// Request payload for saving a snapshot of a note's code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCodeRequest {
    /// Source text to persist.
    pub code: String,

    /// Note the snapshot belongs to.
    pub note_id: String,
}

/// Request payload for fetching a note's code and history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCodeRequest {
    /// Note to fetch.
    pub note_id: String,
}

//--------------------------------------------------------------------------------------------------
// Types: Responses
//--------------------------------------------------------------------------------------------------

/// Response payload carrying the decoded execution output.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    /// Interleaved stdout/stderr text, possibly empty.
    pub output: String,
}

/// Response payload for a save operation.
#[derive(Debug, Serialize)]
pub struct SaveCodeResponse {
    /// Whether the save took effect.
    pub success: bool,

    /// Status message for the frontend.
    pub message: String,

    /// Timestamp assigned to the new snapshot.
    pub timestamp: DateTime<Utc>,
}

/// Response payload carrying the latest code and the full version history.
#[derive(Debug, Serialize)]
pub struct GetCodeResponse {
    /// Content of the newest snapshot, empty when none exist.
    pub code: String,

    /// Whether the lookup succeeded.
    pub success: bool,

    /// Status message for the frontend.
    pub message: String,

    /// Every stored snapshot, newest first.
    pub versions: Vec<CodeVersion>,
}

/// One snapshot as exposed over the API.
#[derive(Debug, Serialize)]
pub struct CodeVersion {
    /// The saved source text.
    pub content: String,

    /// When the snapshot was created.
    pub timestamp: DateTime<Utc>,
}

/// Response type for plain message responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message describing the outcome.
    pub message: String,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl From<Snapshot> for CodeVersion {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            content: snapshot.get_content().clone(),
            timestamp: *snapshot.get_timestamp(),
        }
    }
}
