//! Per-notification flag state mirrored on the backend.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read/deleted flags for one notification id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFlagState {
    pub read: bool,
    pub deleted: bool,
}

/// Remote flags keyed by notification id.
pub type RemoteFlagMap = HashMap<String, RemoteFlagState>;
