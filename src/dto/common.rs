//! Shapes shared across several endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Plain acknowledgement returned by mutation endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    /// Always `true` on success.
    pub ok: bool,
}

impl Ack {
    /// Successful acknowledgement.
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
