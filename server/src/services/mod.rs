//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own account, compliance and review logic so route handlers can
//! stay focused on request parsing and response envelopes.

pub mod accounts;
pub mod compliance;
pub mod review;
