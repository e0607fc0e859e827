//! HTTP implementation of the roster [`RemoteGateway`] seam.
//!
//! One [`RestGateway`] instance serves one resource of the admin console
//! (banners, guideline posts, casino companies, recommendation bundles,
//! remittance partners); all of them speak the same JSON contract. The
//! admin site a gateway talks to is selected by the explicit
//! [`SessionContext`] passed at construction, never inferred from ambient
//! runtime state.
//!
//! [`RemoteGateway`]: roster_api::RemoteGateway

pub mod client;
pub mod fake;
pub mod models;

#[cfg(test)]
mod engine_integration_test;

pub use client::{RestGateway, SessionContext};
pub use fake::FakeResource;
