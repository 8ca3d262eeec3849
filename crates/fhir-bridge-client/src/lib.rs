// crates/fhir-bridge-client/src/lib.rs
// ============================================================================
// Module: FHIR Bridge Client
// Description: Remote store adapter for the FHIR Bridge MCP server.
// Purpose: Provide the store collaborator interface, the authentication
// gate, and the generic resource adapter.
// Dependencies: fhir-bridge-core, reqwest, tokio
// ============================================================================

//! ## Overview
//! The client crate owns everything that talks to the remote store: the
//! [`FhirStore`] collaborator interface with its HTTP implementation, the
//! lazy session gate, the query-string builders, and the generic resource
//! adapter that implements create/read/update/delete/search/patch/upsert
//! semantics on top of the store primitives.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod client;
pub mod query;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::ResourceAdapter;
pub use adapter::SearchPage;
pub use adapter::unwrap_bundle;
pub use client::FhirStore;
pub use client::HttpFhirStore;
pub use client::StoreConfig;
pub use client::fhir_path;
pub use query::api_query;
pub use query::search_query;
