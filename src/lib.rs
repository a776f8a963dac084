//! cellarmatch: order-line resolution engine.
//!
//! Maps free-text, abbreviated, mixed-language order lines to canonical
//! catalog item codes, scoped to a client's purchase history, with
//! automatic learning from confirmed corrections and a catalog-wide
//! fallback for items never before purchased.
//!
//! The engine is synchronous and in-memory: catalog and history rows are
//! loaded into a [`catalog::CatalogCache`], learned knowledge lives in a
//! [`knowledge::KnowledgeStore`], and [`matching::OrderLineResolver`] ties
//! them together per call. Persistence, ingestion, and any upstream text
//! parsing are external collaborators.

pub mod catalog;
pub mod client;
pub mod config;
pub mod knowledge;
pub mod matching;
pub mod similarity;
pub mod text;
pub mod types;

pub use catalog::{CatalogCache, CatalogItem, ClientItemHistory};
pub use client::{resolve_client, ClientDirectory, ClientResolutionResult};
pub use config::ResolverConfig;
pub use knowledge::{learn_from_confirmation, ConfirmedSelection, KnowledgeStore};
pub use matching::{
    Candidate, MatchStatus, OrderLineResolver, ResolutionResult, ResolveMethod, ResolveOptions,
};
pub use types::{ResolveError, ResolveResult};
