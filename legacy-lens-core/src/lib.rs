#![doc = "legacy-lens-core: ingestion pipeline and LLM feature logic for legacy-lens."]

//! This crate contains the ingestion pipeline (filters, file tree, flattening),
//! the [`contract::LlmClient`] collaborator interface and the downstream
//! feature functions that consume an ingested corpus.
//! Network transport lives in the `legacy-lens` CLI crate, not here.
//!
//! # Usage
//! Build an [`ingest::Ingestor`] from [`ingest::IngestOptions`], feed it
//! [`ingest::IngestInput`] values (see [`input::load_inputs`] for reading them
//! from disk) and pass the returned [`ingest::IngestionResult`] into any of the
//! functions in [`features`].

pub mod archive;
pub mod ceiling;
pub mod classify;
pub mod contract;
pub mod features;
pub mod flatten;
pub mod ingest;
pub mod input;
pub mod notebook;
pub mod pattern;
pub mod render;
pub mod tree;
