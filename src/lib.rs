//! Policy handbook Q&A service.
//!
//! A small retrieval-augmented-generation pipeline over a single PDF:
//! extraction → chunking → embedding → flat L2 index → search → constrained
//! answer generation, served over a thin HTTP surface.

pub mod chunker;
pub mod config;
pub mod errors;
pub mod index;
pub mod llm;
pub mod metrics;
pub mod pdf;
pub mod routes;
pub mod services;
