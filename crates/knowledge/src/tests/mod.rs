//! Cross-component tests for the retrieval-and-trust engine.

mod rag_ranking;
mod scenarios;
