//! Pipeline stages for slide extraction.
//!
//! Each submodule implements exactly one step. The two access strategies
//! ([`render`] and [`fetch`]) differ only in how they obtain markup; both
//! hand it to the same extraction and assembly stages.
//!
//! ## Data Flow
//!
//! ```text
//!             ┌──▶ render ──(auth)──┐
//! classify ───┤                     ├──▶ extract ──▶ assemble
//!             └──▶ fetch ───────────┘   (chunk, postprocess)
//! ```
//!
//! 1. [`classify`]  : choose the ordered strategy list from the URL alone
//! 2. [`render`]    : drive a rendering session; [`auth`] answers credential prompts
//! 3. [`fetch`]     : plain HTTP GET, no scripts
//! 4. [`extract`]   : structural, semantic, then chunked heuristics over the DOM
//! 5. [`assemble`]  : title fallback, contiguous numbering, timestamp

pub mod assemble;
pub mod auth;
pub mod chunk;
pub mod classify;
pub mod extract;
pub mod fetch;
pub mod postprocess;
pub mod render;
