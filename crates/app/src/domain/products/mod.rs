//! Products
//!
//! Catalog management belongs to sellers and lives outside this crate; the
//! checkout core only reads product snapshots and applies stock deltas.

pub mod data;
pub mod records;
