//! Userpool Core
//!
//! Host side of the user pool client reconciler: the value model, the
//! `Provider` contract adapters implement, schemas, and the
//! diff / plan / interpret pipeline that drives lifecycle calls.

pub mod differ;
pub mod effect;
pub mod interpreter;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
