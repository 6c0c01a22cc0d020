// Core types shared by the ArtWeave client crates: the wire model, config
// loading, the per-session store, and image URL resolution.

pub mod config;
pub mod images;
pub mod model;
pub mod session;
