//! Derived views over server-reported entries: the navigation tree, the
//! filtered/sorted listing, and the active-path trail.

pub mod active;
pub mod listing;
pub mod tree;
