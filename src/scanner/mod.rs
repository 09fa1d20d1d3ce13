//! Directory scanner: lists matching entries of a single directory.

pub mod listing;
