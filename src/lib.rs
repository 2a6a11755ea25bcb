//! Date-grouped photo gallery over a scanned JSON manifest.
//!
//! The [`controller::GalleryController`] owns the dataset and view state;
//! [`view`] describes the page it produces and [`gallery`] commits that
//! description to HTML.

pub mod controller;
pub mod date;
pub mod gallery;
pub mod lightbox;
pub mod listing;
pub mod manifest;
pub mod nav;
pub mod serve;
pub mod view;
