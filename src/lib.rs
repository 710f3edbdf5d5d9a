//! PicturePerfect Library
//!
//! Core library for the PicturePerfect desktop client: upload images to an
//! enhancement server, follow its model downloads, and save the results.

pub mod api;
pub mod app;
pub mod session;
pub mod storage;
pub mod types;
pub mod ui;
