//! UI components for PicturePerfect
//!
//! This module contains all user interface components built with Dioxus.
//! Components only read the session and call into `AppState`; they hold no
//! state of their own beyond transient hover/drag flags.

#![allow(non_snake_case)]

pub mod gallery;
pub mod header;
pub mod layout;
pub mod model_modal;
pub mod toasts;
pub mod upload;

pub use layout::Layout;
