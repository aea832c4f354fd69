//! Core entry point for the prompt_guide crate.
//!
//! The crate renders the "5 Prompts IA pour Entrepreneurs Pressés" guide: [`content`] holds the
//! copy, [`style`] the named paragraph styles, and [`builder`] turns both into PDF bytes.

pub mod builder;
pub mod content;
pub mod elements;
pub mod fonts;
pub mod model;
pub mod richtext;
pub mod style;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;
