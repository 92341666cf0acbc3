//! The generation engine: registry, random sources, selection,
//! localization and domain composition.

pub mod composer;
pub mod localizer;
pub mod pattern;
pub mod random;
pub mod registry;
pub mod selector;
