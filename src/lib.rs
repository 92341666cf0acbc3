//! Maze Rats Lab — data-driven random table generation.
//!
//! Builds characters and spells from weighted, interlinked tables, then
//! localizes the result for the requested locale. Tables, domain schemas
//! and locale bundles are plain data; the engine validates them once and
//! every generation after that is a pure function of
//! `(domain, locale, random source)`.
//!
//! ```no_run
//! use maze_rats_lab::core::composer::Generator;
//! use maze_rats_lab::core::random::SeededSource;
//!
//! let generator = Generator::bundled()?;
//! let character = generator.character("pt-BR", &mut SeededSource::new(7))?;
//! println!("{}", character["name"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod data;
pub mod schema;

pub use crate::core::composer::{BuildError, GenerationError, Generator};
pub use crate::core::random::{EntropySource, RandomSource, ScriptedSource, SeededSource};
pub use crate::schema::value::{Tree, Value};
