//! Data model: tables, domain schemas, locale bundles and result values.

pub mod domain;
pub mod locale;
pub mod pairs;
pub mod table;
pub mod value;
