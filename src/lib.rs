//! Manhattan plots for metabolite GWAS result tables.
//!
//! The pipeline: load a wide marker-by-trait table (`table`), derive the
//! chromosome axis layout (`layout`), optionally reshape to long form and
//! rank traits (`rank`), build declarative plot scenes (`scene`), and
//! export them through plotters (`render`).

pub mod error;
pub mod layout;
pub mod rank;
pub mod render;
pub mod scene;
pub mod table;
