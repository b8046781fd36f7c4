pub mod backend;
pub mod error;
mod path;

#[cfg(feature = "http")]
pub use crate::backend::HttpSource;
#[cfg(feature = "mock")]
pub use crate::backend::MockSource;
pub use crate::backend::{ChapterSource, HtmlOnlySource, LocalSource};
pub use crate::path::{ChapterPaths, validate as validate_path};
use std::sync::Arc;

pub type SourceHandle = Arc<dyn ChapterSource + Send + Sync>;
