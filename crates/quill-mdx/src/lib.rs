//! Post source parsing for quill.
//!
//! This crate owns the two halves of turning a post source file into
//! HTML: splitting and decoding the YAML frontmatter block, and rendering
//! the markdown body with the site-aware link, heading, and footnote
//! rewrites.

pub mod frontmatter;
pub mod render;

pub use frontmatter::{split, Frontmatter, FrontmatterError};
pub use render::Renderer;
