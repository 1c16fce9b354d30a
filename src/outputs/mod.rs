//! Output generation modules for the weekly briefing.
//!
//! # Submodules
//!
//! - [`markdown`]: Renders the [`Briefing`](crate::models::Briefing) to the
//!   Markdown document and per-section text blocks
//! - [`html`]: Wraps the Markdown in a fixed static-HTML template
//! - [`webhook`]: Optional JSON POST of the rendered payload downstream
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 2026-W32.md
//! └── 2026-W32.html
//! ```
//!
//! Rendering is pure formatting; files are written by `main` only after the
//! whole pipeline has completed in memory.

pub mod html;
pub mod markdown;
pub mod webhook;
