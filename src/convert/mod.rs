//! Markup conversion.
//!
//! - [`asciidoc`] encodes the asciidoctor option bag into arguments
//! - [`Renderer`] is the seam to the external tools, with
//!   [`ProcessRenderer`] as the production implementation
//! - [`Converter`] runs the steps that produce [`RenderedBodies`]

pub mod asciidoc;
mod error;
mod pipeline;
mod renderer;

pub use asciidoc::AsciidoctorOptions;
pub use error::ConversionError;
pub use pipeline::{
    ASCIIDOC_FORMATS, Converter, DOCBOOK, HTML_BACKEND, HTML_FORMAT, RenderedBodies, is_asciidoc,
};
pub use renderer::{Invocation, ProcessRenderer, Renderer, Tool, ToolPaths};
