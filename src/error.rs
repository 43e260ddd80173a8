//! Error types for the render pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the render pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// The layout module failed to load or initialize; fatal for the
    /// lifetime of the gate that attempted it
    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    /// The markup string could not be turned into a node tree
    #[error("Markup parse failed: {0}")]
    MarkupParse(String),

    /// The default font could not be fetched
    #[error("Font resolution failed: {0}")]
    FontResolution(String),

    /// A glyph image could not be fetched for a codepoint sequence
    #[error("Asset resolution failed: {0}")]
    AssetResolution(String),

    /// The renderer rejected the assembled inputs
    #[error("Rendering failed: {0}")]
    Render(String),
}
