// Document assembly — maps the proposal schema onto renderer-ready layout
// blocks. Pure and synchronous; the external renderer owns pagination, text
// measurement, and font embedding.

pub mod assemble;
pub mod blocks;
pub mod format;

// Re-export the public API consumed by other modules (render, handlers).
pub use assemble::assemble;
pub use blocks::Document;
