//! Decode backends turning source files into display-ready frames.

/// GIF decoding, fit-policy resizing, and density normalization.
pub mod decode;
