//! SweetHome3D home documents.
//!
//! A home export is a zip archive holding `Home.xml` next to the OBJ models,
//! MTL libraries and texture images it references. This module extracts the
//! archive, parses the document with `quick-xml` into a generic element tree,
//! and then into typed [`HomeNode`]s.
//!
//! ## Recognized elements
//!
//! - `home`: root, `structure` names the house mesh
//! - `level`: id, elevation, floor thickness
//! - `furnitureGroup`: nested pieces
//! - anything with a `model` attribute (`pieceOfFurniture`, `doorOrWindow`, `light`)
//! - `observerCamera`
//!
//! Walls, rooms, labels and the like are baked into the structure mesh and
//! come through as [`HomeNode::Other`].

mod archive;
mod parser;
mod types;

pub use archive::*;
pub use parser::*;
pub use types::*;
