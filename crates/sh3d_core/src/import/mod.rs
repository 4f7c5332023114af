//! Home import into a [`SceneHost`](crate::host::SceneHost).
//!
//! [`import_archive`] is the whole run: unpack and parse the archive, reset the
//! scene, import the structure mesh, then walk the document placing every
//! piece. Placement math lives in [`placement`] and is host independent.

mod importer;
pub mod placement;

pub use importer::*;
