//! SH3D Core - SweetHome3D home import.
//!
//! This crate provides:
//!
//! - **Home documents**: archive extraction and `Home.xml` parsing
//! - **Scene host**: the [`SceneHost`] operations an import needs, and an
//!   in-memory [`Scene`] implementing them
//! - **Import**: the tree walk that turns a home into templates, linked
//!   instances and collections
//!
//! # Example
//!
//! ```ignore
//! use sh3d_core::{import_archive, ImportConfig, Scene};
//!
//! let mut scene = Scene::new("house");
//! let report = import_archive(&mut scene, "house.zip".as_ref(), &ImportConfig::default())?;
//! println!("{} templates, {} instances", report.templates, report.instances);
//! ```

pub mod config;
pub mod home;
pub mod host;
pub mod import;
pub mod mesh;
pub mod obj;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use config::ImportConfig;
pub use home::{load_archive, parse_home, HomeDocument, HomeNode, LoadedHome, Piece};
pub use host::{ApplyTransform, HostError, SceneHost, Transform};
pub use import::{import_archive, import_home, ImportError, ImportReport};
pub use mesh::Mesh;
pub use scene::{Material, Prototype, Scene};
