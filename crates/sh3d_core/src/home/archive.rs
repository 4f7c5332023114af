//! Home archive extraction.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;

use super::parser::{parse_home, HomeError};
use super::types::HomeDocument;
use crate::config::ImportConfig;

/// Name of the directory an archive is unpacked into, next to the archive.
pub const EXTRACTION_DIR_NAME: &str = "xml";

/// Errors that can occur while opening a home archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive has no {name} (looked in {dir})")]
    MissingDocument { name: String, dir: PathBuf },

    #[error("Invalid home document: {0}")]
    Home(#[from] HomeError),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A parsed home together with the directory its files were unpacked to.
#[derive(Clone, Debug)]
pub struct LoadedHome {
    pub document: HomeDocument,
    pub extraction_dir: PathBuf,
}

impl LoadedHome {
    /// Resolve a path from the document against the extraction directory.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.extraction_dir.join(relative)
    }
}

/// `<archive dir>/xml`
pub fn default_extraction_dir(archive: &Path) -> PathBuf {
    archive
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(EXTRACTION_DIR_NAME)
}

/// Unpack `archive` (replacing any previous extraction) and parse its document.
pub fn load_archive(archive: &Path, config: &ImportConfig) -> ArchiveResult<LoadedHome> {
    let archive = std::path::absolute(archive).map_err(io_error(archive))?;
    let dir = config
        .extraction_dir
        .clone()
        .unwrap_or_else(|| default_extraction_dir(&archive));

    match std::fs::remove_dir_all(&dir) {
        Ok(()) => log::debug!("Removed previous extraction {}", dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_error(&dir)(e)),
    }
    std::fs::create_dir_all(&dir).map_err(io_error(&dir))?;

    let file = File::open(&archive).map_err(io_error(&archive))?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    log::info!(
        "Extracting {} ({} entries) to {}",
        archive.display(),
        zip.len(),
        dir.display()
    );
    zip.extract(&dir)?;

    load_extracted(&dir, &config.document_name)
}

/// Parse the document of an already unpacked archive.
pub fn load_extracted(dir: &Path, document_name: &str) -> ArchiveResult<LoadedHome> {
    let path = dir.join(document_name);
    if !path.is_file() {
        return Err(ArchiveError::MissingDocument {
            name: document_name.to_string(),
            dir: dir.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(&path).map_err(io_error(&path))?;
    let document = parse_home(&content)?;

    log::info!(
        "Parsed {}: {} top-level node(s), {} piece(s)",
        path.display(),
        document.nodes.len(),
        document.pieces().len()
    );

    Ok(LoadedHome {
        document,
        extraction_dir: dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_default_extraction_dir() {
        assert_eq!(
            default_extraction_dir(Path::new("/homes/flat.zip")),
            PathBuf::from("/homes/xml")
        );
    }

    #[test]
    fn test_load_archive_replaces_previous_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("flat.zip");
        write_zip(
            &archive,
            &[("Home.xml", "<home structure='Home.obj'/>"), ("Home.obj", "")],
        );

        let stale = dir.path().join("xml").join("stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        let home = load_archive(&archive, &ImportConfig::default()).unwrap();

        assert_eq!(home.extraction_dir, dir.path().join("xml"));
        assert!(!stale.exists());
        assert!(home.resolve("Home.obj").is_file());
        assert_eq!(home.document.structure.as_deref(), Some("Home.obj"));
    }

    #[test]
    fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("empty.zip");
        write_zip(&archive, &[("readme.txt", "nothing here")]);

        let err = load_archive(&archive, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingDocument { .. }));
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bogus.zip");
        std::fs::write(&archive, "this is not a zip file").unwrap();

        let err = load_archive(&archive, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));
    }

    #[test]
    fn test_custom_extraction_dir() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("flat.zip");
        write_zip(&archive, &[("Home.xml", "<home/>")]);

        let config = ImportConfig {
            extraction_dir: Some(dir.path().join("unpacked")),
            ..Default::default()
        };
        let home = load_archive(&archive, &config).unwrap();

        assert_eq!(home.extraction_dir, dir.path().join("unpacked"));
        assert!(home.document.nodes.is_empty());
    }
}
