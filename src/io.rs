//! Read and write library descriptions to files

mod description;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub use description::{
    ArcDescription, CellDescription, InputDescription, LibraryDescription, OutputDescription,
    TableDescription, WireLoadDescription,
};

use crate::error::LibraryError;
use crate::library::{Library, LibraryOptions};

/// Error while reading or writing a library file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened, read or written
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid description
    #[error("invalid library description in {}: {source}", .path.display())]
    Json {
        /// Path of the file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The file extension is not supported
    #[error("unknown extension for {}, expected .json", .0.display())]
    UnknownExtension(PathBuf),

    /// The description is not a valid library
    #[error(transparent)]
    Library(#[from] LibraryError),
}

fn check_extension(path: &Path) -> Result<(), LoadError> {
    match path.extension() {
        Some(s) if s == "json" => Ok(()),
        _ => Err(LoadError::UnknownExtension(path.to_path_buf())),
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a library description from a file
///
/// Following extensions are supported: .json
pub fn read_library_file(path: &Path) -> Result<LibraryDescription, LoadError> {
    check_extension(path)?;
    let f = File::open(path).map_err(io_error(path))?;
    serde_json::from_reader(BufReader::new(f)).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a library description to a file
///
/// Following extensions are supported: .json
pub fn write_library_file(path: &Path, desc: &LibraryDescription) -> Result<(), LoadError> {
    check_extension(path)?;
    let f = File::create(path).map_err(io_error(path))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, desc).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    w.flush().map_err(io_error(path))
}

/// Read and build a library
pub fn read_library(path: &Path, options: &LibraryOptions) -> Result<Library, LoadError> {
    let desc = read_library_file(path)?;
    log::info!("Read {} cells from {}", desc.cells.len(), path.display());
    Ok(Library::from_description(&desc, options)?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{read_library, read_library_file, write_library_file, LoadError};
    use crate::library::{
        Cell, InputPin, Library, LibraryOptions, NumericTable, OutputPin, TimingArc,
    };
    use crate::npn::TruthTable;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sclib_{}_{}", std::process::id(), name))
    }

    fn library() -> Library {
        let arc = TimingArc::new(0, NumericTable::constant(0.03), NumericTable::constant(0.02));
        let inv = Cell::new(
            "INV_X1",
            0.8,
            vec![InputPin::new("A", 0.001)],
            vec![OutputPin::new("Y", TruthTable::parse(1, "01").unwrap(), vec![arc])],
        )
        .unwrap()
        .with_footprint("inv");
        Library::build(vec![inv]).unwrap()
    }

    #[test]
    fn test_file_round_trip() {
        let lib = library();
        let path = temp_path("round_trip.json");
        write_library_file(&path, &lib.to_description()).unwrap();
        assert_eq!(read_library_file(&path).unwrap(), lib.to_description());
        let lib2 = read_library(&path, &LibraryOptions::default()).unwrap();
        assert_eq!(lib2.cells(), lib.cells());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_errors() {
        let lib = library();
        let res = write_library_file(&temp_path("lib.lib"), &lib.to_description());
        assert!(matches!(res, Err(LoadError::UnknownExtension(_))));
        let res = read_library_file(&temp_path("missing.json"));
        assert!(matches!(res, Err(LoadError::Io { .. })));

        let path = temp_path("garbage.json");
        std::fs::write(&path, "{ \"name\": 3 }").unwrap();
        assert!(matches!(read_library_file(&path), Err(LoadError::Json { .. })));
        std::fs::remove_file(&path).unwrap();
    }
}
