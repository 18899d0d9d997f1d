use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use pamconf_syntax::Category;

use crate::editor::{Editor, ValidationWarning};
use crate::model::{Configuration, Format};
use crate::parser::{ParseError, Parser};
use crate::writer::Writer;

/// How much of a file [`detect_format_for_path`] looks at.
const DETECT_SAMPLE_BYTES: u64 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Backup not found: {0}")]
    BackupMissing(PathBuf),
}

/// Loads and saves configuration files with a shared parser and writer.
#[derive(Debug, Clone, Default)]
pub struct FileManager {
    parser: Parser,
    writer: Writer,
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(writer: Writer) -> Self {
        Self {
            parser: Parser::new(),
            writer,
        }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn writer(&self) -> &Writer {
        &self.writer
    }

    /// Load a file, choosing the format and service from its path.
    pub fn load(&self, path: &Path) -> Result<Configuration, IoError> {
        self.load_with_format(path, format_for_path(path))
    }

    pub fn load_with_format(&self, path: &Path, format: Format) -> Result<Configuration, IoError> {
        if !path.exists() {
            return Err(IoError::NotFound(path.to_path_buf()));
        }
        let service = match format {
            Format::PerService => service_name_for_path(path),
            Format::MultiService => None,
        };

        let reader = BufReader::new(File::open(path)?);
        let mut config = self
            .parser
            .parse_with_service(reader, format, service.as_deref())
            .map_err(|source| IoError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Write `config` to `path`, creating parent directories as needed.
    pub fn save(&self, config: &Configuration, path: &Path) -> Result<(), IoError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.writer.write(config, BufWriter::new(file))?;
        Ok(())
    }

    /// Copy `path` to `<path>.backup` and return the backup's path.
    pub fn backup(&self, path: &Path) -> Result<PathBuf, IoError> {
        if !path.exists() {
            return Err(IoError::NotFound(path.to_path_buf()));
        }
        let backup = backup_path(path);
        fs::copy(path, &backup)?;
        log::info!("Backed up {} to {}", path.display(), backup.display());
        Ok(backup)
    }

    /// Overwrite `path` with the contents of `<path>.backup`.
    pub fn restore(&self, path: &Path) -> Result<(), IoError> {
        let backup = backup_path(path);
        if !backup.exists() {
            return Err(IoError::BackupMissing(backup));
        }
        fs::copy(&backup, path)?;
        log::info!("Restored {} from {}", path.display(), backup.display());
        Ok(())
    }

    /// Load `path` and report its structural warnings.
    pub fn validate_file(&self, path: &Path) -> Result<Vec<ValidationWarning>, IoError> {
        let mut config = self.load(path)?;
        Ok(Editor::new(&mut config).validate())
    }
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup");
    PathBuf::from(name)
}

/// Regular files directly inside `dir`, sorted by path.
pub fn list_service_files(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !dir.is_dir() {
        return Err(IoError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn in_pam_d(path: &Path) -> bool {
    path.parent()
        .is_some_and(|dir| dir.components().any(|c| c.as_os_str() == "pam.d"))
}

/// Guess the format from the path alone.
///
/// Anything under a `pam.d` directory is per-service, as is anything outside
/// `/etc` that is not named `pam.conf`.
pub fn format_for_path(path: &Path) -> Format {
    let is_pam_conf = path.file_name().is_some_and(|name| name == "pam.conf");
    let in_etc = path.parent() == Some(Path::new("/etc"));
    if in_pam_d(path) || (!is_pam_conf && !in_etc) {
        Format::PerService
    } else {
        Format::MultiService
    }
}

/// The service a file under `pam.d` configures: its file name.
pub fn service_name_for_path(path: &Path) -> Option<String> {
    if !in_pam_d(path) {
        return None;
    }
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Guess the format from file content.
///
/// Looks at the first line with at least four fields that is not a comment.
/// A category in the first field means a per-service file; anything else is
/// taken as a service name.
pub fn detect_format(sample: &str) -> Option<Format> {
    sample
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|fields| fields.len() >= 4)
        .map(|fields| {
            if Category::is_valid(fields[0]) {
                Format::PerService
            } else {
                Format::MultiService
            }
        })
}

/// Sniff the start of a file, falling back to [`format_for_path`].
pub fn detect_format_for_path(path: &Path) -> Result<Format, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let mut sample = Vec::new();
    File::open(path)?
        .take(DETECT_SAMPLE_BYTES)
        .read_to_end(&mut sample)?;

    let format = detect_format(&String::from_utf8_lossy(&sample))
        .unwrap_or_else(|| format_for_path(path));
    Ok(format)
}
