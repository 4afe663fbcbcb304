//! Vault archive packing and unpacking.
//!
//! Archives hold every file of the vault under a fixed `vault/` root
//! label, in sorted walk order so two archives of the same tree have the
//! same structure.

use ignore::WalkBuilder;
use miette::Diagnostic;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Root label prefixed to every entry path.
pub const ROOT_LABEL: &str = "vault";

/// Errors from archive packing/unpacking.
#[derive(Error, Diagnostic, Debug)]
pub enum ArchiveError {
    #[error("Not a directory: {0}")]
    #[diagnostic(code(vaultsync::archive::not_a_directory))]
    NotADirectory(std::path::PathBuf),

    #[error("Archive entry escapes the destination: {0}")]
    #[diagnostic(code(vaultsync::archive::unsafe_path))]
    UnsafePath(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(vaultsync::archive::io))]
    Io(#[from] io::Error),

    #[error("Zip error: {0}")]
    #[diagnostic(code(vaultsync::archive::zip))]
    Zip(#[from] zip::result::ZipError),
}

/// Package `src_dir` into a zip archive at `dest_path`.
///
/// The source is never mutated. On failure the partial artifact is
/// removed so no broken archive is left behind.
pub fn create_archive(src_dir: &Path, dest_path: &Path) -> Result<(), ArchiveError> {
    match write_archive(src_dir, dest_path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(dest_path);
            Err(e)
        }
    }
}

fn write_archive(src_dir: &Path, dest_path: &Path) -> Result<(), ArchiveError> {
    if !src_dir.is_dir() {
        return Err(ArchiveError::NotADirectory(src_dir.to_path_buf()));
    }

    let file = File::create(dest_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in walk_files(src_dir) {
        let rel = path.strip_prefix(src_dir).unwrap_or(&path);
        let name = format!("{ROOT_LABEL}/{}", entry_name(rel));
        writer.start_file(name, options)?;
        let mut source = File::open(&path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}

/// Unpack an archive into `dest_dir`, creating it if needed.
///
/// Entry paths that escape the destination are rejected.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    fs::create_dir_all(dest_dir)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(rel) = entry.enclosed_name() else {
            return Err(ArchiveError::UnsafePath(entry.name().to_string()));
        };
        let out_path = dest_dir.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
    }
    Ok(())
}

/// Walk every file under `dir` in sorted order.
///
/// Hidden files are included; the `.git` directory is not part of the
/// vault's content and is skipped.
pub fn walk_files(dir: &Path) -> Vec<std::path::PathBuf> {
    WalkBuilder::new(dir)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(ignore::DirEntry::into_path)
        .collect()
}

/// Forward-slash entry name from a relative path.
fn entry_name(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
