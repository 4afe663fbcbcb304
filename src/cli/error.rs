use miette::Diagnostic;
use thiserror::Error;

use crate::remote::RemoteError;
use crate::sync::SettingsError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Failed to update settings cache: {0}")]
    #[diagnostic(
        code(vaultsync::cli::settings),
        help("Check permissions on the vaultsync data directory.")
    )]
    Settings(#[from] SettingsError),

    #[error("Failed to create the remote client: {0}")]
    #[diagnostic(code(vaultsync::cli::client))]
    Client(#[from] RemoteError),

    #[error("A local backup needs a destination directory")]
    #[diagnostic(
        code(vaultsync::cli::missing_dest),
        help("Pass --dest <DIR>, or use --remote to back up to the repository.")
    )]
    MissingDest,

    #[error("A local restore needs a backup archive")]
    #[diagnostic(
        code(vaultsync::cli::missing_archive),
        help("Pass --archive <FILE>, or use --remote to restore from the repository.")
    )]
    MissingArchive,
}

pub type CliResult<T> = Result<T, CliError>;
