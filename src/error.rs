use {
    std::{ffi::OsString, io, num::ParseIntError, path::PathBuf, process::ExitStatus},
    thiserror::Error,
};

/// A malformed possible-cpu bitmap list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid format: {0:?}")]
    InvalidFormat(String),

    #[error("cpu range doesn't start at zero: {0:?}")]
    NotZeroBased(String),

    #[error("multiple cpu ranges are not supported: {0:?}")]
    MultipleRanges(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("could not run {program:?}: {source}")]
    Spawn {
        program: OsString,
        #[source]
        source: io::Error,
    },

    #[error("{program:?} exited with {status}: {stderr}")]
    CommandFailed {
        program: OsString,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{program:?} printed {output:?}, expected a positive cpu count: {source}")]
    InvalidOutput {
        program: OsString,
        output: String,
        #[source]
        source: ParseIntError,
    },

    #[error("possible cpus can only be determined on linux")]
    Unsupported,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
