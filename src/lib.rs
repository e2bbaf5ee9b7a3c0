//! This crate determines the number of possible CPUs of a Linux system.
//!
//! The number of possible CPUs is the number of CPU slots the kernel was booted to support,
//! independent of how many of them are currently online. It is the number to use when sizing
//! per-cpu data structures, e.g. the value buffers of per-cpu BPF maps.
//!
//! ```rust,no_run
//! let cpus = possible_cpus::possible_cpus()?;
//! assert!(cpus >= 1);
//! # Ok::<(), possible_cpus::Error>(())
//! ```

pub use {
    error::{Error, ParseError, Result},
    possible::{
        parse_possible_cpus, FallbackCommand, Resolver, NPROC_PROGRAM, POSSIBLE_CPUS_PATH,
    },
};

use cfg_if::cfg_if;

mod error;
mod possible;

cfg_if! {
    if #[cfg(target_os = "linux")] {
        /// Returns the number of possible CPUs of this system.
        ///
        /// Reads [`POSSIBLE_CPUS_PATH`] or, if it does not exist, runs `nproc --all`. See
        /// [`Resolver`] to change either.
        pub fn possible_cpus() -> Result<usize> {
            Resolver::new().resolve()
        }
    } else {
        /// Returns the number of possible CPUs of this system.
        ///
        /// Only Linux is supported. This always returns [`Error::Unsupported`].
        pub fn possible_cpus() -> Result<usize> {
            Err(Error::Unsupported)
        }
    }
}
