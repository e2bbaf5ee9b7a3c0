use {
    crate::error::{Error, ParseError, Result},
    std::{
        ffi::OsString,
        fs, io,
        num::NonZeroUsize,
        path::{Path, PathBuf},
        process::Command,
    },
    tracing::debug,
};

pub const POSSIBLE_CPUS_PATH: &str = "/sys/devices/system/cpu/possible";

pub const NPROC_PROGRAM: &str = "nproc";

/// Parses the number of cpus from a string produced by `bitmap_list_string()` in the kernel.
///
/// This is the format of `/sys/devices/system/cpu/possible`, which is always a single range
/// starting at cpu 0. Multiple ranges are rejected since they can't be unified into a single
/// number, so this is not suitable for `/sys/devices/system/cpu/online` and friends.
pub fn parse_possible_cpus(spec: &str) -> Result<usize, ParseError> {
    let spec = spec.trim_end_matches('\n');
    if spec == "0" {
        return Ok(1);
    }
    if spec.contains(',') {
        return Err(ParseError::MultipleRanges(spec.to_owned()));
    }
    let invalid = || ParseError::InvalidFormat(spec.to_owned());
    let (low, high) = spec.split_once('-').ok_or_else(invalid)?;
    let low = parse_cpu_index(low).ok_or_else(invalid)?;
    let high = parse_cpu_index(high).ok_or_else(invalid)?;
    if low != 0 {
        return Err(ParseError::NotZeroBased(spec.to_owned()));
    }
    // cpus are 0 indexed
    high.checked_add(1).ok_or_else(invalid)
}

fn parse_cpu_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// The command run when the possible-cpu file does not exist.
///
/// It must print the number of processors on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl FallbackCommand {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `nproc --all`, which counts all installed processors instead of the ones available to
    /// this process.
    pub fn nproc() -> Self {
        Self::new(NPROC_PROGRAM, ["--all"])
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl Default for FallbackCommand {
    fn default() -> Self {
        Self::nproc()
    }
}

/// Determines the number of possible cpus.
///
/// The number of possible cpus is fixed at boot and is what the kernel uses to size per-cpu data
/// structures such as the values of per-cpu BPF maps. It is read from
/// [`POSSIBLE_CPUS_PATH`] and, if that file does not exist, from the output of `nproc --all`.
///
/// Nothing is cached: every call to [`Self::resolve`] queries the system again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    possible_path: PathBuf,
    fallback: FallbackCommand,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            possible_path: PathBuf::from(POSSIBLE_CPUS_PATH),
            fallback: FallbackCommand::default(),
        }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the file that is read instead of [`POSSIBLE_CPUS_PATH`].
    pub fn possible_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.possible_path = path.into();
        self
    }

    /// Replaces the command that is run when the possible-cpu file does not exist.
    pub fn fallback_command(mut self, command: FallbackCommand) -> Self {
        self.fallback = command;
        self
    }

    pub fn path(&self) -> &Path {
        &self.possible_path
    }

    pub fn fallback(&self) -> &FallbackCommand {
        &self.fallback
    }

    /// Returns the number of possible cpus.
    ///
    /// Only a missing file causes the fallback command to run. Any other error reading the file
    /// is returned.
    pub fn resolve(&self) -> Result<usize> {
        match fs::read_to_string(&self.possible_path) {
            Ok(contents) => self.parse_file(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    path = %self.possible_path.display(),
                    program = ?self.fallback.program,
                    "possible cpu file does not exist, falling back to command"
                );
                self.run_command()
            }
            Err(source) => Err(self.read_error(source)),
        }
    }

    /// Reads the possible-cpu file without falling back.
    pub fn read_file(&self) -> Result<usize> {
        let contents = fs::read_to_string(&self.possible_path).map_err(|e| self.read_error(e))?;
        self.parse_file(&contents)
    }

    /// Runs the fallback command without looking at the possible-cpu file.
    pub fn run_command(&self) -> Result<usize> {
        let FallbackCommand { program, args } = &self.fallback;
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        let cpus = stdout
            .parse::<NonZeroUsize>()
            .map_err(|source| Error::InvalidOutput {
                program: program.clone(),
                output: stdout.to_owned(),
                source,
            })?;
        debug!(program = ?program, cpus = cpus.get(), "possible cpus from command");
        Ok(cpus.get())
    }

    fn parse_file(&self, contents: &str) -> Result<usize> {
        let cpus = parse_possible_cpus(contents).map_err(|source| Error::Parse {
            path: self.possible_path.clone(),
            source,
        })?;
        debug!(
            path = %self.possible_path.display(),
            spec = contents.trim_end(),
            cpus,
            "possible cpus from file"
        );
        Ok(cpus)
    }

    fn read_error(&self, source: io::Error) -> Error {
        Error::Read {
            path: self.possible_path.clone(),
            source,
        }
    }
}
