use {
    possible_cpus::{Error, FallbackCommand, ParseError, Resolver},
    std::{fs, path::Path},
    tempfile::TempDir,
};

fn resolver_for(path: &Path) -> Resolver {
    // Make any unexpected fallback obvious.
    Resolver::new()
        .possible_path(path)
        .fallback_command(FallbackCommand::new("echo", ["999"]))
}

#[test]
fn reads_possible_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("possible");
    fs::write(&path, "0-7\n").unwrap();

    assert_eq!(resolver_for(&path).resolve().unwrap(), 8);
    assert_eq!(resolver_for(&path).read_file().unwrap(), 8);
}

#[test]
fn reads_single_cpu_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("possible");
    fs::write(&path, "0\n").unwrap();

    assert_eq!(resolver_for(&path).resolve().unwrap(), 1);
}

#[test]
fn falls_back_to_command_when_file_is_missing() {
    let dir = TempDir::new().unwrap();
    let resolver = Resolver::new()
        .possible_path(dir.path().join("missing"))
        .fallback_command(FallbackCommand::new("echo", ["12"]));

    assert_eq!(resolver.resolve().unwrap(), 12);
}

#[test]
fn malformed_file_does_not_fall_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("possible");
    fs::write(&path, "0-3,8-11\n").unwrap();

    match resolver_for(&path).resolve() {
        Err(Error::Parse {
            path: p,
            source: ParseError::MultipleRanges(spec),
        }) => {
            assert_eq!(p, path);
            assert_eq!(spec, "0-3,8-11");
        }
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn range_not_starting_at_zero_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("possible");
    fs::write(&path, "1-3\n").unwrap();

    let err = resolver_for(&path).resolve().unwrap_err();
    assert!(matches!(
        err,
        Error::Parse {
            source: ParseError::NotZeroBased(_),
            ..
        }
    ));
    assert!(err.to_string().contains("possible"), "{}", err);
}

#[test]
fn empty_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("possible");
    fs::write(&path, "").unwrap();

    assert!(matches!(
        resolver_for(&path).resolve(),
        Err(Error::Parse {
            source: ParseError::InvalidFormat(_),
            ..
        })
    ));
}

#[test]
fn unreadable_file_does_not_fall_back() {
    let dir = TempDir::new().unwrap();
    // Reading a directory fails with something other than NotFound.
    let res = resolver_for(dir.path()).resolve();
    match res {
        Err(Error::Read { path, .. }) => assert_eq!(path, dir.path()),
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn read_file_does_not_fall_back() {
    let dir = TempDir::new().unwrap();
    let res = resolver_for(&dir.path().join("missing")).read_file();
    match res {
        Err(Error::Read { source, .. }) => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
        }
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn missing_program() {
    let resolver = Resolver::new()
        .fallback_command(FallbackCommand::new("possible-cpus-no-such-program", None::<&str>));

    match resolver.run_command() {
        Err(Error::Spawn { program, .. }) => assert_eq!(program, "possible-cpus-no-such-program"),
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn failing_program() {
    let resolver = Resolver::new().fallback_command(FallbackCommand::new(
        "sh",
        ["-c", "echo oops >&2; exit 3"],
    ));

    match resolver.run_command() {
        Err(Error::CommandFailed { status, stderr, .. }) => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(stderr, "oops");
        }
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn non_numeric_output() {
    let resolver = Resolver::new().fallback_command(FallbackCommand::new("echo", ["many"]));

    match resolver.run_command() {
        Err(Error::InvalidOutput { output, .. }) => assert_eq!(output, "many"),
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn zero_output() {
    let resolver = Resolver::new().fallback_command(FallbackCommand::new("echo", ["0"]));

    assert!(matches!(resolver.run_command(), Err(Error::InvalidOutput { .. })));
}

#[cfg(target_os = "linux")]
#[test]
fn system_has_possible_cpus() {
    let cpus = possible_cpus::possible_cpus().unwrap();
    assert!(cpus >= 1);
}
