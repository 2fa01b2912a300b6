use std::{fs, path::Path};

use clap::Parser;

use crate::{
    execute, sign, signed_path, verify, Algorithm, Arguments, Command, Config,
    Error,
};

fn write(directory: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = directory.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn sign_then_verify() {
    let directory = tempfile::tempdir().unwrap();
    let input = write(directory.path(), "payload.bin", b"123456789");
    let output = directory.path().join("payload.crc");

    let value = sign(&input, &output, Algorithm::Crc32).unwrap();

    assert_eq!(value, 0xCBF4_3926);
    assert_eq!(fs::read(&output).unwrap().len(), 9 + 8);
    assert!(verify(&output, Algorithm::Crc32).unwrap());
    assert!(!verify(&output, Algorithm::Adler32).unwrap());
}

#[test]
fn tampered_file_fails_verification() {
    let directory = tempfile::tempdir().unwrap();
    let input = write(directory.path(), "data", b"the quick brown fox");
    let output = directory.path().join("data.signed");

    sign(&input, &output, Algorithm::Adler32).unwrap();

    let mut bytes = fs::read(&output).unwrap();
    bytes[4] = b'Q';
    fs::write(&output, bytes).unwrap();

    assert!(!verify(&output, Algorithm::Adler32).unwrap());
}

#[test]
fn empty_file_can_be_signed() {
    let directory = tempfile::tempdir().unwrap();
    let input = write(directory.path(), "empty", b"");
    let output = signed_path(&input);

    assert_eq!(sign(&input, &output, Algorithm::Adler32).unwrap(), 1);
    assert!(verify(&output, Algorithm::Adler32).unwrap());
}

#[test]
fn short_file_is_unsigned() {
    let directory = tempfile::tempdir().unwrap();
    let input = write(directory.path(), "short", b"abc");

    assert!(matches!(
        verify(&input, Algorithm::Crc32),
        Err(Error::Unsigned { .. })
    ));
}

#[test]
fn missing_input() {
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("absent");

    assert!(matches!(
        sign(&input, &signed_path(&input), Algorithm::Crc32),
        Err(Error::Io { path, .. }) if path == input
    ));
}

#[test]
fn default_output_path() {
    assert_eq!(
        signed_path(Path::new("dir/archive.tar")),
        Path::new("dir/archive.tar.signed")
    );
}

#[test]
fn parse_arguments() {
    let arguments = Arguments::try_parse_from([
        "tessera", "sign", "input.bin", "-a", "crc32", "--config", "c.toml",
    ])
    .unwrap();

    assert_eq!(
        arguments.command,
        Command::Sign {
            input: "input.bin".into(),
            output: None,
            algorithm: Some(Algorithm::Crc32),
        }
    );
    assert_eq!(arguments.config.as_deref(), Some(Path::new("c.toml")));

    assert!(Arguments::try_parse_from(["tessera", "verify", "x", "-a", "md5"])
        .is_err());
}

#[test]
fn config_selects_the_default_algorithm() {
    let directory = tempfile::tempdir().unwrap();
    let config = write(directory.path(), "tessera.toml", b"algorithm = \"crc32\"");
    let input = write(directory.path(), "payload", b"123456789");

    assert_eq!(
        Config::load(&config).unwrap(),
        Config { algorithm: Algorithm::Crc32 }
    );

    let signed = execute(&Arguments {
        command: Command::Sign {
            input: input.clone(),
            output: None,
            algorithm: None,
        },
        config: Some(config.clone()),
    })
    .unwrap();

    assert!(signed);
    assert!(verify(&signed_path(&input), Algorithm::Crc32).unwrap());

    let overridden = execute(&Arguments {
        command: Command::Verify {
            input: signed_path(&input),
            algorithm: Some(Algorithm::Adler32),
        },
        config: Some(config),
    })
    .unwrap();

    assert!(!overridden);
}

#[test]
fn invalid_config() {
    let directory = tempfile::tempdir().unwrap();
    let config = write(directory.path(), "bad.toml", b"checksum = \"crc32\"");

    assert!(matches!(Config::load(&config), Err(Error::Config { .. })));
}

#[test]
fn empty_config_uses_defaults() {
    let directory = tempfile::tempdir().unwrap();
    let config = write(directory.path(), "empty.toml", b"");

    assert_eq!(Config::load(&config).unwrap(), Config::default());
    assert_eq!(Config::default().algorithm, Algorithm::Adler32);
}
