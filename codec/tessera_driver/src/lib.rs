//! Contains the main `run()` function of the `tessera` executable.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use tessera_checksum::{
    Adler32, Checksum, ChecksumReader, ChecksumWriter, Crc32, SIGNATURE_LEN,
};

/// The checksum algorithm of a signature.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Adler-32, the faster of the two.
    #[default]
    Adler32,

    /// CRC-32 (IEEE).
    Crc32,
}

impl Algorithm {
    /// Returns the name used on the command line and in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adler32 => Adler32::NAME,
            Self::Crc32 => Crc32::NAME,
        }
    }
}

/// The defaults read from a `--config` file.
///
/// ```toml
/// algorithm = "crc32"
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// The algorithm used when the command line doesn't name one.
    pub algorithm: Algorithm,
}

impl Config {
    /// Reads the configuration from the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file can't be read and [`Error::Config`]
    /// if it isn't a valid configuration.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(io_error(path))?;

        toml::from_str(&text)
            .map_err(|source| Error::Config { path: path.to_owned(), source })
    }
}

/// The subcommands of the program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::Subcommand)]
pub enum Command {
    /// Copies a file and appends the checksum of its content.
    Sign {
        /// The file to sign.
        input: PathBuf,

        /// The signed copy. Defaults to the input path with a `.signed`
        /// suffix.
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// The checksum algorithm, overriding the configuration.
        #[clap(short, long)]
        algorithm: Option<Algorithm>,
    },

    /// Checks the trailing checksum of a signed file.
    Verify {
        /// The signed file.
        input: PathBuf,

        /// The checksum algorithm, overriding the configuration.
        #[clap(short, long)]
        algorithm: Option<Algorithm>,
    },
}

/// The arguments to the program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::Parser)]
#[clap(
    name = "tessera",
    about = "Signs and verifies checksum-trailed files",
    author = "Simmypeet"
)]
pub struct Arguments {
    /// The subcommand to run.
    #[clap(subcommand)]
    pub command: Command,

    /// A TOML file holding the defaults of the options not given on the
    /// command line.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

/// The failures of a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file couldn't be opened, read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file.
        path: PathBuf,

        /// The underlying failure.
        source: io::Error,
    },

    /// The configuration file isn't valid TOML or has unknown keys.
    #[error("invalid configuration {}: {source}", path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,

        /// The parse failure.
        source: toml::de::Error,
    },

    /// The file is shorter than a signature.
    #[error("{} is too short to carry a signature", path.display())]
    Unsigned {
        /// The file.
        path: PathBuf,
    },

    /// Signing or reading the signature failed.
    #[error(transparent)]
    Codec(#[from] tessera_codec::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Io { path: path.to_owned(), source }
}

/// Returns the default output of [`Command::Sign`] for `input`.
#[must_use]
pub fn signed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".signed");

    PathBuf::from(name)
}

fn sign_with<C: Checksum>(input: &Path, output: &Path) -> Result<u32, Error> {
    let mut source =
        BufReader::new(File::open(input).map_err(io_error(input))?);
    let sink = BufWriter::new(File::create(output).map_err(io_error(output))?);

    let mut writer = ChecksumWriter::<_, C>::new(sink);
    io::copy(&mut source, &mut writer).map_err(io_error(input))?;

    let value = writer.sign()?;
    writer.flush().map_err(io_error(output))?;

    Ok(value)
}

/// Copies `input` to `output` followed by its `algorithm` signature, and
/// returns the checksum.
///
/// # Errors
///
/// Returns [`Error::Io`] if either file can't be accessed.
pub fn sign(
    input: &Path,
    output: &Path,
    algorithm: Algorithm,
) -> Result<u32, Error> {
    match algorithm {
        Algorithm::Adler32 => sign_with::<Adler32>(input, output),
        Algorithm::Crc32 => sign_with::<Crc32>(input, output),
    }
}

fn verify_with<C: Checksum>(input: &Path) -> Result<bool, Error> {
    let file = File::open(input).map_err(io_error(input))?;
    let length = file.metadata().map_err(io_error(input))?.len();

    let payload = length
        .checked_sub(SIGNATURE_LEN as u64)
        .ok_or_else(|| Error::Unsigned { path: input.to_owned() })?;

    let mut reader = ChecksumReader::<_, C>::new(BufReader::new(file));
    io::copy(&mut (&mut reader).take(payload), &mut io::sink())
        .map_err(io_error(input))?;

    Ok(reader.verify(None)?)
}

/// Checks that the last 8 bytes of `input` are the `algorithm` checksum of
/// the bytes before them.
///
/// # Errors
///
/// - [`Error::Io`] if the file can't be read.
/// - [`Error::Unsigned`] if the file is shorter than a signature.
pub fn verify(input: &Path, algorithm: Algorithm) -> Result<bool, Error> {
    match algorithm {
        Algorithm::Adler32 => verify_with::<Adler32>(input),
        Algorithm::Crc32 => verify_with::<Crc32>(input),
    }
}

fn execute(arguments: &Arguments) -> Result<bool, Error> {
    let config = arguments
        .config
        .as_deref()
        .map(Config::load)
        .transpose()?
        .unwrap_or_default();

    match &arguments.command {
        Command::Sign { input, output, algorithm } => {
            let output = output.clone().unwrap_or_else(|| signed_path(input));
            let algorithm = algorithm.unwrap_or(config.algorithm);
            let value = sign(input, &output, algorithm)?;

            log::info!(
                "signed {} into {} with {} {value:#010x}",
                input.display(),
                output.display(),
                algorithm.name()
            );

            Ok(true)
        }

        Command::Verify { input, algorithm } => {
            let algorithm = algorithm.unwrap_or(config.algorithm);
            let verified = verify(input, algorithm)?;

            if verified {
                log::info!(
                    "{}: {} signature ok",
                    input.display(),
                    algorithm.name()
                );
            } else {
                log::error!(
                    "{}: {} signature mismatch",
                    input.display(),
                    algorithm.name()
                );
            }

            Ok(verified)
        }
    }
}

/// Runs the program with the given arguments.
#[must_use]
pub fn run(arguments: Arguments) -> ExitCode {
    match execute(&arguments) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            log::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test;
