#![forbid(unsafe_code)]
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::{env, ffi, fmt, fs};

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgGroup};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> CodingResult {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dotz=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    CodingResult::catch_panic(|| run_coding(Flags::from_args(env::args_os())))
}

fn run_coding(flags: Flags) -> anyhow::Result<()> {
    let data = match &flags.input {
        Input::File(path) => {
            fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        Input::Stdin => {
            let mut data = vec![];
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .context("reading stdin")?;
            data
        }
    };

    let coded = match flags.operation {
        Operation::Encode => dotz::encode(&data, flags.max_bits),
        Operation::Decode => dotz::decode(&data),
    }
    .with_context(|| format!("{} {}", flags.operation, flags.input))?;

    let output = flags.output()?;
    tracing::info!(
        input = %flags.input,
        output = %output,
        bytes_in = data.len(),
        bytes_out = coded.len(),
        "{}", flags.operation
    );

    match output {
        Output::File(path) => {
            if !flags.force && path.exists() {
                bail!("{} already exists, pass --force to overwrite it", path.display());
            }
            fs::write(&path, &coded).with_context(|| format!("writing {}", path.display()))?;
        }
        Output::Stdout => {
            let mut out = io::stdout().lock();
            out.write_all(&coded)?;
            out.flush()?;
        }
    }

    Ok(())
}

struct Flags {
    input: Input,
    output: Option<PathBuf>,
    operation: Operation,
    max_bits: u8,
    force: bool,
}

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug)]
enum Output {
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Encode,
    Decode,
}

fn command() -> clap::Command {
    clap::Command::new("dotz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress Unix compress (.Z) data")
        .arg(
            Arg::new("compress")
                .short('c')
                .long("compress")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("decompress")
                .short('d')
                .long("decompress")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("operation")
                .args(["compress", "decompress"])
                .multiple(false)
                .required(true),
        )
        .arg(
            Arg::new("bits")
                .short('b')
                .long("bits")
                .help("Maximum code size when compressing")
                .default_value("16")
                .value_parser(clap::value_parser!(u8).range(9..=16)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output path, '-' for stdout [default: derived from <file>]")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .help("Overwrite an existing output file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file")
                .help("Filepath or '-' for stdin")
                .default_value("-")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

impl Flags {
    fn from_args(args: impl Iterator<Item = ffi::OsString>) -> Self {
        let matches = command().get_matches_from(args);

        let operation = if matches.get_flag("decompress") {
            Operation::Decode
        } else {
            Operation::Encode
        };

        let input = match matches.get_one::<PathBuf>("file") {
            Some(p) if *p != PathBuf::from("-") => Input::File(p.clone()),
            _ => Input::Stdin,
        };

        Flags {
            input,
            output: matches.get_one::<PathBuf>("output").cloned(),
            operation,
            max_bits: matches
                .get_one::<u8>("bits")
                .copied()
                .unwrap_or(dotz::DEFAULT_MAX_BITS),
            force: matches.get_flag("force"),
        }
    }

    /// Where the result goes. Compressed and decompressed data never share a name.
    fn output(&self) -> anyhow::Result<Output> {
        match (&self.output, &self.input, self.operation) {
            (Some(p), _, _) if *p == PathBuf::from("-") => Ok(Output::Stdout),
            (Some(p), _, _) => Ok(Output::File(p.clone())),
            (None, Input::Stdin, _) => Ok(Output::Stdout),
            (None, Input::File(path), Operation::Encode) => {
                let mut name = path.clone().into_os_string();
                name.push(".Z");
                Ok(Output::File(name.into()))
            }
            (None, Input::File(path), Operation::Decode) => {
                if path.extension() != Some(ffi::OsStr::new("Z")) {
                    bail!("{} has no .Z suffix, name the output with --output", path.display());
                }
                Ok(Output::File(path.with_extension("")))
            }
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::File(path) => write!(f, "{}", path.display()),
            Input::Stdin => f.write_str("<stdin>"),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::File(path) => write!(f, "{}", path.display()),
            Output::Stdout => f.write_str("<stdout>"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Encode => "compressing",
            Operation::Decode => "decompressing",
        })
    }
}

enum CodingResult {
    Ok,
    Err(anyhow::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: impl FnOnce() -> anyhow::Result<()> + std::panic::UnwindSafe) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("dotz: {:#}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
