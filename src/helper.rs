use std::{
    ffi::OsStr,
    io::{self, BufRead, Write},
    path::Path,
    process::{Command, ExitStatus},
};

use log::{debug, error};
use shell_words::split;
use thiserror::Error;

/// Reads freeform lines until an empty line or end of input.
///
/// Each line is prompted with `> ` on `output`.
pub fn read_entry<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<String> {
    writeln!(output, "Enter your bit (empty line to finish):")?;

    let mut lines = Vec::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            break;
        }
        lines.push(line.to_string());
    }

    Ok(lines.join("\n"))
}

/// Asks a yes/no question that defaults to yes.
///
/// Only `n`/`N` declines. End of input also declines, since there is nobody
/// left to answer.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    write!(output, "{} [Y/n] ", question)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(!answer.trim().eq_ignore_ascii_case("n"))
}

/// Why a command could not be run
#[derive(Error, Debug)]
pub enum CommandFailure {
    /// The command string was empty or not valid shell words
    #[error("{0}")]
    BadCommand(String),

    /// The program could not be started
    #[error("failed to start: {0}")]
    Spawn(io::Error),

    /// The program ran and reported failure
    #[error("exited with {0}")]
    Exit(ExitStatus),
}

/// Runs a shell-style command line with inherited stdio and waits for it.
///
/// `extra_arg`, when given, is appended after the parsed words.
pub fn run_command(
    command_line: &str,
    extra_arg: Option<&OsStr>,
    cwd: Option<&Path>,
) -> std::result::Result<(), CommandFailure> {
    // Handle shell-like command parsing
    let args = split(command_line)
        .map_err(|e| CommandFailure::BadCommand(format!("failed to parse command: {}", e)))?;

    let Some((program, rest)) = args.split_first() else {
        return Err(CommandFailure::BadCommand("empty command".to_string()));
    };

    let mut command = Command::new(program);
    command.args(rest);
    if let Some(arg) = extra_arg {
        command.arg(arg);
    }
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    debug!("Running command: {:?}", command);
    let status = command.status().map_err(|e| {
        error!("Failed to start {}: {}", program, e);
        CommandFailure::Spawn(e)
    })?;

    if !status.success() {
        error!("{} exited with {}", program, status);
        return Err(CommandFailure::Exit(status));
    }

    Ok(())
}
