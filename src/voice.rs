#![forbid(unsafe_code)]

use std::io::Read;
use std::process::{Command, Stdio};

use crate::error::TodoError;

/// Runs the configured speech-to-text command and returns its trimmed stdout.
/// Empty output means nothing was heard.
pub fn capture(command: &str) -> Result<Option<String>, TodoError> {
    if command.trim().is_empty() {
        return Err(TodoError::Voice(
            "voice.command is not configured (see `todotui config set voice.command ...`)"
                .to_owned(),
        ));
    }
    let out = shell(command)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| TodoError::Voice(format!("failed to run '{command}': {e}")))?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(TodoError::Voice(format!(
            "'{command}' exited with code {code}: {msg}",
            code = out.status.code().unwrap_or(1),
            msg = stderr.trim()
        )));
    }
    Ok(transcript_from(&String::from_utf8_lossy(&out.stdout)))
}

/// Reads a transcript piped in by another tool.
pub fn read_transcript(mut input: impl Read) -> std::io::Result<Option<String>> {
    let mut buf = String::new();
    input.read_to_string(&mut buf)?;
    Ok(transcript_from(&buf))
}

fn transcript_from(raw: &str) -> Option<String> {
    // Recognisers tend to emit one utterance per line.
    let joined = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}
