//! Clipboard delivery for finished artifacts.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};

/// System clipboard with command-line fallbacks for headless sessions.
pub struct Clipboard {
    native: Option<arboard::Clipboard>,
}

impl Clipboard {
    /// Connect to the native clipboard when one is available.
    pub fn new() -> Self {
        let native = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::debug!(error = %err, "native clipboard unavailable");
                None
            }
        };
        Self { native }
    }

    /// Replace the clipboard contents with `text`.
    ///
    /// The whole text is handed over in one call; on failure the clipboard is left as it was.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        // X11 and Wayland selections die with the owning process, so helpers that outlive us
        // go first there.
        if COMMANDS_FIRST && copy_via_commands(text) {
            return Ok(());
        }

        if let Some(native) = self.native.as_mut() {
            match native.set_text(text.to_owned()) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(error = %err, "native clipboard rejected text");
                    self.native = None;
                }
            }
        }

        if !COMMANDS_FIRST && copy_via_commands(text) {
            return Ok(());
        }

        Err(anyhow!("no clipboard backend accepted the text"))
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

const COMMANDS_FIRST: bool = cfg!(all(unix, not(target_os = "macos")));

fn copy_via_commands(text: &str) -> bool {
    for command in fallback_commands() {
        match pipe_to_command(command, text) {
            Ok(()) => {
                tracing::debug!(program = command[0], "copied via clipboard command");
                return true;
            }
            Err(err) => tracing::debug!(error = %err, "clipboard command failed"),
        }
    }
    false
}

fn pipe_to_command(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("failed to write to {program}"))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("{program} did not exit cleanly"))?;
    if !status.success() {
        bail!("{program} exited with status {status}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["wl-copy"], &["xclip", "-selection", "clipboard"], &["xsel", "--clipboard", "--input"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["powershell.exe", "-NoProfile", "-Command", "$input | Set-Clipboard"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[]
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn pipes_text_through_command() {
        assert!(pipe_to_command(&["cat"], "hello").is_ok());
    }

    #[test]
    fn failing_command_is_reported() {
        assert!(pipe_to_command(&["false"], "hello").is_err());
        assert!(pipe_to_command(&["definitely-not-a-clipboard-tool"], "x").is_err());
        assert!(pipe_to_command(&[], "x").is_err());
    }
}
