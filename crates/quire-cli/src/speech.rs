//! Read-aloud through an external command
//!
//! The configured `speech_command` is run through the shell with the page
//! text on stdin (e.g. `espeak`, `say`, `festival --tts`). Cancelling kills
//! the process. Pausing is not supported by this engine.

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use quire_core::reader::{SpeechEngine, SpeechError, SpeechHandle};
use tracing::{debug, warn};

/// How often the running command is checked for completion
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Speech engine backed by a shell command
#[derive(Debug, Default)]
pub struct ProcessSpeech {
    command: Option<String>,
    current: Option<(SpeechHandle, Child)>,
    next: u64,
}

impl ProcessSpeech {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
            current: None,
            next: 0,
        }
    }

    /// Wait for the running utterance to finish
    ///
    /// Returns its handle, or `None` when nothing is being spoken.
    pub async fn wait(&mut self) -> Option<SpeechHandle> {
        loop {
            let (handle, child) = self.current.as_mut()?;
            let handle = *handle;
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("Speech command exited with {}", status);
                    self.current = None;
                    return Some(handle);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not check speech command: {}", e);
                    self.current = None;
                    return Some(handle);
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn spawn(command: &str, text: &str) -> std::io::Result<Child> {
        let mut child = shell(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }
        Ok(child)
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

impl SpeechEngine for ProcessSpeech {
    fn speak(&mut self, text: &str) -> Result<SpeechHandle, SpeechError> {
        let Some(command) = self.command.as_deref() else {
            return Err(SpeechError::Unavailable(
                "no speech_command configured (try `quire config set speech_command espeak`)"
                    .to_string(),
            ));
        };

        let child = Self::spawn(command, text)
            .map_err(|e| SpeechError::Engine(format!("failed to run '{}': {}", command, e)))?;

        self.next += 1;
        let handle = SpeechHandle(self.next);
        debug!("Speaking {} chars with '{}' ({:?})", text.len(), command, handle);
        self.current = Some((handle, child));
        Ok(handle)
    }

    fn pause(&mut self, _handle: SpeechHandle) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable(
            "the speech command cannot be paused".to_string(),
        ))
    }

    fn resume(&mut self, _handle: SpeechHandle) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable(
            "the speech command cannot be resumed".to_string(),
        ))
    }

    fn cancel(&mut self, handle: SpeechHandle) {
        if !matches!(self.current, Some((current, _)) if current == handle) {
            return;
        }
        if let Some((_, mut child)) = self.current.take() {
            if let Err(e) = child.kill() {
                debug!("Speech command already finished: {}", e);
            }
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_command_is_unavailable() {
        let mut speech = ProcessSpeech::new(None);
        assert!(matches!(
            speech.speak("hello"),
            Err(SpeechError::Unavailable(_))
        ));

        let mut blank = ProcessSpeech::new(Some("  ".to_string()));
        assert!(blank.speak("hello").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_runs_to_completion() {
        let mut speech = ProcessSpeech::new(Some("cat > /dev/null".to_string()));
        let handle = speech.speak("hello").unwrap();
        assert_eq!(speech.wait().await, Some(handle));
        assert_eq!(speech.wait().await, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exiting_early_is_reaped() {
        // The command never reads stdin, so a large write hits a closed pipe
        let text = "word ".repeat(1 << 20);
        let mut speech = ProcessSpeech::new(Some("exit 0".to_string()));
        assert!(matches!(speech.speak(&text), Err(SpeechError::Engine(_))));
        assert!(speech.current.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_kills_command() {
        let mut speech = ProcessSpeech::new(Some("sleep 30".to_string()));
        let handle = speech.speak("hello").unwrap();
        speech.cancel(handle);
        assert_eq!(speech.wait().await, None);
    }
}
