//! Reading text arguments from stdin

use std::io::{self, Read};

use anyhow::{bail, Context, Result};

/// Use `text` if given, otherwise read it from piped stdin
///
/// Fails when neither is available (no argument and stdin is a TTY).
pub fn text_or_stdin(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if atty::is(atty::Stream::Stdin) {
        bail!("No text given. Pass it as an argument or pipe it on stdin.");
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    Ok(buffer.trim_end_matches('\n').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_wins() {
        assert_eq!(text_or_stdin(Some("given".to_string())).unwrap(), "given");
    }
}
