use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::validate::{self, ValidationError};

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Attach the form field to a validation failure.
pub(crate) fn invalid(err: &ValidationError) -> anyhow::Error {
    anyhow!("{}: {err}", err.field())
}

/// Read an image from disk and turn it into an avatar `data:` URL.
pub(crate) async fn load_avatar(path: &Path) -> Result<String> {
    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(validate::mime_from_extension)
        .ok_or_else(|| invalid(&ValidationError::InvalidImageType))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    validate::avatar_data_url(mime, &bytes).map_err(|err| invalid(&err))
}

/// Line-oriented prompt on stdin.
pub(crate) struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub(crate) fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub(crate) fn show(label: &str) -> Result<()> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{label}: ")?;
        stdout.flush()?;
        Ok(())
    }

    /// Next line without the trailing newline. Cancel safe.
    pub(crate) async fn read_line(&mut self) -> Result<String> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => bail!("input closed"),
        }
    }

    pub(crate) async fn ask(&mut self, label: &str) -> Result<String> {
        Self::show(label)?;
        self.read_line().await
    }

    /// Ask until `parse` accepts the answer, printing each rejection.
    pub(crate) async fn ask_until<T, F>(&mut self, label: &str, parse: F) -> Result<T>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        loop {
            let answer = self.ask(label).await?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(message) => println!("  {message}"),
            }
        }
    }
}
