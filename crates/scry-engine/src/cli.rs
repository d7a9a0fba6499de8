use crate::backend::Backend;
use crate::executor::ScriptExecutor;
use std::error::Error;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

pub struct FileOptions {
    pub stop_on_error: bool,
}

pub struct ReplOptions<'a> {
    pub banner_lines: &'a [&'a str],
    pub prompt: &'a str,
    pub exit_commands: &'a [&'a str],
}

async fn execute_line<B: Backend + ?Sized>(
    backend: &mut B,
    executor: &mut ScriptExecutor,
    line: &str,
) -> Result<String, String> {
    executor
        .execute_line(backend, line)
        .await
        .map(|result| result.output)
        .map_err(|e| e.to_string())
}

/// Run a script, one command per line. Blank lines and `#` comments are skipped.
pub async fn run_file<B: Backend + ?Sized>(
    backend: &mut B,
    executor: &mut ScriptExecutor,
    output: OutputHandlers,
    path: &str,
    options: FileOptions,
) -> Result<(), Box<dyn Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match execute_line(backend, executor, trimmed).await {
            Ok(result) => (output.out)(&result),
            Err(err) => {
                let message = format!("Error on line {} '{}': {}", number + 1, trimmed, err);
                (output.err)(&message);
                if options.stop_on_error {
                    return Err(io::Error::other(message).into());
                }
            }
        }
    }
    Ok(())
}

enum ReadLineResult {
    Input(String),
    Skip,
    Exit,
    Error(io::Error),
}

fn classify_line(
    result: Result<Option<String>, io::Error>,
    exit_commands: &[&str],
) -> ReadLineResult {
    match result {
        Ok(Some(input)) => {
            let trimmed = input.trim().to_string();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                ReadLineResult::Skip
            } else if exit_commands.contains(&trimmed.as_str()) {
                ReadLineResult::Exit
            } else {
                ReadLineResult::Input(trimmed)
            }
        }
        Ok(None) => ReadLineResult::Exit,
        Err(e) => ReadLineResult::Error(e),
    }
}

/// Interactive loop over stdin until an exit command or EOF.
pub async fn run_repl<B: Backend + ?Sized>(
    backend: &mut B,
    executor: &mut ScriptExecutor,
    output: OutputHandlers,
    options: ReplOptions<'_>,
) -> Result<(), Box<dyn Error>> {
    for line in options.banner_lines {
        (output.out)(line);
    }

    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        print!("{}", options.prompt);
        stdout.flush()?;

        match classify_line(reader.next_line().await, options.exit_commands) {
            ReadLineResult::Input(line) => match execute_line(backend, executor, &line).await {
                Ok(result) => (output.out)(&result),
                Err(err) => (output.err)(&format!("Error: {}", err)),
            },
            ReadLineResult::Skip => continue,
            ReadLineResult::Exit => break,
            ReadLineResult::Error(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        let exits = ["exit", "quit"];
        assert!(matches!(
            classify_line(Ok(Some("  get \"x\" ".into())), &exits),
            ReadLineResult::Input(s) if s == "get \"x\""
        ));
        assert!(matches!(
            classify_line(Ok(Some("# note".into())), &exits),
            ReadLineResult::Skip
        ));
        assert!(matches!(
            classify_line(Ok(Some("quit".into())), &exits),
            ReadLineResult::Exit
        ));
        assert!(matches!(classify_line(Ok(None), &exits), ReadLineResult::Exit));
    }
}
