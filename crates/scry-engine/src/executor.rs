//! Line-oriented test scripts.
//!
//! ```text
//! visit http://localhost:8080/app/index.html
//! type "Username field" "admin"
//! type "Password field" "admin"
//! click "Login button"
//! contains "Profil utilisateur"
//! ```

use crate::backend::{Backend, BackendError};
use crate::config::GetByAiOptions;
use crate::resolution::{ResolutionEngine, ResolutionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Assertion failed: {0}")]
    Assertion(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Visit(String),
    Get(String),
    Click(String),
    Type(String, String),
    Contains(String),
    History,
}

impl ScriptCommand {
    pub fn parse(line: &str) -> Result<Self, ScriptError> {
        let mut args = tokenize(line)?.into_iter();
        let verb = args
            .next()
            .ok_or_else(|| ScriptError::Parse("empty command".into()))?;
        let rest: Vec<String> = args.collect();

        let expect = |n: usize| {
            if rest.len() == n {
                Ok(())
            } else {
                Err(ScriptError::Parse(format!(
                    "'{}' takes {} argument(s), got {}",
                    verb,
                    n,
                    rest.len()
                )))
            }
        };

        let command = match verb.as_str() {
            "visit" => {
                expect(1)?;
                ScriptCommand::Visit(rest[0].clone())
            }
            "get" => {
                expect(1)?;
                ScriptCommand::Get(rest[0].clone())
            }
            "click" => {
                expect(1)?;
                ScriptCommand::Click(rest[0].clone())
            }
            "type" => {
                expect(2)?;
                ScriptCommand::Type(rest[0].clone(), rest[1].clone())
            }
            "contains" => {
                expect(1)?;
                ScriptCommand::Contains(rest[0].clone())
            }
            "history" => {
                expect(0)?;
                ScriptCommand::History
            }
            other => return Err(ScriptError::Parse(format!("unknown command '{}'", other))),
        };
        Ok(command)
    }
}

/// Split a line into words; double quotes group words and `\"` escapes a quote.
pub fn tokenize(line: &str) -> Result<Vec<String>, ScriptError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if quoted => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => return Err(ScriptError::Parse("dangling escape".into())),
            },
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(ScriptError::Parse("unterminated quote".into()));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub output: String,
}

pub struct ScriptExecutor {
    engine: ResolutionEngine,
    options: GetByAiOptions,
}

impl ScriptExecutor {
    /// Executor resolving with the engine's configured default options.
    pub fn new(engine: ResolutionEngine) -> Self {
        let options = engine.default_options().clone();
        Self { engine, options }
    }

    pub fn with_options(engine: ResolutionEngine, options: GetByAiOptions) -> Self {
        Self { engine, options }
    }

    pub fn engine(&self) -> &ResolutionEngine {
        &self.engine
    }

    pub async fn execute_line<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        line: &str,
    ) -> Result<ExecutionResult, ScriptError> {
        let command = ScriptCommand::parse(line)?;
        self.execute(backend, command).await
    }

    pub async fn execute<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        command: ScriptCommand,
    ) -> Result<ExecutionResult, ScriptError> {
        let output = match command {
            ScriptCommand::Visit(url) => {
                let nav = backend.navigate(&url).await?;
                format!("Navigated to {} ({})", nav.url, nav.title)
            }
            ScriptCommand::Get(description) => {
                let handle = self
                    .engine
                    .get_by_ai(backend, &description, &self.options)
                    .await?;
                format!("{} -> {}", description, handle.selector)
            }
            ScriptCommand::Click(description) => {
                let handle = self
                    .engine
                    .get_by_ai(backend, &description, &self.options)
                    .await?;
                backend.click(&handle.selector).await?;
                format!("Clicked {}", handle.selector)
            }
            ScriptCommand::Type(description, text) => {
                let handle = self
                    .engine
                    .get_by_ai(backend, &description, &self.options)
                    .await?;
                backend.type_text(&handle.selector, &text).await?;
                format!("Typed into {}", handle.selector)
            }
            ScriptCommand::Contains(text) => {
                let page = backend.page_text().await?;
                if !page.contains(&text) {
                    return Err(ScriptError::Assertion(format!(
                        "page does not contain '{}'",
                        text
                    )));
                }
                format!("Found '{}'", text)
            }
            ScriptCommand::History => {
                let history = self.engine.store().load_history().await;
                format!(
                    "{} record(s), {} successful",
                    history.len(),
                    history.successful_count()
                )
            }
        };
        Ok(ExecutionResult { output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_quotes_and_escapes() {
        assert_eq!(
            tokenize(r#"type "Username field"  "say \"hi\"""#).unwrap(),
            vec!["type", "Username field", r#"say "hi""#]
        );
        assert_eq!(tokenize(r#"get """#).unwrap(), vec!["get", ""]);
        assert!(tokenize(r#"click "Login"#).is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ScriptCommand::parse("visit app/index.html").unwrap(),
            ScriptCommand::Visit("app/index.html".into())
        );
        assert_eq!(
            ScriptCommand::parse(r#"click "Login button""#).unwrap(),
            ScriptCommand::Click("Login button".into())
        );
        assert_eq!(
            ScriptCommand::parse(r#"type "Password field" admin"#).unwrap(),
            ScriptCommand::Type("Password field".into(), "admin".into())
        );
        assert_eq!(
            ScriptCommand::parse("history").unwrap(),
            ScriptCommand::History
        );
    }

    #[test]
    fn test_parse_rejects_bad_arity_and_unknown_verbs() {
        assert!(ScriptCommand::parse(r#"type "Password field""#).is_err());
        assert!(ScriptCommand::parse("hover x").is_err());
        assert!(ScriptCommand::parse("   ").is_err());
    }
}
