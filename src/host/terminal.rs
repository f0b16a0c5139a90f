use super::{Alerts, Interaction};
use crate::models::Choice;
use crate::{Error, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Dialogs on stdin/stdout. End of input dismisses a dialog.
pub struct TerminalInteraction {
    input: Mutex<BufReader<Stdin>>,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }

    async fn read_line(&self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .lock()
            .await
            .read_line(&mut line)
            .await
            .map_err(|e| Error::Interaction(format!("Failed to read input: {}", e)))?;

        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_out(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Render a numbered list of choices, one per line.
pub fn render_choices(prompt: &str, choices: &[Choice]) -> String {
    let mut out = format!("{}\n", prompt);
    for (index, choice) in choices.iter().enumerate() {
        let label = choice.label.as_deref().unwrap_or(&choice.value);
        match &choice.image {
            Some(image) => out.push_str(&format!("  [{}] {}: {}\n", index + 1, label, image)),
            None => out.push_str(&format!("  [{}] {}\n", index + 1, label)),
        }
    }
    out.push_str("Choose an image (number, blank to cancel): ");
    out
}

/// Map a typed answer to a choice index. `Ok(None)` dismisses, `Err(())` re-asks.
pub fn parse_choice(input: &str, count: usize) -> std::result::Result<Option<usize>, ()> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    match input.parse::<usize>() {
        Ok(number) if (1..=count).contains(&number) => Ok(Some(number - 1)),
        _ => Err(()),
    }
}

#[async_trait]
impl Interaction for TerminalInteraction {
    async fn ask(&self, prompt: &str) -> Result<Option<String>> {
        write_out(&format!("{} ", prompt)).await?;
        self.read_line().await
    }

    async fn choose(&self, prompt: &str, choices: &[Choice]) -> Result<Option<String>> {
        write_out(&render_choices(prompt, choices)).await?;

        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            match parse_choice(&line, choices.len()) {
                Ok(index) => return Ok(index.map(|i| choices[i].value.clone())),
                Err(()) => {
                    write_out(&format!("Enter a number from 1 to {}: ", choices.len())).await?
                }
            }
        }
    }
}

/// Alerts printed to stderr.
pub struct StderrAlerts;

#[async_trait]
impl Alerts for StderrAlerts {
    async fn notify(&self, message: &str) {
        eprintln!("AImage Creator: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("2", 3), Ok(Some(1)));
        assert_eq!(parse_choice(" 3 \n", 3), Ok(Some(2)));
        assert_eq!(parse_choice("", 3), Ok(None));
        assert_eq!(parse_choice("Q", 3), Ok(None));
        assert_eq!(parse_choice("0", 3), Err(()));
        assert_eq!(parse_choice("4", 3), Err(()));
        assert_eq!(parse_choice("two", 3), Err(()));
    }

    #[test]
    fn test_render_choices_lists_previews() {
        let choices = vec![
            Choice {
                label: Some("Option 1".to_string()),
                image: Some("https://img/1.png".to_string()),
                value: "https://img/1.png".to_string(),
            },
            Choice {
                label: Some("More options".to_string()),
                image: None,
                value: "more".to_string(),
            },
        ];

        let rendered = render_choices("Received 1 options", &choices);
        assert!(rendered.starts_with("Received 1 options\n"));
        assert!(rendered.contains("  [1] Option 1: https://img/1.png\n"));
        assert!(rendered.contains("  [2] More options\n"));
    }
}
