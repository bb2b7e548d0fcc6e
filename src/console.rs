//! Line-based front-end standing in for the chat platform.
//!
//! Every line read is a message posted in a guild:
//!
//! ```text
//! <guild id> <member id> <message text>
//! ```
//!
//! Blank lines and lines starting with `#` are skipped, so a file of messages
//! can be commented and piped into the bot.

use log::warn;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    commands::CommandResult,
    host::{GuildId, MemberId},
};

/// A message read from the console.
#[derive(Debug, PartialEq, Eq)]
pub struct ConsoleMessage {
    pub guild: GuildId,
    pub member: MemberId,
    pub text: String,
}

/// Reads [`ConsoleMessage`]s line by line.
pub struct Console<R> {
    lines: Lines<R>,
}

impl Console<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Console::new(BufReader::new(io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    pub fn new(reader: R) -> Self {
        Console {
            lines: reader.lines(),
        }
    }

    /// Returns the next message, or `None` once the input is exhausted.
    ///
    /// Malformed lines are logged and skipped. Cancel safe.
    pub async fn next_message(&mut self) -> Option<ConsoleMessage> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    warn!("failed to read console input: {}", e);
                    return None;
                }
            };

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_line(line) {
                Some(message) => return Some(message),
                None => warn!(
                    "ignoring malformed line, expected <guild id> <member id> <text>: {}",
                    line
                ),
            }
        }
    }
}

/// Splits a line into guild, member and text.
///
/// Ids may be given bare or as mentions. The text keeps its inner spacing.
pub fn parse_line(line: &str) -> Option<ConsoleMessage> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);

    let guild = parts.next()?.parse::<GuildId>().ok()?;
    let member = parts.next()?.parse::<MemberId>().ok()?;
    let text = parts.next()?.trim_start();

    if text.is_empty() {
        return None;
    }

    Some(ConsoleMessage {
        guild,
        member,
        text: text.to_string(),
    })
}

/// Formats what the bot answered to a message, one output line per entry.
///
/// Private replies are only meant for the issuer and are marked as such.
pub fn render(reply: Option<&CommandResult>, reactions: &[&str]) -> Vec<String> {
    let mut output = Vec::new();

    if let Some(reply) = reply {
        if reply.private {
            output.push(format!("[private] {}", reply.response));
        } else {
            output.push(reply.response.clone());
        }
    }

    output.extend(reactions.iter().map(|emoji| format!("[react] {}", emoji)));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("1 100 !meatball set 7 4"),
            Some(ConsoleMessage {
                guild: GuildId(1),
                member: MemberId(100),
                text: "!meatball set 7 4".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_line_with_mention() {
        let message = parse_line("1 <@100>   Wordle 1,234 3/6").unwrap();
        assert_eq!(message.member, MemberId(100));
        assert_eq!(message.text, "Wordle 1,234 3/6");
    }

    #[test]
    fn test_parse_line_malformed() {
        assert_eq!(parse_line("kitchen 100 hello"), None);
        assert_eq!(parse_line("1 alice hello"), None);
        assert_eq!(parse_line("1 100"), None);
        assert_eq!(parse_line("1 100   "), None);
    }

    #[tokio::test]
    async fn test_next_message_skips_comments_and_garbage() {
        let input: &[u8] = b"# a comment\n\n1 100 first\nnot a message\n  \n2 200 second\n";
        let mut console = Console::new(input);

        assert_eq!(console.next_message().await.unwrap().text, "first");
        let second = console.next_message().await.unwrap();
        assert_eq!(second.guild, GuildId(2));
        assert_eq!(second.text, "second");
        assert_eq!(console.next_message().await, None);
    }

    #[test]
    fn test_render() {
        let public = CommandResult::public("hello".to_string());
        let private = CommandResult::private("secret".to_string());

        assert_eq!(render(Some(&public), &[]), vec!["hello"]);
        assert_eq!(render(Some(&private), &[]), vec!["[private] secret"]);
        assert_eq!(
            render(None, &["🧠", "1️⃣"]),
            vec!["[react] 🧠", "[react] 1️⃣"]
        );
        assert!(render(None, &[]).is_empty());
    }
}
