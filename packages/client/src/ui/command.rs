//! Parsing of typed input lines.

use thiserror::Error;

use crate::domain::{Persona, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Knock,
    Enter,
    Select(Persona),
    Deselect,
    Personas,
    Status,
    Reset,
    Help,
    Quit,
    /// Free text: an answer for the bouncer or a chat message.
    Say(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '/{0}'. Type /help for the list.")]
    Unknown(String),

    #[error("/{0} needs a persona name")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Persona(#[from] ValidationError),
}

/// Parse one line. Lines that do not start with `/` are free text.
pub fn parse_command(line: &str) -> Result<UserCommand, CommandError> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(UserCommand::Say(line.to_string()));
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match name.as_str() {
        "knock" => Ok(UserCommand::Knock),
        "enter" => Ok(UserCommand::Enter),
        "select" => {
            let persona = argument.ok_or(CommandError::MissingArgument("select"))?;
            Ok(UserCommand::Select(persona.parse()?))
        }
        "deselect" => Ok(UserCommand::Deselect),
        "personas" => Ok(UserCommand::Personas),
        "status" => Ok(UserCommand::Status),
        "reset" => Ok(UserCommand::Reset),
        "help" => Ok(UserCommand::Help),
        "quit" | "exit" => Ok(UserCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_is_said_verbatim() {
        // テスト項目: スラッシュで始まらない行はそのまま発言になる
        // given (前提条件):
        let line = "  I want a drink ";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(result, Ok(UserCommand::Say("  I want a drink ".to_string())));
    }

    #[test]
    fn test_blank_line_is_empty_say() {
        // テスト項目: 空行は空の発言として扱われる（送信側で拒否される）
        // given (前提条件):
        let line = "   ";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(result, Ok(UserCommand::Say("   ".to_string())));
    }

    #[test]
    fn test_select_parses_persona() {
        // テスト項目: /select はペルソナ名を解釈する
        // given (前提条件):
        let line = "/select Bernie";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(result, Ok(UserCommand::Select(Persona::Bernie)));
    }

    #[test]
    fn test_select_without_argument() {
        // テスト項目: 引数のない /select はエラーになる
        // given (前提条件):
        let line = "/select   ";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::MissingArgument("select")));
    }

    #[test]
    fn test_select_unknown_persona() {
        // テスト項目: 未知のペルソナ名の /select はエラーになる
        // given (前提条件):
        let line = "/select bukowski";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(CommandError::Persona(ValidationError::UnknownPersona(
                "bukowski".to_string()
            )))
        );
    }

    #[test]
    fn test_unknown_command() {
        // テスト項目: 未知のコマンドはエラーになる
        // given (前提条件):
        let line = "/dance";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::Unknown("dance".to_string())));
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        // テスト項目: コマンド名は大文字小文字を区別しない
        // given (前提条件):
        let lines = ["/KNOCK", "/Enter", "/exit"];

        // when (操作):
        let results: Vec<_> = lines.iter().map(|l| parse_command(l).unwrap()).collect();

        // then (期待する結果):
        assert_eq!(
            results,
            vec![UserCommand::Knock, UserCommand::Enter, UserCommand::Quit]
        );
    }
}
