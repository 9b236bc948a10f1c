use thiserror::Error;

/// Maximum number of tokens in one command line, control tokens included.
pub const MAXARGS: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("too many arguments (at most {MAXARGS})")]
    TooManyArguments,
}

/// Splits one raw command line into an argument vector for the dispatcher.
///
/// Tokens are separated by whitespace; `|` and `&` always form standalone
/// tokens, so `ls|wc` splits the same way as `ls | wc`. No quoting and no
/// redirection operators. A blank line yields an empty vector.
pub fn split_command_line(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '|' || ch == '&' {
            tokens.push(ch.to_string());
            chars.next();
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '|' || c == '&' {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
        if tokens.len() > MAXARGS {
            return Err(ParseError::TooManyArguments);
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        let tokens = split_command_line("ls -l").unwrap();
        assert_eq!(tokens, vec!["ls", "-l"]);
    }

    #[test]
    fn test_split_pipe_without_spaces() {
        let tokens = split_command_line("ls|wc -l").unwrap();
        assert_eq!(tokens, vec!["ls", "|", "wc", "-l"]);
    }

    #[test]
    fn test_split_trailing_ampersand() {
        let tokens = split_command_line("sleep 5 &").unwrap();
        assert_eq!(tokens, vec!["sleep", "5", "&"]);
    }

    #[test]
    fn test_split_blank_line() {
        assert!(split_command_line("   \t ").unwrap().is_empty());
    }

    #[test]
    fn test_split_too_many_arguments() {
        let line = "x ".repeat(MAXARGS + 1);
        assert_eq!(
            split_command_line(&line),
            Err(ParseError::TooManyArguments)
        );
    }
}
