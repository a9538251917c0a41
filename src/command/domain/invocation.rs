//! Lexer for `/command key=value` text.
//!
//! The lexer reads the command name and then yields one `(key, value)`
//! option at a time, so malformed keys, stray backslashes and unterminated
//! quotes are reported against the option they occur in.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::iter::Peekable;
use std::str::CharIndices;

use super::CommandError;

/// A tokenized command invocation, not yet checked against any command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    command: String,
    parameters: BTreeMap<String, String>,
}

impl CommandInvocation {
    /// Parses `/<command> key=value key2="quoted value"` input.
    ///
    /// Command names and keys are lowercased. Values keep their case. Any
    /// part of a value may be wrapped in single or double quotes, and a
    /// backslash inside quotes escapes the next character.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the input is empty or malformed.
    pub fn parse(raw_input: &str) -> Result<Self, CommandError> {
        if raw_input.trim().is_empty() {
            return Err(CommandError::EmptyInput);
        }

        let mut lexer = Lexer::new(raw_input);
        let command = lexer.command_name()?;
        let mut parameters = BTreeMap::new();
        for option in lexer {
            let (key, value) = option?;
            insert_option(&mut parameters, key, value)?;
        }
        Ok(Self {
            command,
            parameters,
        })
    }

    /// Builds an invocation from already separated options, as delivered by
    /// platforms that send structured interactions.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidCommandName`] or
    /// [`CommandError::InvalidParameterToken`] for names outside
    /// `[A-Za-z0-9_-]`.
    pub fn from_parts<I, K, V>(command: &str, options: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let name = command.trim().trim_start_matches('/');
        let command = normalized_identifier(name)
            .ok_or_else(|| CommandError::InvalidCommandName(name.to_owned()))?;
        let mut parameters = BTreeMap::new();
        for (raw_key, value) in options {
            let key: String = raw_key.into();
            let Some(normalized) = normalized_identifier(&key) else {
                return Err(CommandError::InvalidParameterToken { token: key });
            };
            insert_option(&mut parameters, normalized, value.into())?;
        }
        Ok(Self {
            command,
            parameters,
        })
    }

    /// Returns the command name without the leading slash.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns parsed parameter values as raw strings.
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }
}

fn insert_option(
    parameters: &mut BTreeMap<String, String>,
    key: String,
    value: String,
) -> Result<(), CommandError> {
    match parameters.entry(key) {
        Entry::Occupied(entry) => Err(CommandError::DuplicateParameter(entry.key().clone())),
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
    }
}

const fn is_identifier_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '-' | '_')
}

fn normalized_identifier(value: &str) -> Option<String> {
    (!value.is_empty() && value.chars().all(is_identifier_char))
        .then(|| value.to_ascii_lowercase())
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.input.len(), |&(index, _)| index)
    }

    fn slice_from(&mut self, start: usize) -> String {
        let end = self.offset();
        self.input.get(start..end).unwrap_or_default().to_owned()
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    /// Consumes up to the next whitespace and returns the word begun at `start`.
    fn finish_word(&mut self, start: usize) -> String {
        while self.chars.next_if(|&(_, c)| !c.is_whitespace()).is_some() {}
        self.slice_from(start)
    }

    fn command_name(&mut self) -> Result<String, CommandError> {
        self.skip_whitespace();
        if self.chars.next_if(|&(_, c)| c == '/').is_none() {
            return Err(CommandError::MissingLeadingSlash);
        }
        let start = self.offset();
        let name = self.finish_word(start);
        normalized_identifier(&name).ok_or(CommandError::InvalidCommandName(name))
    }

    fn option(&mut self) -> Result<(String, String), CommandError> {
        let start = self.offset();
        while self.chars.next_if(|&(_, c)| is_identifier_char(c)).is_some() {}
        let key = self.slice_from(start);
        if key.is_empty() || self.chars.next_if(|&(_, c)| c == '=').is_none() {
            return Err(CommandError::InvalidParameterToken {
                token: self.finish_word(start),
            });
        }
        let value = self.value(start)?;
        Ok((key.to_ascii_lowercase(), value))
    }

    fn value(&mut self, start: usize) -> Result<String, CommandError> {
        let mut value = String::new();
        while let Some((_, character)) = self.chars.next_if(|&(_, c)| !c.is_whitespace()) {
            match character {
                '"' | '\'' => self.quoted(character, &mut value)?,
                '\\' => {
                    return Err(CommandError::InvalidParameterToken {
                        token: self.slice_from(start),
                    });
                }
                _ => value.push(character),
            }
        }
        Ok(value)
    }

    fn quoted(&mut self, quote: char, value: &mut String) -> Result<(), CommandError> {
        loop {
            match self.chars.next().map(|(_, c)| c) {
                Some('\\') => {
                    let (_, escaped) = self
                        .chars
                        .next()
                        .ok_or(CommandError::UnterminatedQuotedValue)?;
                    value.push(escaped);
                }
                Some(c) if c == quote => return Ok(()),
                Some(c) => value.push(c),
                None => return Err(CommandError::UnterminatedQuotedValue),
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<(String, String), CommandError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        self.chars.peek()?;
        Some(self.option())
    }
}
