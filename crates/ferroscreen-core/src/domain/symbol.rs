use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 20;

/// Normalized market symbol/ticker, exchange suffix included (`TCS.NS`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !(first.is_ascii_alphanumeric() || first == '^') {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '&' | '^' | '=');
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A ticker entry that is not a valid [`Symbol`].
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedTicker {
    /// The entry as typed, trimmed.
    pub input: String,
    pub reason: ValidationError,
}

/// Tickers taken from user input: the entries that parsed, in first-seen
/// order without duplicates, and the ones that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerSelection {
    pub symbols: Vec<Symbol>,
    pub rejected: Vec<RejectedTicker>,
}

impl TickerSelection {
    /// True when the input named no tickers at all, valid or not.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.rejected.is_empty()
    }
}

impl From<Vec<Symbol>> for TickerSelection {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            rejected: Vec::new(),
        }
    }
}

/// Split a comma-separated ticker list, keeping malformed entries aside.
///
/// Blank entries are skipped. An input with no tickers at all yields an
/// empty selection; callers decide which default universe applies.
pub fn select_ticker_list(input: &str) -> TickerSelection {
    select_tickers([input])
}

/// Like [`select_ticker_list`], for tickers given as separate items, each of
/// which may itself be a comma-separated list.
pub fn select_tickers<I, S>(items: I) -> TickerSelection
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut selection = TickerSelection::default();
    for item in items {
        for raw in item.as_ref().split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            match Symbol::parse(raw) {
                Ok(symbol) if !selection.symbols.contains(&symbol) => {
                    selection.symbols.push(symbol)
                }
                Ok(_) => {}
                Err(reason) => selection.rejected.push(RejectedTicker {
                    input: raw.to_owned(),
                    reason,
                }),
            }
        }
    }
    selection
}

/// Strict variant for lists that must be entirely valid, such as config
/// files: the first malformed entry is an error.
pub fn parse_tickers<I, S>(items: I) -> Result<Vec<Symbol>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let selection = select_tickers(items);
    match selection.rejected.into_iter().next() {
        Some(rejected) => Err(rejected.reason),
        None => Ok(selection.symbols),
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
