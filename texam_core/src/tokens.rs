use std::ops::Range;

/// Only the markup that can affect block structure is tokenized. Everything
/// else (plain text, comments, control symbols) is skipped by the lexer and
/// recovered later by slicing the source between token spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
	/// `\begin{name}`
	Begin(String),
	/// `\end{name}`
	End(String),
	/// A control word such as `\item`, `\xtem` or `\input`, without the
	/// backslash.
	Command(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	/// Byte range of the token in the scanned text.
	pub span: Range<usize>,
}

impl Token {
	/// The literal source text of the token.
	pub fn text<'a>(&self, source: &'a str) -> &'a str {
		&source[self.span.clone()]
	}
}

/// An inclusion directive such as `\input{sections/part1}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
	/// The command name, e.g. `input`.
	pub command: String,
	/// The trimmed text between the braces.
	pub argument: String,
	/// Byte range covering the command and its braced argument.
	pub span: Range<usize>,
}
