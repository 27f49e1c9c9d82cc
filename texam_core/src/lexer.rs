use logos::Logos;

use crate::tokens::Directive;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// Raw tokens produced by logos for a flat scan of LaTeX source.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[regex(r"\\begin\{[^}\n]*\}")]
	Begin,
	#[regex(r"\\end\{[^}\n]*\}")]
	End,
	#[regex(r"\\[a-zA-Z@]+")]
	ControlWord,
	/// `\\`, `\%`, `\{` and friends. Consuming them here keeps `\%` from
	/// starting a comment and `\\item` from reading as `\item`.
	#[regex(r"\\[^a-zA-Z@]")]
	ControlSymbol,
	#[regex(r"%[^\n]*", allow_greedy = true)]
	Comment,
	#[token("\n")]
	Newline,
	#[regex(r"[^\\%\n]+")]
	Text,
}

/// Scan `text` and return the structural tokens in source order. Markers
/// inside `%` comments are not reported.
pub fn tokenize(text: &str) -> Vec<Token> {
	let mut tokens = Vec::new();

	for (result, span) in RawToken::lexer(text).spanned() {
		// Unrecognized bytes (a trailing lone backslash) are plain text.
		let Ok(raw) = result else {
			continue;
		};

		let slice = &text[span.clone()];
		let kind = match raw {
			RawToken::Begin => TokenKind::Begin(environment_name(slice)),
			RawToken::End => TokenKind::End(environment_name(slice)),
			RawToken::ControlWord => TokenKind::Command(slice[1..].to_string()),
			RawToken::ControlSymbol
			| RawToken::Comment
			| RawToken::Newline
			| RawToken::Text => continue,
		};

		tokens.push(Token { kind, span });
	}

	tokens
}

/// Find every inclusion directive in `text` whose command is one of
/// `commands`. A directive is a control word followed, on the same line, by a
/// braced argument.
pub fn find_directives(text: &str, commands: &[String]) -> Vec<Directive> {
	tokenize(text)
		.into_iter()
		.filter_map(|token| {
			let TokenKind::Command(command) = token.kind else {
				return None;
			};
			if !commands.contains(&command) {
				return None;
			}

			let rest = &text[token.span.end..];
			let open = rest.len() - rest.trim_start_matches([' ', '\t']).len();
			if !rest[open..].starts_with('{') {
				return None;
			}
			let close = rest[open..].find(['}', '\n'])?;
			if rest.as_bytes()[open + close] != b'}' {
				return None;
			}

			Some(Directive {
				command,
				argument: rest[open + 1..open + close].trim().to_string(),
				span: token.span.start..token.span.end + open + close + 1,
			})
		})
		.collect()
}

/// Extract the trimmed name between the braces of `\begin{name}` or
/// `\end{name}`.
fn environment_name(slice: &str) -> String {
	let start = slice.find('{').map_or(0, |index| index + 1);
	let end = slice.rfind('}').unwrap_or(slice.len());
	slice[start..end].trim().to_string()
}
