use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::Location;
use crate::MarkerConfig;
use crate::Ordinal;
use crate::Source;
use crate::TexamError;
use crate::TexamResult;
use crate::lexer::tokenize;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// Every document taking part in one run: one per input file, or the single
/// assembled document of a master file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct Exam(pub Vec<Document>);

impl Exam {
	pub fn problem_count(&self) -> usize {
		self.iter().map(Document::problem_count).sum()
	}
}

/// A segmented exam file: top-level spans in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
	/// The file the document was read from (the master file when assembled).
	pub path: PathBuf,
	pub spans: Vec<Span>,
}

/// A contiguous run of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
	/// Text with no role in reordering, copied verbatim in place.
	Opaque(String),
	/// A problem block, the unit of problem-order shuffling.
	Problem(ProblemBlock),
}

/// A problem block from its begin marker through its end marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemBlock {
	/// Text from the begin marker up to the choice list, or the whole block
	/// when there is no choice list.
	pub preamble: String,
	pub choices: Option<ChoiceList>,
	/// Text after the choice list, including the problem's end marker.
	pub trailing: String,
	/// Where the begin marker was found.
	pub location: Option<Location>,
}

/// The multiple-choice list inside a problem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceList {
	/// Text from the list's begin marker up to the first item.
	pub opening: String,
	pub items: Vec<ChoiceItem>,
	/// The list's end marker.
	pub closing: String,
}

/// One answer alternative. The correctness flag lives here, so it moves with
/// the body whenever the item moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceItem {
	pub kind: ItemKind,
	/// The literal marker, e.g. `\item` or `\xtem`.
	pub marker: String,
	/// Everything after the marker up to the next item or the end of the list.
	pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
	Plain,
	Correct,
}

impl ChoiceItem {
	pub fn is_correct(&self) -> bool {
		self.kind == ItemKind::Correct
	}
}

impl Document {
	/// Iterate over the problem blocks in order.
	pub fn problems(&self) -> impl Iterator<Item = &ProblemBlock> {
		self.spans.iter().filter_map(|span| {
			match span {
				Span::Problem(problem) => Some(problem),
				Span::Opaque(_) => None,
			}
		})
	}

	pub fn problem_count(&self) -> usize {
		self.problems().count()
	}
}

/// Parse a single file's text into a [`Document`].
pub fn parse(path: impl AsRef<Path>, content: &str, markers: &MarkerConfig) -> TexamResult<Document> {
	parse_source(&Source::new(path.as_ref(), content), markers)
}

/// Segment `source` into opaque spans and problem blocks.
pub fn parse_source(source: &Source, markers: &MarkerConfig) -> TexamResult<Document> {
	let tokens = tokenize(source.text());
	let mut segmenter = Segmenter::new(source, markers);
	for token in &tokens {
		segmenter.process(token)?;
	}
	let document = segmenter.finish()?;

	tracing::debug!(
		path = %document.path.display(),
		spans = document.spans.len(),
		problems = document.problem_count(),
		"segmented document"
	);

	Ok(document)
}

/// A problem whose end marker has not been reached yet.
struct OpenProblem {
	start: usize,
	marker: MarkerRef,
	/// Offset of the choice list's begin marker.
	list_start: Option<usize>,
	/// Offset just past the choice list's end marker.
	list_end: usize,
	choices: Option<ChoiceList>,
	open_list: Option<OpenList>,
}

/// A choice list whose end marker has not been reached yet.
struct OpenList {
	marker: MarkerRef,
	opening: Option<String>,
	items: Vec<ChoiceItem>,
	/// Start offset, kind and marker length of the item being collected.
	current: Option<(usize, ItemKind, usize)>,
	/// Other environments opened inside the list. Item markers inside them
	/// belong to the current item.
	nested: Vec<(String, MarkerRef)>,
}

/// A marker occurrence remembered for error reporting.
#[derive(Clone)]
struct MarkerRef {
	text: String,
	start: usize,
	occurrence: Ordinal,
}

/// Walks the token stream, building spans and tracking which blocks are open.
struct Segmenter<'a> {
	source: &'a Source,
	markers: &'a MarkerConfig,
	spans: Vec<Span>,
	/// Start of the pending top-level opaque text.
	cursor: usize,
	problem: Option<OpenProblem>,
	/// How often each literal marker has been seen so far.
	occurrences: HashMap<String, usize>,
}

impl<'a> Segmenter<'a> {
	fn new(source: &'a Source, markers: &'a MarkerConfig) -> Self {
		Self {
			source,
			markers,
			spans: Vec::new(),
			cursor: 0,
			problem: None,
			occurrences: HashMap::new(),
		}
	}

	fn text(&self) -> &'a str {
		self.source.text()
	}

	fn marker_ref(&mut self, token: &Token) -> MarkerRef {
		let text = token.text(self.source.text()).to_string();
		let count = self.occurrences.entry(text.clone()).or_default();
		*count += 1;
		MarkerRef {
			text,
			start: token.span.start,
			occurrence: Ordinal(*count),
		}
	}

	fn process(&mut self, token: &Token) -> TexamResult<()> {
		match &token.kind {
			TokenKind::Begin(name) if *name == self.markers.problem => self.begin_problem(token),
			TokenKind::Begin(name) if *name == self.markers.choices => self.begin_choices(token),
			TokenKind::End(name) if *name == self.markers.problem => self.end_problem(token),
			TokenKind::End(name) if *name == self.markers.choices => self.end_choices(token),
			TokenKind::Begin(name) => {
				if self.open_list_mut().is_some() {
					let entry = (name.clone(), self.marker_ref(token));
					if let Some(list) = self.open_list_mut() {
						list.nested.push(entry);
					}
				}
				Ok(())
			}
			TokenKind::End(name) => {
				if let Some(list) = self.open_list_mut() {
					if list.nested.last().is_some_and(|(env, _)| env == name) {
						list.nested.pop();
					}
				}
				Ok(())
			}
			TokenKind::Command(name) if *name == self.markers.item => {
				self.item(token, ItemKind::Plain);
				Ok(())
			}
			TokenKind::Command(name) if *name == self.markers.correct_item => {
				self.item(token, ItemKind::Correct);
				Ok(())
			}
			TokenKind::Command(_) => Ok(()),
		}
	}

	fn open_list_mut(&mut self) -> Option<&mut OpenList> {
		self.problem
			.as_mut()
			.and_then(|problem| problem.open_list.as_mut())
	}

	fn begin_problem(&mut self, token: &Token) -> TexamResult<()> {
		let marker = self.marker_ref(token);
		if self.problem.is_some() {
			return Err(TexamError::NestedProblem {
				location: self.source.locate(marker.start),
				marker: marker.text,
				occurrence: marker.occurrence,
			});
		}

		let start = token.span.start;
		if start > self.cursor {
			self.spans
				.push(Span::Opaque(self.text()[self.cursor..start].to_string()));
		}

		self.problem = Some(OpenProblem {
			start,
			marker,
			list_start: None,
			list_end: 0,
			choices: None,
			open_list: None,
		});

		Ok(())
	}

	fn begin_choices(&mut self, token: &Token) -> TexamResult<()> {
		let marker = self.marker_ref(token);
		let location = self.source.locate(marker.start);
		let Some(problem) = self.problem.as_mut() else {
			return Err(TexamError::ChoiceListOutsideProblem {
				location,
				marker: marker.text,
				occurrence: marker.occurrence,
			});
		};

		if problem.list_start.is_some() {
			return Err(TexamError::DuplicateChoiceList {
				location,
				marker: marker.text,
				occurrence: marker.occurrence,
			});
		}

		problem.list_start = Some(token.span.start);
		problem.open_list = Some(OpenList {
			marker,
			opening: None,
			items: Vec::new(),
			current: None,
			nested: Vec::new(),
		});

		Ok(())
	}

	fn item(&mut self, token: &Token, kind: ItemKind) {
		let text = self.text();
		let Some(problem) = self.problem.as_mut() else {
			return;
		};
		let Some(list_start) = problem.list_start else {
			return;
		};
		let Some(list) = problem.open_list.as_mut() else {
			return;
		};
		if !list.nested.is_empty() {
			return;
		}

		let start = token.span.start;
		match list.current.take() {
			Some(current) => list.items.push(make_item(text, current, start)),
			None => list.opening = Some(text[list_start..start].to_string()),
		}
		list.current = Some((start, kind, token.span.len()));
	}

	fn end_choices(&mut self, token: &Token) -> TexamResult<()> {
		let marker = self.marker_ref(token);
		let text = self.text();
		let location = self.source.locate(marker.start);

		let Some((problem, mut list)) = self
			.problem
			.as_mut()
			.and_then(|problem| problem.open_list.take().map(|list| (problem, list)))
		else {
			return Err(TexamError::UnmatchedEnd {
				location,
				marker: marker.text,
				occurrence: marker.occurrence,
			});
		};

		if let Some((_, nested)) = list.nested.pop() {
			return Err(TexamError::UnclosedBlock {
				location: self.source.locate(nested.start),
				marker: nested.text,
				occurrence: nested.occurrence,
			});
		}

		let start = token.span.start;
		let list_start = problem.list_start.unwrap_or(start);
		if let Some(current) = list.current.take() {
			list.items.push(make_item(text, current, start));
		}

		problem.choices = Some(ChoiceList {
			opening: list
				.opening
				.take()
				.unwrap_or_else(|| text[list_start..start].to_string()),
			items: list.items,
			closing: token.text(text).to_string(),
		});
		problem.list_end = token.span.end;

		Ok(())
	}

	fn end_problem(&mut self, token: &Token) -> TexamResult<()> {
		let marker = self.marker_ref(token);
		let Some(problem) = self.problem.take() else {
			return Err(TexamError::UnmatchedEnd {
				location: self.source.locate(marker.start),
				marker: marker.text,
				occurrence: marker.occurrence,
			});
		};

		if let Some(list) = problem.open_list {
			return Err(TexamError::UnclosedBlock {
				location: self.source.locate(list.marker.start),
				marker: list.marker.text,
				occurrence: list.marker.occurrence,
			});
		}

		let text = self.text();
		let end = token.span.end;
		let block = match (problem.list_start, problem.choices) {
			(Some(list_start), Some(choices)) => {
				ProblemBlock {
					preamble: text[problem.start..list_start].to_string(),
					choices: Some(choices),
					trailing: text[problem.list_end..end].to_string(),
					location: Some(self.source.locate(problem.start)),
				}
			}
			_ => {
				ProblemBlock {
					preamble: text[problem.start..end].to_string(),
					choices: None,
					trailing: String::new(),
					location: Some(self.source.locate(problem.start)),
				}
			}
		};

		self.spans.push(Span::Problem(block));
		self.cursor = end;

		Ok(())
	}

	fn finish(mut self) -> TexamResult<Document> {
		if let Some(problem) = self.problem.take() {
			let marker = problem
				.open_list
				.map_or(problem.marker, |list| list.marker);
			return Err(TexamError::UnclosedBlock {
				location: self.source.locate(marker.start),
				marker: marker.text,
				occurrence: marker.occurrence,
			});
		}

		let text = self.text();
		if self.cursor < text.len() {
			self.spans
				.push(Span::Opaque(text[self.cursor..].to_string()));
		}

		Ok(Document {
			path: self.source.path().to_path_buf(),
			spans: self.spans,
		})
	}
}

fn make_item(text: &str, (start, kind, marker_len): (usize, ItemKind, usize), end: usize) -> ChoiceItem {
	ChoiceItem {
		kind,
		marker: text[start..start + marker_len].to_string(),
		body: text[start + marker_len..end].to_string(),
	}
}
