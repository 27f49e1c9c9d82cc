use std::fmt;
use std::path::Path;
use std::path::PathBuf;

/// A human-readable position inside a specific file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
	pub file: PathBuf,
	/// 1-indexed line number.
	pub line: usize,
	/// 1-indexed column number, counted in characters.
	pub column: usize,
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
	}
}

/// Marks the byte offset in the merged text where content from `file` starts,
/// together with the position of that content in the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
	start: usize,
	file: PathBuf,
	line: usize,
	column: usize,
}

/// Text handed to the segmenter. A plain file has a single origin; text
/// produced by inclusion resolution has one origin for every switch between
/// files so that offsets can be traced back to the file that wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
	path: PathBuf,
	text: String,
	origins: Vec<Origin>,
}

impl Source {
	/// A source made of a single file.
	pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
		let path = path.into();
		Self {
			origins: vec![Origin {
				start: 0,
				file: path.clone(),
				line: 1,
				column: 1,
			}],
			path,
			text: text.into(),
		}
	}

	/// An empty source that is built up with [`Source::push`].
	pub(crate) fn empty(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			text: String::new(),
			origins: Vec::new(),
		}
	}

	/// Append `fragment`, which begins at `line`/`column` of `file`.
	pub(crate) fn push(&mut self, file: &Path, line: usize, column: usize, fragment: &str) {
		if fragment.is_empty() {
			return;
		}

		let continues_last = self.origins.last().is_some_and(|origin| {
			origin.file == file && self.advance(origin, self.text.len()) == (line, column)
		});

		if !continues_last {
			self.origins.push(Origin {
				start: self.text.len(),
				file: file.to_path_buf(),
				line,
				column,
			});
		}

		self.text.push_str(fragment);
	}

	/// The file this source is reported and written as.
	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	/// Map a byte offset in [`Source::text`] back to the file and position it
	/// came from.
	pub fn locate(&self, offset: usize) -> Location {
		let offset = offset.min(self.text.len());
		let index = self
			.origins
			.partition_point(|origin| origin.start <= offset)
			.saturating_sub(1);

		let Some(origin) = self.origins.get(index) else {
			return Location {
				file: self.path.clone(),
				line: 1,
				column: 1,
			};
		};

		let (line, column) = self.advance(origin, offset);
		Location {
			file: origin.file.clone(),
			line,
			column,
		}
	}

	fn advance(&self, origin: &Origin, offset: usize) -> (usize, usize) {
		let between = &self.text[origin.start..offset];
		match between.rfind('\n') {
			Some(last) => {
				let line = origin.line + between.matches('\n').count();
				let column = between[last + 1..].chars().count() + 1;
				(line, column)
			}
			None => (origin.line, origin.column + between.chars().count()),
		}
	}
}

/// 1-indexed line and column of `offset` within `text`.
pub(crate) fn line_column(text: &str, offset: usize) -> (usize, usize) {
	let before = &text[..offset.min(text.len())];
	let line = before.matches('\n').count() + 1;
	let column = match before.rfind('\n') {
		Some(last) => before[last + 1..].chars().count() + 1,
		None => before.chars().count() + 1,
	};
	(line, column)
}
