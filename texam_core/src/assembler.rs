use std::collections::HashMap;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Exam;
use crate::IncludeChain;
use crate::MarkerConfig;
use crate::Source;
use crate::TexamError;
use crate::TexamResult;
use crate::lexer::find_directives;
use crate::parser::parse_source;
use crate::source::line_column;

/// Supplies file contents to the assembler. The core never touches the
/// filesystem directly, so embedders and tests can serve files from memory.
pub trait SourceLoader {
	/// Read the full text of `path`.
	fn read(&self, path: &Path) -> io::Result<String>;

	/// A stable identity for `path`. Two spellings of the same file must map
	/// to the same value. Fails with [`io::ErrorKind::NotFound`] when the file
	/// does not exist.
	fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Loads files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
	fn read(&self, path: &Path) -> io::Result<String> {
		std::fs::read_to_string(path)
	}

	fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
		let canonical = std::fs::canonicalize(path)?;
		if canonical.is_file() {
			Ok(canonical)
		} else {
			Err(io::Error::new(io::ErrorKind::NotFound, "not a file"))
		}
	}
}

/// Serves files from an in-memory map keyed by lexically normalized paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
	files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or replace a file.
	pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> &mut Self {
		self.files
			.insert(normalize_path(path.as_ref()), content.into());
		self
	}

	/// Builder-style [`MemoryLoader::insert`].
	#[must_use]
	pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
		self.insert(path, content);
		self
	}
}

impl SourceLoader for MemoryLoader {
	fn read(&self, path: &Path) -> io::Result<String> {
		self.files
			.get(&normalize_path(path))
			.cloned()
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
	}

	fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
		let normalized = normalize_path(path);
		if self.files.contains_key(&normalized) {
			Ok(normalized)
		} else {
			Err(io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
		}
	}
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				let popped = matches!(
					normalized.components().next_back(),
					Some(Component::Normal(_))
				) && normalized.pop();
				if !popped && !normalized.has_root() {
					normalized.push("..");
				}
			}
			other => normalized.push(other.as_os_str()),
		}
	}
	normalized
}

/// Read and segment each file on its own.
pub fn load_documents(
	paths: &[PathBuf],
	loader: &dyn SourceLoader,
	markers: &MarkerConfig,
) -> TexamResult<Exam> {
	if paths.is_empty() {
		return Err(TexamError::NoInputFiles);
	}

	let mut documents = Vec::with_capacity(paths.len());
	for path in paths {
		let text = read(loader, path)?;
		documents.push(parse_source(&Source::new(path, text), markers)?);
	}

	Ok(Exam(documents))
}

/// Resolve the inclusion graph of `master` and segment the result as one
/// document.
pub fn load_master(
	master: &Path,
	loader: &dyn SourceLoader,
	markers: &MarkerConfig,
) -> TexamResult<Exam> {
	let source = resolve_master(master, loader, markers)?;
	Ok(Exam(vec![parse_source(&source, markers)?]))
}

/// Substitute every inclusion directive reachable from `master` with the
/// referenced file's content, depth-first in directive order.
pub fn resolve_master(
	master: &Path,
	loader: &dyn SourceLoader,
	markers: &MarkerConfig,
) -> TexamResult<Source> {
	let identity = loader
		.canonicalize(master)
		.map_err(|source| {
			TexamError::ReadFile {
				path: master.to_path_buf(),
				source,
			}
		})?;
	let text = read(loader, master)?;

	let mut resolver = Resolver {
		loader,
		markers,
		base: master.parent().map(Path::to_path_buf).unwrap_or_default(),
		stack: vec![(master.to_path_buf(), identity)],
		source: Source::empty(master),
	};
	resolver.expand(master, &text)?;

	tracing::debug!(
		master = %master.display(),
		bytes = resolver.source.text().len(),
		"resolved inclusions"
	);

	Ok(resolver.source)
}

struct Resolver<'a> {
	loader: &'a dyn SourceLoader,
	markers: &'a MarkerConfig,
	/// Directory that directive paths are relative to.
	base: PathBuf,
	/// Files currently being expanded, as written and by identity.
	stack: Vec<(PathBuf, PathBuf)>,
	source: Source,
}

impl Resolver<'_> {
	fn expand(&mut self, file: &Path, text: &str) -> TexamResult<()> {
		let mut cursor = 0;

		for directive in find_directives(text, &self.markers.include) {
			self.push(file, text, cursor, directive.span.start);

			let Some((path, identity)) = self.find(&directive.argument)? else {
				let mut chain = self.chain();
				chain.push(PathBuf::from(&directive.argument));
				return Err(TexamError::MissingInclude {
					name: directive.argument,
					chain: IncludeChain(chain),
				});
			};

			if self.stack.iter().any(|(_, open)| *open == identity) {
				let mut chain = self.chain();
				chain.push(path);
				return Err(TexamError::CircularInclude {
					chain: IncludeChain(chain),
				});
			}

			tracing::debug!(
				command = %directive.command,
				from = %file.display(),
				include = %path.display(),
				"including file"
			);
			let content = read(self.loader, &path)?;
			self.stack.push((path.clone(), identity));
			self.expand(&path, &content)?;
			self.stack.pop();

			cursor = directive.span.end;
		}

		self.push(file, text, cursor, text.len());
		Ok(())
	}

	fn push(&mut self, file: &Path, text: &str, start: usize, end: usize) {
		let (line, column) = line_column(text, start);
		self.source.push(file, line, column, &text[start..end]);
	}

	/// The path to read for a directive argument, trying `<name>.tex` when the
	/// argument has no extension. Only a missing file moves on to the next
	/// candidate.
	fn find(&self, argument: &str) -> TexamResult<Option<(PathBuf, PathBuf)>> {
		let direct = self.base.join(argument);
		let mut candidates = vec![direct.clone()];
		if direct.extension().is_none() {
			candidates.push(self.base.join(format!("{argument}.tex")));
		}

		for candidate in candidates {
			match self.loader.canonicalize(&candidate) {
				Ok(identity) => return Ok(Some((candidate, identity))),
				Err(error) if error.kind() == io::ErrorKind::NotFound => {}
				Err(source) => {
					return Err(TexamError::ReadFile {
						path: candidate,
						source,
					});
				}
			}
		}

		Ok(None)
	}

	fn chain(&self) -> Vec<PathBuf> {
		self.stack.iter().map(|(path, _)| path.clone()).collect()
	}
}

fn read(loader: &dyn SourceLoader, path: &Path) -> TexamResult<String> {
	loader.read(path).map_err(|source| {
		TexamError::ReadFile {
			path: path.to_path_buf(),
			source,
		}
	})
}
