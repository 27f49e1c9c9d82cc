use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::Location;

/// Broad classification of a [`TexamError`], mirroring the stage of the
/// pipeline that rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Malformed or unbalanced block markers.
	Structural,
	/// Inclusion directives that cannot be resolved.
	Resolution,
	/// Contradictory or invalid options.
	Configuration,
	/// Reading or writing files failed.
	Io,
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TexamError {
	#[error("failed to read `{path}`: {source}")]
	#[diagnostic(code(texam::read_file))]
	ReadFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{path}`: {source}")]
	#[diagnostic(code(texam::write_file))]
	WriteFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("unmatched `{marker}` ({occurrence}) at {location}")]
	#[diagnostic(
		code(texam::unmatched_end),
		help("remove the marker or add the matching `\\begin{{...}}` before it")
	)]
	UnmatchedEnd {
		marker: String,
		occurrence: Ordinal,
		location: Location,
	},

	#[error("`{marker}` ({occurrence}) at {location} is never closed")]
	#[diagnostic(code(texam::unclosed_block), help("add the matching end marker"))]
	UnclosedBlock {
		marker: String,
		occurrence: Ordinal,
		location: Location,
	},

	#[error("`{marker}` ({occurrence}) at {location} opens a choice list outside of a problem")]
	#[diagnostic(
		code(texam::choice_list_outside_problem),
		help("answer choices must be nested inside a problem block")
	)]
	ChoiceListOutsideProblem {
		marker: String,
		occurrence: Ordinal,
		location: Location,
	},

	#[error("`{marker}` ({occurrence}) at {location} opens a problem inside another problem")]
	#[diagnostic(
		code(texam::nested_problem),
		help("close the previous problem before starting a new one")
	)]
	NestedProblem {
		marker: String,
		occurrence: Ordinal,
		location: Location,
	},

	#[error("`{marker}` ({occurrence}) at {location} opens a second choice list in the same problem")]
	#[diagnostic(
		code(texam::duplicate_choice_list),
		help("each problem may contain at most one choice list")
	)]
	DuplicateChoiceList {
		marker: String,
		occurrence: Ordinal,
		location: Location,
	},

	#[error("included file `{name}` not found (inclusion chain: {chain})")]
	#[diagnostic(
		code(texam::missing_include),
		help("paths in inclusion directives are resolved relative to the master file")
	)]
	MissingInclude { name: String, chain: IncludeChain },

	#[error("circular inclusion: {chain}")]
	#[diagnostic(
		code(texam::circular_include),
		help("a file must not include itself, directly or indirectly")
	)]
	CircularInclude { chain: IncludeChain },

	#[error("failed to parse config file `{path}`: {reason}")]
	#[diagnostic(
		code(texam::config_parse),
		help("check that the config is valid TOML with [markers], [shuffle] and [output] sections")
	)]
	ConfigParse { path: PathBuf, reason: String },

	#[error("invalid marker configuration: {0}")]
	#[diagnostic(code(texam::invalid_markers))]
	InvalidMarkers(String),

	#[error("problem and choice shuffling are both disabled")]
	#[diagnostic(
		code(texam::nothing_to_shuffle),
		help("generated variants would be identical to the original")
	)]
	NothingToShuffle,

	#[error("shuffling across files needs at least two files, got {0}")]
	#[diagnostic(
		code(texam::cross_file_scope),
		help("use the `per-file` scope or pass more input files")
	)]
	CrossFileScopeNeedsFiles(usize),

	#[error("master mode takes exactly one input file, got {0}")]
	#[diagnostic(code(texam::master_single_file))]
	MasterNeedsSingleFile(usize),

	#[error("the number of versions must be at least 1")]
	#[diagnostic(code(texam::no_versions))]
	NoVersions,

	#[error("no input files given")]
	#[diagnostic(code(texam::no_input_files))]
	NoInputFiles,

	#[error("`{first}` and `{second}` would both be written to `{output}`")]
	#[diagnostic(
		code(texam::output_collision),
		help("input files need distinct file names, or use master mode")
	)]
	OutputCollision {
		first: PathBuf,
		second: PathBuf,
		output: PathBuf,
	},
}

impl TexamError {
	/// The pipeline stage this error belongs to.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::ReadFile { .. } | Self::WriteFile { .. } => ErrorKind::Io,
			Self::UnmatchedEnd { .. }
			| Self::UnclosedBlock { .. }
			| Self::ChoiceListOutsideProblem { .. }
			| Self::NestedProblem { .. }
			| Self::DuplicateChoiceList { .. } => ErrorKind::Structural,
			Self::MissingInclude { .. } | Self::CircularInclude { .. } => ErrorKind::Resolution,
			Self::ConfigParse { .. }
			| Self::InvalidMarkers(_)
			| Self::NothingToShuffle
			| Self::CrossFileScopeNeedsFiles(_)
			| Self::MasterNeedsSingleFile(_)
			| Self::NoVersions
			| Self::NoInputFiles
			| Self::OutputCollision { .. } => ErrorKind::Configuration,
		}
	}
}

/// 1-based occurrence count of a marker within a source, rendered as
/// `1st occurrence`, `2nd occurrence`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordinal(pub usize);

impl fmt::Display for Ordinal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let n = self.0;
		let suffix = match (n % 10, n % 100) {
			(1, 11) | (2, 12) | (3, 13) => "th",
			(1, _) => "st",
			(2, _) => "nd",
			(3, _) => "rd",
			_ => "th",
		};
		write!(f, "{n}{suffix} occurrence")
	}
}

/// The sequence of files that led to a resolution failure, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeChain(pub Vec<PathBuf>);

impl fmt::Display for IncludeChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (index, path) in self.0.iter().enumerate() {
			if index > 0 {
				f.write_str(" -> ")?;
			}
			write!(f, "{}", path.display())?;
		}
		Ok(())
	}
}

pub type TexamResult<T> = Result<T, TexamError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
