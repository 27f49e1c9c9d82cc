use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::TexamError;
use crate::TexamResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["texam.toml", ".texam.toml", ".config/texam.toml"];

/// Default number of variants generated per run.
pub const DEFAULT_VERSIONS: usize = 4;

/// Configuration loaded from a `texam.toml` file.
///
/// ```toml
/// [markers]
/// problem = "problem"
/// choices = "mchoice"
/// item = "item"
/// correct_item = "xtem"
/// include = ["input"]
///
/// [shuffle]
/// problems = true
/// choices = true
/// scope = "per-file"
///
/// [output]
/// versions = 4
/// directory = "versions"
/// tag_prefix = "_ver_"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TexamConfig {
	#[serde(default)]
	pub markers: MarkerConfig,
	#[serde(default)]
	pub shuffle: ShuffleConfig,
	#[serde(default)]
	pub output: OutputConfig,
}

/// The macro vocabulary recognized by the segmenter and the assembler.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerConfig {
	/// Environment name of a problem block.
	pub problem: String,
	/// Environment name of the multiple-choice list inside a problem.
	pub choices: String,
	/// Control word that starts a plain answer choice.
	pub item: String,
	/// Control word that starts a correct answer choice.
	pub correct_item: String,
	/// Control words treated as inclusion directives in master mode.
	pub include: Vec<String>,
}

impl Default for MarkerConfig {
	fn default() -> Self {
		Self {
			problem: "problem".to_string(),
			choices: "mchoice".to_string(),
			item: "item".to_string(),
			correct_item: "xtem".to_string(),
			include: vec!["input".to_string()],
		}
	}
}

impl MarkerConfig {
	/// Reject vocabularies the segmenter cannot disambiguate.
	pub fn validate(&self) -> TexamResult<()> {
		let names = [
			("problem", &self.problem),
			("choices", &self.choices),
			("item", &self.item),
			("correct_item", &self.correct_item),
		];
		for (key, value) in names {
			if value.trim().is_empty() || value.contains(['{', '}', '\\']) {
				return Err(TexamError::InvalidMarkers(format!(
					"`{key}` must be a bare name, got `{value}`"
				)));
			}
		}

		if self.problem == self.choices {
			return Err(TexamError::InvalidMarkers(format!(
				"`problem` and `choices` are both `{}`",
				self.problem
			)));
		}

		if self.item == self.correct_item {
			return Err(TexamError::InvalidMarkers(format!(
				"`item` and `correct_item` are both `{}`",
				self.item
			)));
		}

		if let Some(command) = self
			.include
			.iter()
			.find(|command| *command == &self.item || *command == &self.correct_item)
		{
			return Err(TexamError::InvalidMarkers(format!(
				"`{command}` cannot be both an item marker and an include command"
			)));
		}

		Ok(())
	}
}

/// Which blocks get shuffled and how far problems may travel.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ShuffleConfig {
	pub problems: bool,
	pub choices: bool,
	pub scope: ShuffleScope,
}

impl Default for ShuffleConfig {
	fn default() -> Self {
		Self {
			problems: true,
			choices: true,
			scope: ShuffleScope::default(),
		}
	}
}

/// How far a problem may move when problem order is shuffled.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ShuffleScope {
	/// Problems only trade places with problems of the same file.
	#[default]
	PerFile,
	/// Problems of all files form one pool. Each file keeps its original
	/// number of problems.
	AcrossFiles,
}

/// Where and how variant files are written.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
	pub versions: usize,
	/// Output directory, relative to the working directory.
	pub directory: Option<PathBuf>,
	/// Inserted between the file stem and the variant tag.
	pub tag_prefix: String,
}

impl Default for OutputConfig {
	fn default() -> Self {
		Self {
			versions: DEFAULT_VERSIONS,
			directory: None,
			tag_prefix: "_ver_".to_string(),
		}
	}
}

impl TexamConfig {
	/// Discover and load the config file in `root`. Returns `None` when no
	/// candidate exists.
	pub fn load(root: &Path) -> TexamResult<Option<TexamConfig>> {
		let Some(path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&path).map(Some)
	}

	/// Load a config file at an explicit path.
	pub fn load_file(path: &Path) -> TexamResult<TexamConfig> {
		let content = std::fs::read_to_string(path).map_err(|source| {
			TexamError::ReadFile {
				path: path.to_path_buf(),
				source,
			}
		})?;

		let config = Self::parse(&content).map_err(|reason| {
			TexamError::ConfigParse {
				path: path.to_path_buf(),
				reason,
			}
		})?;

		tracing::debug!(path = %path.display(), "loaded config");
		config.markers.validate()?;
		Ok(config)
	}

	/// Return the first existing config candidate in `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	fn parse(content: &str) -> Result<TexamConfig, String> {
		toml::from_str(content).map_err(|e| e.to_string())
	}
}
