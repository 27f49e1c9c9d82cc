use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::Exam;
use crate::MarkerConfig;
use crate::Randomizer;
use crate::ShuffleOptions;
use crate::SourceLoader;
use crate::TexamError;
use crate::TexamResult;
use crate::load_documents;
use crate::load_master;

/// How the input paths are composed into an exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
	/// Every path is an independent exam file.
	#[default]
	Independent,
	/// A single master file whose inclusion directives are resolved first.
	Master,
}

/// Everything needed to turn an exam into a set of variants.
#[derive(Debug, Clone)]
pub struct VariantPlan {
	/// Number of variants to produce.
	pub versions: usize,
	/// Base seed. Variant `k` uses `seed + k`.
	pub seed: Option<u64>,
	pub options: ShuffleOptions,
	pub output_dir: PathBuf,
	/// Inserted between the file stem and the variant tag.
	pub tag_prefix: String,
}

/// The result of [`generate_variants`].
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
	/// Base seed that reproduces every variant.
	pub seed: u64,
	pub variants: Vec<Variant>,
}

/// One randomized copy of the exam.
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
	pub index: usize,
	/// `a`, `b`, ... or decimal indices when there are more than 26 variants.
	pub tag: String,
	pub seed: u64,
	pub files: Vec<VariantFile>,
}

/// A rendered output unit: one per input file, or the assembled master.
#[derive(Debug, Clone, Serialize)]
pub struct VariantFile {
	pub source: PathBuf,
	pub output: PathBuf,
	pub problems: usize,
	#[serde(skip)]
	pub content: String,
}

/// Load the exam described by `inputs` according to `mode`.
pub fn load_exam(
	mode: InputMode,
	inputs: &[PathBuf],
	loader: &dyn SourceLoader,
	markers: &MarkerConfig,
) -> TexamResult<Exam> {
	markers.validate()?;

	match mode {
		InputMode::Independent => load_documents(inputs, loader, markers),
		InputMode::Master => {
			let [master] = inputs else {
				return Err(if inputs.is_empty() {
					TexamError::NoInputFiles
				} else {
					TexamError::MasterNeedsSingleFile(inputs.len())
				});
			};
			load_master(master, loader, markers)
		}
	}
}

/// Produce `plan.versions` shuffled copies of `exam`. Options are validated
/// before any shuffling happens; nothing is written.
pub fn generate_variants(exam: &Exam, plan: &VariantPlan) -> TexamResult<Generation> {
	if plan.versions == 0 {
		return Err(TexamError::NoVersions);
	}
	plan.options.validate(exam.len())?;
	check_output_collisions(exam, plan)?;

	let seed = plan.seed.unwrap_or_else(rand::random);
	tracing::info!(seed, versions = plan.versions, "generating variants");

	let mut variants = Vec::with_capacity(plan.versions);
	for index in 0..plan.versions {
		let mut randomizer = Randomizer::new(Some(seed.wrapping_add(index as u64)));
		let shuffled = randomizer.shuffle(exam, &plan.options)?;
		let tag = variant_tag(index, plan.versions);

		let files = shuffled
			.iter()
			.map(|document| {
				VariantFile {
					source: document.path.clone(),
					output: output_path(&document.path, &plan.output_dir, &plan.tag_prefix, &tag),
					problems: document.problem_count(),
					content: document.render(),
				}
			})
			.collect();

		variants.push(Variant {
			index,
			tag,
			seed: randomizer.seed(),
			files,
		});
	}

	Ok(Generation { seed, variants })
}

/// Two inputs sharing a file name would write the same variant paths.
fn check_output_collisions(exam: &Exam, plan: &VariantPlan) -> TexamResult<()> {
	let tag = variant_tag(0, plan.versions);
	let mut seen: HashMap<PathBuf, &Path> = HashMap::new();

	for document in exam.iter() {
		let output = output_path(&document.path, &plan.output_dir, &plan.tag_prefix, &tag);
		if let Some(first) = seen.insert(output.clone(), &document.path) {
			return Err(TexamError::OutputCollision {
				first: first.to_path_buf(),
				second: document.path.clone(),
				output,
			});
		}
	}

	Ok(())
}

/// Write every rendered file to disk.
pub fn write_variants(generation: &Generation) -> TexamResult<()> {
	for file in generation.variants.iter().flat_map(|variant| &variant.files) {
		if let Some(parent) = file.output.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(|source| {
				TexamError::WriteFile {
					path: parent.to_path_buf(),
					source,
				}
			})?;
		}
		std::fs::write(&file.output, &file.content).map_err(|source| {
			TexamError::WriteFile {
				path: file.output.clone(),
				source,
			}
		})?;
	}
	Ok(())
}

/// Letters for up to 26 variants, decimal indices beyond that.
pub fn variant_tag(index: usize, versions: usize) -> String {
	if versions <= 26 {
		char::from(b'a' + index as u8).to_string()
	} else {
		index.to_string()
	}
}

/// `<dir>/<stem><prefix><tag><.ext>` for `source`.
pub fn output_path(source: &Path, dir: &Path, prefix: &str, tag: &str) -> PathBuf {
	let stem = source
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default();
	let name = match source.extension() {
		Some(ext) => format!("{stem}{prefix}{tag}.{}", ext.to_string_lossy()),
		None => format!("{stem}{prefix}{tag}"),
	};
	dir.join(name)
}
