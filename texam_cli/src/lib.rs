use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use texam_core::ShuffleScope;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate randomized variants of LaTeX exams.",
	long_about = "texam shuffles the order of problems and of multiple-choice answers in LaTeX \
	              exams and writes one file per variant.\n\nProblems are marked with \
	              `\\begin{problem}...\\end{problem}`, choice lists with \
	              `\\begin{mchoice}...\\end{mchoice}`, plain choices with `\\item` and the \
	              correct choice with `\\xtem`. Everything else is copied verbatim.\n\nQuick \
	              start:\n  texam exam.tex                 Write exam_ver_a.tex .. \
	              exam_ver_d.tex\n  texam -n 2 -s 42 exam.tex      Two reproducible variants\n  \
	              texam -m main.tex              Resolve \\input{} first, then shuffle"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct TexamCli {
	/// Exam files to randomize. In master mode, the single master file.
	#[arg(required = true)]
	pub files: Vec<PathBuf>,

	/// Treat the single input as a master file and resolve its `\input{}`
	/// directives before shuffling.
	#[arg(long, short, default_value_t = false)]
	pub master: bool,

	/// Number of variants to generate. Defaults to the config value, or 4.
	#[arg(long, short = 'n')]
	pub versions: Option<usize>,

	/// Directory to write the variants to. Defaults to the config value, or
	/// the current directory.
	#[arg(long, short)]
	pub output_dir: Option<PathBuf>,

	/// Base seed. Variant `k` is shuffled with `seed + k`, so the same seed
	/// reproduces the same variants.
	#[arg(long, short)]
	pub seed: Option<u64>,

	/// Keep problems in their original order.
	#[arg(long = "fix-problems", short = 'q', default_value_t = false)]
	pub fix_problems: bool,

	/// Keep answer choices in their original order.
	#[arg(long = "fix-choices", short = 'a', default_value_t = false)]
	pub fix_choices: bool,

	/// How far problems may move. `across-files` pools the problems of all
	/// input files.
	#[arg(long, value_enum)]
	pub scope: Option<ScopeArg>,

	/// Explicit config file. By default `texam.toml`, `.texam.toml` or
	/// `.config/texam.toml` is looked up in the current directory.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Report what would be written without writing anything.
	#[arg(long, default_value_t = false)]
	pub dry_run: bool,

	/// Output format for the summary printed on success.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Enable verbose output and debug logging.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
	/// Problems only move within their own file.
	PerFile,
	/// Problems may move between files. Each file keeps its problem count.
	AcrossFiles,
}

impl From<ScopeArg> for ShuffleScope {
	fn from(scope: ScopeArg) -> Self {
		match scope {
			ScopeArg::PerFile => ShuffleScope::PerFile,
			ScopeArg::AcrossFiles => ShuffleScope::AcrossFiles,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Includes the base seed and
	/// every variant's seed and output files.
	Json,
}
