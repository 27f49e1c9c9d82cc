use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use texam_cli::OutputFormat;
use texam_cli::TexamCli;
use texam_core::FsLoader;
use texam_core::Generation;
use texam_core::InputMode;
use texam_core::ShuffleOptions;
use texam_core::TexamConfig;
use texam_core::VariantPlan;
use texam_core::generate_variants;
use texam_core::load_exam;
use texam_core::write_variants;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TexamCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(args.verbose);

	if let Err(e) = run(&args) {
		match e.downcast::<texam_core::TexamError>() {
			Ok(texam_err) => {
				let report: miette::Report = (*texam_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` wins over the `--verbose` default.
fn init_logging(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(color_enabled())
		.with_target(false)
		.init();
}

fn current_dir() -> PathBuf {
	std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn load_config(args: &TexamCli) -> Result<TexamConfig, Box<dyn std::error::Error>> {
	let config = match &args.config {
		Some(path) => TexamConfig::load_file(path)?,
		None => TexamConfig::load(&current_dir())?.unwrap_or_default(),
	};
	Ok(config)
}

/// Command-line flags take precedence over the config file.
fn variant_plan(args: &TexamCli, config: &TexamConfig) -> VariantPlan {
	let mut options = ShuffleOptions::from(&config.shuffle);
	if args.fix_problems {
		options.problems = false;
	}
	if args.fix_choices {
		options.choices = false;
	}
	if let Some(scope) = args.scope {
		options.scope = scope.into();
	}

	VariantPlan {
		versions: args.versions.unwrap_or(config.output.versions),
		seed: args.seed,
		options,
		output_dir: args
			.output_dir
			.clone()
			.or_else(|| config.output.directory.clone())
			.unwrap_or_else(current_dir),
		tag_prefix: config.output.tag_prefix.clone(),
	}
}

fn run(args: &TexamCli) -> Result<(), Box<dyn std::error::Error>> {
	let config = load_config(args)?;
	let mode = if args.master {
		InputMode::Master
	} else {
		InputMode::Independent
	};

	let exam = load_exam(mode, &args.files, &FsLoader, &config.markers)?;
	tracing::debug!(
		files = exam.len(),
		problems = exam.problem_count(),
		"loaded exam"
	);

	let plan = variant_plan(args, &config);
	let generation = generate_variants(&exam, &plan)?;

	if !args.dry_run {
		write_variants(&generation)?;
	}

	match args.format {
		OutputFormat::Json => print_json(&generation, args.dry_run)?,
		OutputFormat::Text => print_summary(&generation, args.dry_run, args.verbose),
	}

	Ok(())
}

fn print_json(generation: &Generation, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let output = serde_json::json!({
		"ok": true,
		"dryRun": dry_run,
		"seed": generation.seed,
		"variants": generation.variants,
	});
	println!("{}", serde_json::to_string(&output)?);
	Ok(())
}

fn print_summary(generation: &Generation, dry_run: bool, verbose: bool) {
	let root = current_dir();
	let count = generation.variants.len();

	if dry_run {
		println!("Dry run: would write {count} variant(s):");
	} else {
		println!("{} {count} variant(s):", colored!("Generated", green));
	}

	for variant in &generation.variants {
		for file in &variant.files {
			let output = make_relative(&file.output, &root);
			if verbose {
				println!(
					"  {} {output} (seed {}, {} problem(s))",
					colored!(variant.tag, bold),
					variant.seed,
					file.problems
				);
			} else {
				println!("  {} {output}", colored!(variant.tag, bold));
			}
		}
	}

	println!("Seed: {}", generation.seed);
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
