use std::ops::Range;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::Exam;
use crate::ProblemBlock;
use crate::ShuffleConfig;
use crate::ShuffleScope;
use crate::Span;
use crate::TexamError;
use crate::TexamResult;

/// What a single randomization pass permutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleOptions {
	/// Shuffle the order of problem blocks.
	pub problems: bool,
	/// Shuffle the order of items inside each choice list.
	pub choices: bool,
	pub scope: ShuffleScope,
}

impl Default for ShuffleOptions {
	fn default() -> Self {
		Self {
			problems: true,
			choices: true,
			scope: ShuffleScope::PerFile,
		}
	}
}

impl From<&ShuffleConfig> for ShuffleOptions {
	fn from(config: &ShuffleConfig) -> Self {
		Self {
			problems: config.problems,
			choices: config.choices,
			scope: config.scope,
		}
	}
}

impl ShuffleOptions {
	/// Reject option combinations that cannot produce a meaningful shuffle
	/// of `file_count` files.
	pub fn validate(&self, file_count: usize) -> TexamResult<()> {
		if !self.problems && !self.choices {
			return Err(TexamError::NothingToShuffle);
		}

		if self.problems && self.scope == ShuffleScope::AcrossFiles && file_count < 2 {
			return Err(TexamError::CrossFileScopeNeedsFiles(file_count));
		}

		Ok(())
	}
}

/// A seeded source of permutations. The same seed applied to the same exam
/// always yields the same result.
#[derive(Debug, Clone)]
pub struct Randomizer {
	seed: u64,
	rng: StdRng,
}

impl Randomizer {
	/// Create a randomizer from `seed`, or from a freshly drawn seed when
	/// `None`.
	pub fn new(seed: Option<u64>) -> Self {
		let seed = seed.unwrap_or_else(rand::random);
		Self {
			seed,
			rng: StdRng::seed_from_u64(seed),
		}
	}

	/// The seed this randomizer was created from.
	pub fn seed(&self) -> u64 {
		self.seed
	}

	/// Return a permuted copy of `exam`. Choice lists are shuffled first, in
	/// document order, then problem pools.
	pub fn shuffle(&mut self, exam: &Exam, options: &ShuffleOptions) -> TexamResult<Exam> {
		options.validate(exam.len())?;

		let mut shuffled = exam.clone();
		if options.choices {
			self.shuffle_choices(&mut shuffled);
		}
		if options.problems {
			self.shuffle_problems(&mut shuffled, options.scope);
		}

		Ok(shuffled)
	}

	fn shuffle_choices(&mut self, exam: &mut Exam) {
		for document in exam.iter_mut() {
			for span in &mut document.spans {
				if let Span::Problem(ProblemBlock {
					choices: Some(choices),
					..
				}) = span
				{
					choices.items.shuffle(&mut self.rng);
				}
			}
		}
	}

	fn shuffle_problems(&mut self, exam: &mut Exam, scope: ShuffleScope) {
		let (slots, pools) = problem_pools(exam, scope);

		for pool in pools {
			let slots = &slots[pool];
			let mut blocks: Vec<ProblemBlock> = slots
				.iter()
				.map(|&(document, span)| take_problem(exam, document, span))
				.collect();

			blocks.shuffle(&mut self.rng);

			for (&(document, span), block) in slots.iter().zip(blocks) {
				exam[document].spans[span] = Span::Problem(block);
			}
		}

		tracing::debug!(seed = self.seed, problems = slots.len(), "shuffled problems");
	}
}

/// Shuffle `exam` once with a randomizer built from `seed`.
pub fn shuffle_exam(exam: &Exam, options: &ShuffleOptions, seed: Option<u64>) -> TexamResult<(Exam, u64)> {
	let mut randomizer = Randomizer::new(seed);
	let shuffled = randomizer.shuffle(exam, options)?;
	Ok((shuffled, randomizer.seed()))
}

/// Position of a problem block: `(document index, span index)`.
pub type Slot = (usize, usize);

/// Collect every problem slot in order and split them into pools. A pool is
/// a maximal run of slots not separated by an anchor, or by a file boundary
/// when `scope` is [`ShuffleScope::PerFile`].
pub fn problem_pools(exam: &Exam, scope: ShuffleScope) -> (Vec<Slot>, Vec<Range<usize>>) {
	let mut slots = Vec::new();
	let mut pools = Vec::new();
	let mut pool_start = 0;

	let mut close_pool = |slots: &Vec<Slot>, pool_start: &mut usize| {
		if slots.len() > *pool_start {
			pools.push(*pool_start..slots.len());
		}
		*pool_start = slots.len();
	};

	for (document_index, document) in exam.iter().enumerate() {
		if scope == ShuffleScope::PerFile {
			close_pool(&slots, &mut pool_start);
		}

		let mut seen_problem = false;
		let mut pending_anchor = false;
		for (span_index, span) in document.spans.iter().enumerate() {
			match span {
				Span::Problem(_) => {
					if pending_anchor {
						close_pool(&slots, &mut pool_start);
						pending_anchor = false;
					}
					slots.push((document_index, span_index));
					seen_problem = true;
				}
				Span::Opaque(text) => {
					if seen_problem && is_anchor(text) {
						pending_anchor = true;
					}
				}
			}
		}
	}
	close_pool(&slots, &mut pool_start);

	(slots, pools)
}

/// An opaque span anchors its position when it holds anything besides
/// whitespace and `%` comment lines.
pub fn is_anchor(text: &str) -> bool {
	text.lines().any(|line| {
		let line = line.trim();
		!line.is_empty() && !line.starts_with('%')
	})
}

fn take_problem(exam: &mut Exam, document: usize, span: usize) -> ProblemBlock {
	match &mut exam[document].spans[span] {
		Span::Problem(problem) => std::mem::take(problem),
		Span::Opaque(_) => ProblemBlock::default(),
	}
}
