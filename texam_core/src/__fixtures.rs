use crate::ChoiceItem;
use crate::Document;
use crate::Exam;
use crate::MarkerConfig;
use crate::Span;
use crate::TexamResult;
use crate::parse;

/// A complete exam with instructions, two multiple-choice problems and one
/// free-response problem.
pub const SAMPLE_EXAM: &str = r"\documentclass{article}
\begin{document}
% Instructions stay first
Answer every question.

\begin{problem}[2]
What is 1 + 1?
\begin{mchoice}
  \item 1
  \xtem 2
  \item 3
\end{mchoice}
\end{problem}

\begin{problem}[3]
Which city is the capital of France?
\begin{mchoice}
  \item Berlin
  \xtem[2pt] Paris
  \item Rome
  \item Madrid
\end{mchoice}
\end{problem}

\begin{problem}[5]
Explain entropy in one sentence.
\end{problem}

\end{document}
";

/// Two problem groups separated by a section heading.
pub const ANCHORED_EXAM: &str = r"\section{Part 1}
\begin{problem}P1\end{problem}
\begin{problem}P2\end{problem}
\section{Part 2}
\begin{problem}P3\end{problem}
% a comment between problems does not anchor
\begin{problem}P4\end{problem}
";

/// Three bare problems and nothing else.
pub const THREE_PROBLEMS: &str = r"\begin{problem}A\end{problem}
\begin{problem}B\end{problem}
\begin{problem}C\end{problem}
";

/// One problem whose choice list holds items A (plain), B (correct) and C
/// (plain).
pub const ABC_CHOICES: &str = r"\begin{problem}
Pick one.
\begin{mchoice}
\item A
\xtem B
\item C
\end{mchoice}
\end{problem}
";

pub fn markers() -> MarkerConfig {
	MarkerConfig::default()
}

pub fn parse_default(content: &str) -> TexamResult<Document> {
	parse("exam.tex", content, &markers())
}

pub fn exam_of(files: &[(&str, &str)]) -> TexamResult<Exam> {
	let documents = files
		.iter()
		.map(|(path, content)| parse(path, content, &markers()))
		.collect::<TexamResult<Vec<_>>>()?;
	Ok(Exam(documents))
}

/// The rendered text of every problem, in order.
pub fn problem_texts(document: &Document) -> Vec<String> {
	document.problems().map(crate::ProblemBlock::render).collect()
}

/// The opaque spans of a document, in order.
pub fn opaque_texts(document: &Document) -> Vec<String> {
	document
		.spans
		.iter()
		.filter_map(|span| {
			match span {
				Span::Opaque(text) => Some(text.clone()),
				Span::Problem(_) => None,
			}
		})
		.collect()
}

/// The items of the first choice list in `document`.
pub fn first_items(document: &Document) -> Vec<ChoiceItem> {
	document
		.problems()
		.find_map(|problem| problem.choices.as_ref())
		.map(|choices| choices.items.clone())
		.unwrap_or_default()
}

/// `(body, correct)` pairs, sorted, for multiset comparison.
pub fn item_multiset(items: &[ChoiceItem]) -> Vec<(String, bool)> {
	let mut pairs: Vec<_> = items
		.iter()
		.map(|item| (item.body.clone(), item.is_correct()))
		.collect();
	pairs.sort();
	pairs
}
