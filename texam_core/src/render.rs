use crate::ChoiceList;
use crate::Document;
use crate::ProblemBlock;
use crate::Span;

/// Serialize a document by concatenating its spans in order. Output equals
/// the parsed input except for the order of problems and choice items.
pub fn render_document(document: &Document) -> String {
	let mut out = String::new();
	for span in &document.spans {
		match span {
			Span::Opaque(text) => out.push_str(text),
			Span::Problem(problem) => write_problem(&mut out, problem),
		}
	}
	out
}

fn write_problem(out: &mut String, problem: &ProblemBlock) {
	out.push_str(&problem.preamble);
	if let Some(choices) = &problem.choices {
		write_choices(out, choices);
	}
	out.push_str(&problem.trailing);
}

fn write_choices(out: &mut String, choices: &ChoiceList) {
	out.push_str(&choices.opening);
	for item in &choices.items {
		out.push_str(&item.marker);
		out.push_str(&item.body);
	}
	out.push_str(&choices.closing);
}

impl Document {
	/// Shorthand for [`render_document`].
	pub fn render(&self) -> String {
		render_document(self)
	}
}

impl ProblemBlock {
	/// The block's text as it would appear in the output.
	pub fn render(&self) -> String {
		let mut out = String::new();
		write_problem(&mut out, self);
		out
	}
}
