//! `texam_core` is the engine behind [texam](../texam_cli), a tool that
//! generates randomized variants of LaTeX exams. Problem order and the order
//! of answer choices change between variants, while every other byte of the
//! document (point values, formatting, the marker that flags the correct
//! answer) is carried along untouched.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Exam file(s)
//!   → Assembler (master mode: resolves `\input{}` directives into one source)
//!   → Lexer (logos scan for `\begin{}`/`\end{}` and control words)
//!   → Segmenter (builds the span tree: opaque text, problems, choice lists, items)
//!   → Randomizer (seeded Fisher–Yates over problem pools and choice lists)
//!   → Renderer (concatenates the permuted tree back into text)
//! ```
//!
//! ## Markup
//!
//! ```latex
//! \begin{problem}[2]
//!   What is the capital of France?
//!   \begin{mchoice}
//!     \item Berlin
//!     \xtem Paris
//!     \item Rome
//!   \end{mchoice}
//! \end{problem}
//! ```
//!
//! `\xtem` marks the correct choice. The marker names are configurable with
//! a `texam.toml` file, see [`TexamConfig`].
//!
//! ## Quick Start
//!
//! ```rust
//! use texam_core::MarkerConfig;
//! use texam_core::ShuffleOptions;
//! use texam_core::parse;
//! use texam_core::shuffle_exam;
//! use texam_core::Exam;
//!
//! let text = "\\begin{problem}A\\end{problem}\n\\begin{problem}B\\end{problem}\n";
//! let document = parse("exam.tex", text, &MarkerConfig::default()).unwrap();
//! let exam = Exam(vec![document]);
//!
//! let (shuffled, seed) = shuffle_exam(&exam, &ShuffleOptions::default(), Some(7)).unwrap();
//! assert_eq!(seed, 7);
//! assert_eq!(shuffled[0].render().len(), text.len());
//! ```

pub use assembler::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use parser::*;
pub use render::*;
pub use shuffle::*;
pub use source::*;

mod assembler;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod parser;
mod render;
mod shuffle;
mod source;
pub(crate) mod tokens;

#[cfg(test)]
mod __fixtures;
