use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const EXAM: &str = r"\documentclass{article}
\begin{document}
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
  \xtem Paris
  \item Rome
\end{mchoice}
\end{problem}

\begin{problem}[1]
Name a prime number.
\end{problem}
\end{document}
";

/// A `texam` command running in `dir` with colors disabled.
pub fn texam_cmd(dir: &Path) -> Command {
	let mut cmd = Command::new(get_cargo_bin("texam"));
	cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}
