//! Line-mode presentation of a release run.
//!
//! Prints each rendered step as a numbered block, shows the action's output
//! underneath, and waits for Enter before the next step. Typing `q` at the
//! prompt (or closing stdin) stops the run.

use release_runner::actions::ActionOutput;
use release_runner::engine::{Advance, Presenter, RenderedStep};
use release_runner::error::ReleaseError;
use std::io::{BufRead, Write};

const INDENT: &str = "   ";
const PROMPT: &str = "Press enter to continue...";

pub struct LinePresenter<R, W> {
    input: R,
    output: W,
    auto_confirm: bool,
}

impl<R: BufRead, W: Write> LinePresenter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            auto_confirm: false,
        }
    }

    /// Pass every confirmation gate without reading input.
    pub fn auto_confirm(mut self, yes: bool) -> Self {
        self.auto_confirm = yes;
        self
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self
            .output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
        {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    fn emit_indented(&mut self, text: &str) {
        let indented = indent(text);
        self.emit(&indented);
        if !indented.ends_with('\n') {
            self.emit("\n");
        }
    }
}

/// Prefix every non-blank line with the step indent.
fn indent(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect()
}

impl<R: BufRead, W: Write> Presenter for LinePresenter<R, W> {
    fn step_rendered(&mut self, step: &RenderedStep) {
        self.emit(&format!("{}. {}\n", step.number, step.title));

        if let Some(description) = &step.description {
            self.emit_indented(description);
        }
        for item in &step.checklist {
            self.emit(&format!("{}[ ] {}\n", INDENT, item));
        }
        if let Some(url) = &step.open_url {
            self.emit(&format!("{}Open: {}\n", INDENT, url));
        }
    }

    fn action_finished(&mut self, _step: &RenderedStep, output: &ActionOutput) {
        match output {
            ActionOutput::Nothing => {}
            ActionOutput::Shortlog(text) => {
                if text.is_empty() {
                    self.emit(&format!("{}(no commits)\n", INDENT));
                } else {
                    self.emit_indented(text);
                }
            }
            ActionOutput::Command(result) => {
                if !result.stdout.is_empty() {
                    self.emit_indented(&result.stdout);
                }
                if !result.success() {
                    if !result.stderr.is_empty() {
                        self.emit_indented(&result.stderr);
                    }
                    let status = result
                        .exit_code()
                        .map(|code| code.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    self.emit(&format!("{}(command exited with {})\n", INDENT, status));
                }
            }
        }
    }

    fn step_failed(&mut self, step: &RenderedStep, error: &ReleaseError) {
        self.emit(&format!("❌ Step {} failed: {}\n", step.number, error));
    }

    fn await_advance(&mut self, _step: &RenderedStep) -> Advance {
        if self.auto_confirm {
            self.emit("✅\n\n");
            return Advance::Continue;
        }

        self.emit(PROMPT);
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                self.emit("\n");
                Advance::Abort
            }
            Ok(_) if line.trim().eq_ignore_ascii_case("q") => Advance::Abort,
            Ok(_) => {
                self.emit("✅\n\n");
                Advance::Continue
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                Advance::Abort
            }
        }
    }
}
