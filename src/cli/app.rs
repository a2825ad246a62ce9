//! CLI module for the addbit application
//!
//! Drives one bit from typed text to the published site.
use std::io::{BufRead, Write};

use console::style;
use log::info;

use crate::{
    confirm, read_entry, run_command, BitDraft, BitError, BitStore, Config, EditOutcome,
    EditSession, Result, RunOutcome, Structurer,
};

/// CLI Application handler - runs the collect, structure, edit, store pipeline
pub struct App {
    /// Application configuration
    config: Config,

    /// Store the bit ends up in
    store: BitStore,
}

impl App {
    /// Create a new CLI application from a fully resolved config
    pub fn new(config: Config) -> Self {
        let store = BitStore::new(config.bits_path());
        Self { config, store }
    }

    /// Run the whole pipeline, prompting on `output` and reading answers
    /// from `input`
    pub async fn run<R: BufRead, W: Write>(
        &self,
        structurer: &Structurer,
        input: &mut R,
        output: &mut W,
    ) -> Result<RunOutcome> {
        let text = read_entry(input, output)?;
        if text.trim().is_empty() {
            writeln!(output, "No input provided, exiting.")?;
            return Ok(RunOutcome::NothingToDo);
        }

        writeln!(output, "\nAsking the model to structure your bit...")?;
        let draft = structurer.structure(&text).await?;

        self.review_and_publish(draft, input, output)
    }

    /// Everything after structuring: edit, confirm, store and rebuild
    pub fn review_and_publish<R: BufRead, W: Write>(
        &self,
        draft: BitDraft,
        input: &mut R,
        output: &mut W,
    ) -> Result<RunOutcome> {
        writeln!(output, "Opening editor...")?;
        let draft = match self.edit_session().run(&draft, input, output)? {
            EditOutcome::Confirmed(draft) => draft,
            EditOutcome::Aborted => {
                writeln!(output, "Aborted.")?;
                return Ok(RunOutcome::Aborted);
            }
        };

        writeln!(output, "\n{}", style("Final bit:").bold())?;
        writeln!(output, "{}", serde_json::to_string_pretty(&draft)?)?;
        writeln!(output)?;
        if !confirm(input, output, "Add this bit?")? {
            writeln!(output, "Aborted.")?;
            return Ok(RunOutcome::Aborted);
        }

        let bit = self.store.prepend(draft)?;
        writeln!(output, "Added bit: {}", style(bit.title()).green())?;

        self.rebuild(output)?;
        Ok(RunOutcome::Added(bit))
    }

    fn edit_session(&self) -> EditSession {
        // Resolved at startup; the fallback only matters for hand-built configs
        let editor = self
            .config
            .editor_command
            .clone()
            .unwrap_or_else(|| "vim".to_string());
        EditSession::new(editor, self.config.temp_dir.clone())
    }

    fn rebuild<W: Write>(&self, output: &mut W) -> Result<()> {
        let Some(command) = &self.config.rebuild_command else {
            info!("No rebuild command configured, skipping rebuild");
            return Ok(());
        };

        writeln!(output, "Rebuilding site...")?;
        output.flush()?;
        run_command(command, None, Some(&self.config.site_root)).map_err(|e| {
            BitError::RebuildFailed {
                message: format!("`{}` {}", command, e),
            }
        })?;
        writeln!(output, "Done!")?;
        Ok(())
    }
}
