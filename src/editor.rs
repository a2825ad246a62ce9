//! Review loop: the draft goes to the user's editor as JSON and comes back
//! as a validated [`BitDraft`].
use std::{
    fs::read_to_string,
    io::{BufRead, Write},
    path::PathBuf,
};

use log::{debug, info, warn};
use tempfile::{Builder, NamedTempFile};

use crate::{confirm, run_command, BitDraft, BitError, EditOutcome, Result};

/// Everything an edit session needs, fixed up front
#[derive(Debug, Clone)]
pub struct EditSession {
    /// Editor command line; the temp file path is appended
    editor_cmd: String,

    /// Directory for temp files, platform default when `None`
    temp_dir: Option<PathBuf>,
}

impl EditSession {
    pub fn new(editor_cmd: impl Into<String>, temp_dir: Option<PathBuf>) -> Self {
        Self {
            editor_cmd: editor_cmd.into(),
            temp_dir,
        }
    }

    /// Lets the user edit `original` until it parses or they give up.
    ///
    /// Every attempt starts again from `original`, never from a broken edit.
    /// Each temp file is removed before the next attempt or the return,
    /// including when the editor itself fails.
    pub fn run<R: BufRead, W: Write>(
        &self,
        original: &BitDraft,
        input: &mut R,
        output: &mut W,
    ) -> Result<EditOutcome> {
        let json = original.to_pretty_json()?;

        loop {
            let parsed = {
                let temp_file = self.write_temp_file(&json)?;

                info!("Opening editor on {}", temp_file.path().display());
                self.launch_editor(&temp_file)?;

                let edited = read_to_string(temp_file.path())?;
                BitDraft::from_json(&edited)
                // temp_file dropped and deleted here
            };

            match parsed {
                Ok(draft) => {
                    debug!("Edited bit parsed: {}", draft.title);
                    return Ok(EditOutcome::Confirmed(draft));
                }
                Err(e) => {
                    warn!("Edited bit rejected: {}", e);
                    writeln!(output, "Invalid JSON: {}", e)?;
                    if !confirm(input, output, "Re-edit?")? {
                        return Ok(EditOutcome::Aborted);
                    }
                }
            }
        }
    }

    fn write_temp_file(&self, json: &str) -> Result<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix("bit_").suffix(".json");

        let mut temp_file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;

        Ok(temp_file)
    }

    fn launch_editor(&self, temp_file: &NamedTempFile) -> Result<()> {
        run_command(&self.editor_cmd, Some(temp_file.path().as_os_str()), None).map_err(|e| {
            BitError::EditorError {
                message: format!("Editor `{}` failed: {}", self.editor_cmd, e),
            }
        })
    }
}
