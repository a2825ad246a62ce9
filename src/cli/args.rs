use std::path::PathBuf;

use clap::Parser;

use crate::{Config, Result};

/// Main CLI application arguments
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Turn freeform text into a link-blog bit, review it in your editor, and publish it"
)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Site root; the bits store and rebuild command are relative to it
    #[clap(short, long, value_parser)]
    pub root: Option<PathBuf>,

    /// Bits store, relative to the site root
    #[clap(long, value_parser)]
    pub bits_file: Option<PathBuf>,

    /// Editor command (defaults to $EDITOR, then $VISUAL)
    #[clap(short, long)]
    pub editor: Option<String>,

    /// Model used to structure the input
    #[clap(short, long)]
    pub model: Option<String>,

    /// Skip the site rebuild after adding the bit
    #[clap(long)]
    pub no_rebuild: bool,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the effective config: file (or defaults), then environment,
    /// then flags
    pub fn load_config<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env(&lookup);

        if let Some(root) = &self.root {
            config.site_root = root.clone();
        }
        if let Some(bits_file) = &self.bits_file {
            config.bits_file = bits_file.clone();
        }
        if let Some(editor) = &self.editor {
            config.editor_command = Some(editor.clone());
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if self.no_rebuild {
            config.rebuild_command = None;
        }

        config.resolve_editor(&lookup);
        Ok(config)
    }
}
