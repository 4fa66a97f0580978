//! JSON-lines sink for training examples.
//!
//! One line per example: `{"state":[...],"policy":[...],"value":v}`.

use anyhow::{Context, Result};
use engine_core::GameState;
use mcts::TrainingExample;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Write `examples` to `path`, replacing any existing file. Missing parent
/// directories are created. Returns the number of lines written.
pub fn write_examples<'a, S, I>(path: &Path, examples: I) -> Result<usize>
where
    S: GameState,
    I: IntoIterator<Item = &'a TrainingExample<S>>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;

    for example in examples {
        serde_json::to_writer(&mut writer, &example.encode())?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), written, "training examples flushed");
    Ok(written)
}
