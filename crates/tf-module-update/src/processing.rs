//! processing of files on disk
use crate::hcl_documents::{self, HclDocument};
use crate::results::{Record, Results};
use crate::rewrite::{BlockOutcome, Change, Rewriter};
use crate::strategy::Strategy;
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Write changed files back. Without it changes are only reported.
    pub write: bool,
}

/// What happened to a single file
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub changed: bool,
    pub written: bool,
    pub changes: Vec<Change>,
    pub errors: Vec<String>,
}

#[derive(derive_new::new)]
pub struct Manager<'s> {
    config: Config,
    strategy: &'s dyn Strategy,
}

impl<'s> Manager<'s> {
    /// Processes all `*.tf` files found in `paths`, in traversal order
    pub fn process_paths(&self, paths: &[PathBuf], results: &mut Results) -> Vec<FileOutcome> {
        let (files, errors) = hcl_documents::discover(paths);
        for error in errors {
            results.append(anyhow::Error::from(error));
        }

        tracing::debug!(count = files.len(), "files selected");

        files
            .iter()
            .map(|file_path| {
                let (outcome, file_results) = self.process_file(file_path);
                results.append(file_results);
                outcome
            })
            .collect()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn process_file(&self, file_path: &Path) -> (FileOutcome, Results) {
        let mut results = Results::default();
        let mut outcome = FileOutcome {
            path: file_path.to_path_buf(),
            ..Default::default()
        };

        let document = match HclDocument::load_file(file_path)
            .with_context(|| format!("In file {}", file_path.display()))
        {
            Ok(document) => document,
            Err(err) => {
                outcome.errors.push(format!("{err:#}"));
                results.append(err);
                return (outcome, results);
            }
        };

        let rewrite = Rewriter::new(self.strategy).rewrite(&document);

        if rewrite.is_changed() {
            results.append(Record::info(format!("In file {}:", file_path.display())));
        }

        for block in &rewrite.outcomes {
            match block {
                BlockOutcome::Changed(change) if !rewrite.is_changed() => {
                    results.append(Record::debug(format!("change not applied: {change}")));
                }
                BlockOutcome::Changed(change) => {
                    results.append(Record::info(format!("  - {}", change.old)));
                    results.append(Record::info(format!("  + {}", change.new)));
                    outcome.changes.push(change.clone());
                }
                BlockOutcome::Skipped { source, .. } => {
                    results.append(Record::debug(format!(
                        "skipping source due to updater decision: {source}"
                    )));
                }
                BlockOutcome::Unchanged { source, .. } => {
                    results.append(Record::trace(format!("source stays the same: {source}")));
                }
                BlockOutcome::Failed(error) => {
                    let err = anyhow::Error::new(error.clone())
                        .context(format!("In file {}", file_path.display()));
                    outcome.errors.push(format!("{err:#}"));
                    results.append(err);
                }
            }
        }

        outcome.changed = rewrite.is_changed();

        let content = match rewrite
            .into_content()
            .with_context(|| format!("In file {}", file_path.display()))
        {
            Ok(Some(content)) => content,
            Ok(None) => return (outcome, results),
            Err(err) => {
                outcome.errors.push(format!("{err:#}"));
                results.append(err);
                return (outcome, results);
            }
        };

        if self.config.write {
            let target = document.path().unwrap_or(file_path);
            match std::fs::write(target, content)
                .with_context(|| format!("Unable to write {}", target.display()))
            {
                Ok(()) => {
                    tracing::info!(path=%target.display(), "file written");
                    outcome.written = true;
                }
                Err(err) => {
                    outcome.errors.push(format!("{err:#}"));
                    results.append(err);
                }
            }
        }

        (outcome, results)
    }
}
