//! rewriting module sources in place
//!
//! For every root `module` block with a `source` attribute the [Rewriter]
//! 1. takes the raw text of the quoted literal (anything that is not a plain literal, e.g.
//!    `"${var.base}/vpc.git"`, is left alone)
//! 2. parses it as a [ModuleSource]
//! 3. asks the [Strategy] whether it should change and what it becomes
//! 4. replaces the bytes between the quotes
//!
//! Edits are spliced into the original text, so every other byte of the document (comments,
//! alignment, unrelated attributes) stays as it was.
use crate::hcl_documents::HclDocument;
use crate::source::{ModuleSource, SourceError};
use crate::strategy::Strategy;
use hcl_edit::expr::Expression;
use hcl_edit::repr::Span;
use hcl_edit::structure::{Attribute, Block};
use std::ops::Range;

/// Attribute holding the module source
pub const SOURCE_ATTRIBUTE: &str = "source";

#[derive(derive_new::new)]
pub struct Rewriter<'s> {
    strategy: &'s dyn Strategy,
}

impl<'s> Rewriter<'s> {
    #[tracing::instrument(level = "debug", skip_all, fields(document = %document.display_name()))]
    pub fn rewrite(&self, document: &HclDocument) -> DocumentRewrite {
        let content = document.content();
        let mut outcomes = vec![];
        let mut edits: Vec<(Range<usize>, String)> = vec![];

        for block in document.module_blocks() {
            let module = module_name(block);

            let Some(attribute) = source_attribute(block) else {
                continue;
            };

            let Some(span) = literal_span(content, attribute) else {
                tracing::trace!(%module, "source is not a literal, skipping");
                continue;
            };

            let outcome = self.rewrite_literal(module, &content[span.clone()]);
            if let BlockOutcome::Changed(change) = &outcome {
                edits.push((span, change.new.clone()));
            }
            outcomes.push(outcome);
        }

        if edits.is_empty() {
            return DocumentRewrite {
                outcomes,
                content: Ok(None),
            };
        }

        let mut rewritten = content.to_owned();
        for (span, replacement) in edits.into_iter().rev() {
            rewritten.replace_range(span, &replacement);
        }

        // a replacement may contain characters that end the literal early
        let content = match hcl_edit::parser::parse_body(&rewritten) {
            Ok(_) => Ok(Some(rewritten)),
            Err(err) => {
                tracing::debug!(error = %err, "rewritten document does not parse");
                Err(RewriteError::InvalidOutput(err))
            }
        };

        DocumentRewrite { outcomes, content }
    }

    fn rewrite_literal(&self, module: String, literal: &str) -> BlockOutcome {
        let source = match ModuleSource::parse(literal) {
            Ok(source) => source,
            Err(error) => {
                tracing::debug!(%module, %error, "cannot parse module source");
                return BlockOutcome::Failed(BlockError {
                    module,
                    source_text: literal.to_owned(),
                    error,
                });
            }
        };

        if !self.strategy.decide(&source) {
            tracing::trace!(%module, %source, "skipping source due to updater decision");
            return BlockOutcome::Skipped { module, source };
        }

        let updated = self.strategy.apply(&source);
        let new = match updated.to_checked_string() {
            Ok(new) => new,
            Err(error) => {
                tracing::debug!(%module, %error, "updated source cannot be written");
                return BlockOutcome::Failed(BlockError {
                    module,
                    source_text: updated.to_string(),
                    error,
                });
            }
        };
        if new == source.to_string() {
            tracing::debug!(%module, %source, "update would not change the source");
            return BlockOutcome::Unchanged { module, source };
        }

        tracing::debug!(%module, old = literal, %new, "updating source");
        BlockOutcome::Changed(Change {
            module,
            old: literal.to_owned(),
            new,
        })
    }
}

fn module_name(block: &Block) -> String {
    block
        .labels
        .first()
        .map(|label| label.as_str().to_owned())
        .unwrap_or_default()
}

fn source_attribute(block: &Block) -> Option<&Attribute> {
    block
        .body
        .attributes()
        .find(|attribute| attribute.key.value().as_str() == SOURCE_ATTRIBUTE)
}

/// Byte range of the text between the quotes of a plain string literal
///
/// Returns `None` for every other kind of expression and for empty literals.
fn literal_span(content: &str, attribute: &Attribute) -> Option<Range<usize>> {
    let Expression::String(string) = &attribute.value else {
        return None;
    };

    let span = attribute.value.span()?;
    let token = content.get(span.clone())?;

    let inner = match (token.find('"'), token.rfind('"')) {
        (Some(open), Some(close))
            if open < close
                && token[..open].trim().is_empty()
                && token[close + 1..].trim().is_empty() =>
        {
            span.start + open + 1..span.start + close
        }
        // the span may already exclude the quotes
        _ if token.trim() == string.value().as_str() => {
            let offset = token.len() - token.trim_start().len();
            span.start + offset..span.start + offset + token.trim().len()
        }
        _ => return None,
    };

    if inner.is_empty() {
        return None;
    }

    Some(inner)
}

/// A source that was updated
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Change {
    /// label of the module block
    pub module: String,
    pub old: String,
    pub new: String,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.old, self.new)
    }
}

/// What happened to a single `module` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Changed(Change),
    /// the strategy decided against an update
    Skipped { module: String, source: ModuleSource },
    /// the update resulted in the same source
    Unchanged { module: String, source: ModuleSource },
    Failed(BlockError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("module \"{module}\": cannot use source \"{source_text}\"")]
pub struct BlockError {
    pub module: String,
    pub source_text: String,
    #[source]
    pub error: SourceError,
}

/// Result of rewriting one document
///
/// The block outcomes are kept even when the rewritten text turns out to be invalid.
#[derive(Debug)]
pub struct DocumentRewrite {
    /// one entry per `module` block with a literal source, in declaration order
    pub outcomes: Vec<BlockOutcome>,
    content: Result<Option<String>, RewriteError>,
}

impl DocumentRewrite {
    /// At least one source was replaced and the result is valid
    pub fn is_changed(&self) -> bool {
        matches!(self.content, Ok(Some(_)))
    }

    /// The rewritten text, `None` when nothing changed or the result is invalid
    pub fn content(&self) -> Option<&str> {
        match &self.content {
            Ok(content) => content.as_deref(),
            Err(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RewriteError> {
        self.content.as_ref().err()
    }

    pub fn into_content(self) -> Result<Option<String>, RewriteError> {
        self.content
    }

    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BlockOutcome::Changed(change) => Some(change),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &BlockError> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BlockOutcome::Failed(error) => Some(error),
            _ => None,
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RewriteError {
    #[error("rewritten document is not valid hcl")]
    InvalidOutput(#[source] hcl_edit::parser::Error),
}
