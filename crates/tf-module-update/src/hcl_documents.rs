//! hcl documents ([Body] plus the text it was parsed from)
//!
//! [HclDocument] keeps
//! - the source path (if any)
//! - the original text
//! - the parsed body
//!
//! The text is kept next to the body so that rewrites can splice bytes at the spans reported by
//! the parser instead of re-encoding the whole document.
use hcl_edit::structure::{Block, Body, Structure};
use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// Identifier of blocks that reference external modules
pub const MODULE_BLOCK: &str = "module";

/// File extension of documents we look at
pub const EXTENSION: &str = "tf";

#[derive(Debug)]
pub struct HclDocument {
    path: Option<PathBuf>,
    content: String,
    body: Body,
}

impl HclDocument {
    /// Parses `content`; `path` is only used to point at the document in messages
    pub fn parse(content: impl Into<String>, path: Option<PathBuf>) -> Result<Self, LoadError> {
        let content = content.into();
        let body = hcl_edit::parser::parse_body(&content)?;

        Ok(Self {
            path,
            content,
            body,
        })
    }

    pub fn load_file(file_path: &Path) -> Result<Self, LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path)?;
        Self::parse(file_contents, Some(file_path))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Root `module` blocks in declaration order
    pub fn module_blocks(&self) -> impl Iterator<Item = &Block> {
        self.body.iter().filter_map(|structure| match structure {
            Structure::Block(block) if block.ident.value().as_str() == MODULE_BLOCK => Some(block),
            _ => None,
        })
    }

    /// Human readable name, used in messages
    pub fn display_name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "<buffer>".to_string(),
        }
    }
}

/// Expand `paths` into the list of documents to process
///
/// Directories are walked recursively in name order. Hidden entries (`.terraform`, `.git`, ...)
/// are excluded and only `*.tf` files are selected. A file reachable through more than one of
/// `paths` is listed once, at its first position.
///
/// Paths that cannot be read are returned as errors, everything else is still collected.
pub fn discover(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<LoadError>) {
    let mut files = IndexSet::new();
    let mut errors = vec![];

    for path in paths {
        let path = match path.canonicalize() {
            Ok(path) => path,
            Err(err) => {
                errors.push(LoadError::Path {
                    path: path.clone(),
                    source: err,
                });
                continue;
            }
        };

        if path.is_dir() {
            walk_directory(&path, &mut files, &mut errors);
        } else if is_selected(&path) {
            files.insert(path);
        }
    }

    (files.into_iter().collect(), errors)
}

fn walk_directory(dir_path: &Path, files: &mut IndexSet<PathBuf>, errors: &mut Vec<LoadError>) {
    let read_dir = match std::fs::read_dir(dir_path) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            errors.push(LoadError::Path {
                path: dir_path.to_path_buf(),
                source: err,
            });
            return;
        }
    };

    let mut entries = vec![];
    for dir_entry in read_dir {
        match dir_entry {
            Ok(dir_entry) => entries.push(dir_entry),
            Err(err) => errors.push(LoadError::Path {
                path: dir_path.to_path_buf(),
                source: err,
            }),
        }
    }
    entries.sort_by_key(|dir_entry| dir_entry.file_name());

    for dir_entry in entries {
        if is_hidden(&dir_entry.file_name().to_string_lossy()) {
            tracing::trace!(path=%dir_entry.path().display(), "excluded");
            continue;
        }

        let file_path = dir_entry.path();
        match dir_entry.file_type() {
            Ok(file_type) if file_type.is_dir() => walk_directory(&file_path, files, errors),
            Ok(file_type) if file_type.is_file() && is_selected(&file_path) => {
                files.insert(file_path);
            }
            Ok(_) => {}
            Err(err) => errors.push(LoadError::Path {
                path: file_path,
                source: err,
            }),
        }
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_selected(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == EXTENSION)
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to read {}", path.display())]
    Path {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[from] hcl_edit::parser::Error),
}

/// Utility macro to create a [HclDocument]
///
/// ```
/// # use tf_module_update::hcl_document;
/// hcl_document!(r#"module "vpc" { source = "./vpc" }"#);
/// ```
///
/// With a path
/// ```
/// # use tf_module_update::hcl_document;
/// hcl_document!("main.tf" => "attribute = 42");
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use tf_module_update::hcl_document;
/// hcl_document!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! hcl_document {
    { $source:expr => $expr:expr } => {
        $crate::hcl_documents::HclDocument::parse($expr, Some(::std::path::PathBuf::from($source)))
            .expect("body must parse")
    };
    { $expr:expr } => {
        $crate::hcl_documents::HclDocument::parse($expr, None).expect("body must parse")
    };
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn module_blocks() {
        let document = hcl_document! {r#"
        attr_1 = 1
        module "one" {
          source = "./one"
        }
        resource "two" "three" {}
        module "four" {}
        "#};

        let labels: Vec<_> = document
            .module_blocks()
            .map(|block| block.labels[0].as_str().to_string())
            .collect();
        assert_eq!(labels, vec!["one", "four"]);
    }

    #[test]
    fn keeps_content() {
        let text = "# comment\nmodule \"a\" {\n  source   =   \"./a\" # trailing\n}\n";
        let document = hcl_document!("main.tf" => text);
        assert_eq!(document.content(), text);
        assert_eq!(document.display_name(), "main.tf");
    }

    #[test]
    fn invalid_document() {
        let err = HclDocument::parse("module \"a\" {", None).unwrap_err();
        assert!(matches!(err, LoadError::HclParseFailed(_)));
    }

    #[test]
    fn discover_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b/nested")).unwrap();
        std::fs::create_dir_all(root.join(".terraform/modules")).unwrap();
        std::fs::write(root.join("main.tf"), "").unwrap();
        std::fs::write(root.join("README.md"), "").unwrap();
        std::fs::write(root.join("a.tf"), "").unwrap();
        std::fs::write(root.join("b/nested/c.tf"), "").unwrap();
        std::fs::write(root.join(".hidden.tf"), "").unwrap();
        std::fs::write(root.join(".terraform/modules/d.tf"), "").unwrap();

        let root = root.canonicalize().unwrap();
        let (files, errors) = discover(&[root.clone(), root.join("a.tf")]);

        assert!(errors.is_empty());
        assert_eq!(
            files,
            vec![
                root.join("a.tf"),
                root.join("b/nested/c.tf"),
                root.join("main.tf"),
            ]
        );
    }

    #[test]
    fn discover_reports_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.tf"), "").unwrap();

        let (files, errors) = discover(&[
            dir.path().join("missing"),
            dir.path().join("main.tf"),
        ]);

        assert_eq!(files.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LoadError::Path { .. }));
    }
}
