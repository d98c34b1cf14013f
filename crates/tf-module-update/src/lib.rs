//! # tf-module-update - find and update terraform module sources
//!
//! ## Introduction for developers
//!
//! Read this to understand how `tf-module-update` works internally.
//!
//! ### Module sources
//!
//! A terraform `module` block references its code through the `source` attribute:
//!
//! ```hcl
//! module "vpc" {
//!   source = "git::https://github.com/example-org/aws.git//modules/vpc?ref=v1.2.0"
//! }
//! ```
//!
//! [source::ModuleSource] splits such a string into its parts
//!
//! | part             | value                     |
//! |------------------|---------------------------|
//! | `special_prefix` | `git::`                   |
//! | `scheme`         | `https`                   |
//! | `host`           | `github.com`              |
//! | `module`         | `/example-org/aws.git`    |
//! | `submodule`      | `//modules/vpc`           |
//! | `revision`       | `v1.2.0`                  |
//!
//! and puts it back together without loss.
//!
//! ### Deciding what to update
//!
//! [conditions::Condition]s are predicates over a parsed source. A [strategy::Strategy] combines
//! them with a mutation: [strategy::Strict] updates a source only when every condition holds and
//! then overlays the non-empty parts of a replacement source.
//!
//! ### Rewriting documents
//!
//! [hcl_documents::HclDocument] keeps a parsed file together with its text. The
//! [rewrite::Rewriter] walks the root `module` blocks, asks the strategy about every literal
//! `source` and splices the new value into the text. Nothing else in the file is touched.
//!
//! ### Running over a tree
//!
//! [processing::Manager] discovers `*.tf` files, rewrites them one by one and collects what
//! happened in [results::Results]. Errors in one block or file never stop the others.
pub mod conditions;
pub mod hcl_documents;
pub mod processing;
pub mod results;
pub mod rewrite;
pub mod source;
pub mod strategy;
