//! Snapshot tests
//!
//! Rewrites each *.tf file in /tests/fixtures/ individually and compares the resulting document
//! and what happened to each `module` block.
use tf_module_update::conditions;
use tf_module_update::hcl_documents::HclDocument;
use tf_module_update::rewrite::{BlockOutcome, Rewriter};
use tf_module_update::source::ModuleSource;
use tf_module_update::strategy::Strict;

fn describe(outcome: &BlockOutcome) -> String {
    match outcome {
        BlockOutcome::Changed(change) => format!("changed {}: {change}", change.module),
        BlockOutcome::Skipped { module, source } => format!("skipped {module}: {source}"),
        BlockOutcome::Unchanged { module, source } => format!("unchanged {module}: {source}"),
        BlockOutcome::Failed(error) => format!("failed {:#}", anyhow::Error::new(error.clone())),
    }
}

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TFMU_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let filter: ModuleSource = "https://github.com/example-org/aws/vpc.git".parse().unwrap();
    let strategy = Strict::merging(ModuleSource {
        revision: "2.0.0".into(),
        ..Default::default()
    })
    .with_condition(conditions::from_source(&filter).expect("filter has conditions"));

    insta::glob!("fixtures/*.tf", |path| {
        let content = std::fs::read_to_string(path).unwrap();
        let document = HclDocument::parse(content, None).expect("fixture must be valid hcl");

        let rewrite = Rewriter::new(&strategy).rewrite(&document);
        assert!(rewrite.error().is_none(), "rewrite must stay valid hcl");

        let outcomes = rewrite
            .outcomes
            .iter()
            .map(describe)
            .collect::<Vec<_>>()
            .join("\n");
        let rendered = format!(
            "{}\n\n# outcomes\n{outcomes}",
            rewrite.content().unwrap_or(document.content()).trim_end()
        );

        insta::assert_snapshot!(rendered);
    });
}
