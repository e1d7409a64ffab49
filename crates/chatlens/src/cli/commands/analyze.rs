use anyhow::{Context, Result};

use crate::config::RuntimePaths;

pub fn run(runtime_paths: &RuntimePaths) -> Result<()> {
    let data_dir = &runtime_paths.data_dir;
    let out_dir = &runtime_paths.out_dir;
    println!(
        "analyze: start data_dir={} out_dir={}",
        data_dir.display(),
        out_dir.display()
    );

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;

    let json_files = crate::loader::list_json_files(data_dir)?;
    if json_files.is_empty() {
        println!("analyze: No JSON files found in {}", data_dir.display());
        println!("analyze: add chat-log JSON files to this directory and run again");
        return Ok(());
    }

    println!("analyze: stage load files={}", json_files.len());
    let outcome = crate::loader::load_documents(data_dir)?;
    for document in &outcome.documents {
        println!("analyze: loaded file={}", document.source_file);
    }
    for failure in &outcome.failures {
        println!(
            "analyze: load_error file={} error={}",
            failure.source_file, failure.message
        );
    }
    println!(
        "analyze: checkpoint load_complete loaded={} failed={}",
        outcome.documents.len(),
        outcome.failures.len()
    );
    if outcome.documents.is_empty() {
        println!("analyze: No data loaded. Exiting.");
        return Ok(());
    }

    println!("analyze: stage build_table");
    let table = crate::table::table_from_documents(&outcome.documents)
        .context("failed to build chat table")?;
    println!(
        "analyze: checkpoint table_built rows={} files={}",
        table.len(),
        table.source_files().len()
    );
    if table.is_empty() {
        println!("analyze: No chat turns found. Exiting.");
        return Ok(());
    }

    println!("analyze: stage generate_charts");
    for source_file in table.source_files() {
        let layout = crate::charts::generate_charts(&table, source_file, out_dir)
            .with_context(|| format!("failed to generate charts for {source_file}"))?;
        println!(
            "analyze: Created visualizations for {} in {}",
            source_file,
            layout.dir.display()
        );
    }

    println!("analyze: stage summary_report");
    let report = crate::report::build_summary_report(&table);
    print!("{}", crate::report::render_summary_report(&report));
    let summary_path = crate::report::summary_artifact_path(out_dir);
    crate::report::write_summary_artifact(&summary_path, &report)?;
    println!(
        "analyze: checkpoint summary_written {}",
        summary_path.display()
    );

    println!(
        "analyze: Analysis complete! Check {} for results.",
        out_dir.display()
    );
    Ok(())
}
