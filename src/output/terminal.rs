// Colored terminal output for analyses, token sets, and comparisons.
//
// main.rs delegates all human-facing formatting here; `--json` output
// bypasses this module entirely.

use std::collections::BTreeSet;

use colored::Colorize;

use crate::analysis::model::PluginAnalysis;
use crate::pipeline::ComparisonReport;

/// How many method symbols and packages to preview before eliding.
const PREVIEW_LIMIT: usize = 10;

/// Display a summary of one analysis file.
pub fn display_analysis(analysis: &PluginAnalysis, fallback_label: &str) {
    let meta = &analysis.metadata;
    println!(
        "\n{}",
        format!("=== {} ===", analysis.display_name(fallback_label)).bold()
    );

    println!("  Plugin id:  {}", meta.plugin_id.as_deref().unwrap_or("-"));
    println!("  Version:    {}", meta.version.as_deref().unwrap_or("-"));
    println!("  Vendor:     {}", meta.vendor.as_deref().unwrap_or("-"));
    if let Some(range) = &meta.compatibility {
        println!(
            "  Builds:     {} .. {}",
            range.since_build,
            range.until_build.as_deref().unwrap_or("*")
        );
    }

    let structure = &analysis.structure;
    println!(
        "\n  {} files, {} bytes, {} JARs",
        structure.total_files,
        structure.total_size,
        structure.jar_files.len()
    );
    let types: Vec<String> = structure
        .files_by_type
        .iter()
        .map(|(ext, count)| {
            let ext = if ext.is_empty() { "(none)" } else { ext.as_str() };
            format!("{ext}: {count}")
        })
        .collect();
    if !types.is_empty() {
        println!("  {}", types.join("  ").dimmed());
    }

    let deps = &analysis.dependencies;
    if !deps.plugin_dependencies.is_empty() {
        println!("\n  Plugin dependencies:");
        for dep in &deps.plugin_dependencies {
            let optional = if dep.optional {
                " (optional)".dimmed().to_string()
            } else {
                String::new()
            };
            println!("    {}{}", dep.id, optional);
        }
    }
    if !deps.library_jars.is_empty() {
        println!("\n  Bundled libraries:");
        for lib in &deps.library_jars {
            println!(
                "    {:<48} {}",
                lib.name,
                lib.version.as_deref().unwrap_or("?").dimmed()
            );
        }
    }

    let dna = &analysis.plugin_dna;
    println!(
        "\n  DNA: {} keywords, {} method symbols",
        dna.keywords.len(),
        dna.methods.len()
    );
    if let Some(description) = &dna.description {
        println!("  {}", super::truncate_chars(description, 160).dimmed());
    }
    preview("Methods", dna.methods.iter());

    let sig = &analysis.content_signature;
    println!("\n  Overall hash:   {}", sig.overall_hash.cyan());
    if let Some(hash) = &sig.descriptor_hash {
        println!("  Descriptor:     {}", hash.dimmed());
    }
    if !sig.aggregate_class_hash.is_empty() {
        println!("  JAR aggregate:  {}", sig.aggregate_class_hash.dimmed());
    }
    println!();
}

/// Display a token set grouped by category prefix.
pub fn display_tokens(tokens: &BTreeSet<String>) {
    println!(
        "\n{}",
        format!("=== Tokens ({}) ===", tokens.len()).bold()
    );
    let mut current = "";
    for token in tokens {
        let (category, value) = token.split_once('=').unwrap_or(("", token.as_str()));
        if category != current {
            println!("\n  {}", category.cyan());
            current = category;
        }
        println!("    {value}");
    }
    println!();
}

/// Display a comparison report.
pub fn display_comparison(report: &ComparisonReport) {
    println!(
        "\n{}",
        format!("=== {} vs {} ===", report.left, report.right).bold()
    );
    println!();

    let e = &report.embedding;
    println!("  {}", "Embedding cosine".dimmed());
    println!("    Keywords:     {:>6.3}", e.keywords);
    println!("    Description:  {:>6.3}", e.description);
    println!("    Methods:      {:>6.3}", e.methods);
    println!(
        "    Overall:      {:>6.3}  {}",
        e.overall,
        colorize_band(e.overall)
    );

    println!();
    println!(
        "  {}",
        format!(
            "SuperMinHash Jaccard ({} x {} bits)",
            report.components, report.bits_per_component
        )
        .dimmed()
    );
    println!(
        "    Estimate:     {:>6.3}  {}",
        report.jaccard,
        colorize_band(report.jaccard)
    );
    println!(
        "    Tokens:       {} / {} ({} shared)",
        report.left_tokens, report.right_tokens, report.shared_tokens
    );
    println!();
}

/// Coarse label for a similarity score.
pub fn similarity_band(score: f64) -> &'static str {
    if score >= 0.9 {
        "Near-duplicate"
    } else if score >= 0.7 {
        "High"
    } else if score >= 0.4 {
        "Moderate"
    } else {
        "Low"
    }
}

fn colorize_band(score: f64) -> colored::ColoredString {
    let band = similarity_band(score);
    match band {
        "Near-duplicate" => band.red().bold(),
        "High" => band.bright_red(),
        "Moderate" => band.yellow(),
        _ => band.green(),
    }
}

fn preview<'a>(title: &str, items: impl ExactSizeIterator<Item = &'a String>) {
    let total = items.len();
    if total == 0 {
        return;
    }
    let shown: Vec<&str> = items.take(PREVIEW_LIMIT).map(String::as_str).collect();
    let more = if total > PREVIEW_LIMIT {
        format!(" (+{} more)", total - PREVIEW_LIMIT)
    } else {
        String::new()
    };
    println!("  {}: {}{}", title, shown.join(", "), more.dimmed());
}
