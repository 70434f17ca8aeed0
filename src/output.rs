use colored::Colorize;

use crate::cleanup::RunSummary;

/// Render the end-of-run summary
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&"═".repeat(60));
    out.push('\n');
    out.push_str(&format!(
        "{} Scanned {} repositories, {} tags: deleted {}, kept {}, {} unresolved",
        "SUMMARY:".bold(),
        summary.repositories,
        summary.tags,
        summary.deleted.to_string().red().bold(),
        summary.kept.to_string().green().bold(),
        if summary.unresolved > 0 {
            summary.unresolved.to_string().yellow().bold().to_string()
        } else {
            summary.unresolved.to_string()
        }
    ));

    if summary.deleted > 0 {
        out.push_str(&format!(
            "\n\n{} Run registry garbage collection to reclaim disk space:\n",
            "REMINDER:".yellow().bold()
        ));
        out.push_str(
            "  docker exec <registry-container> bin/registry garbage-collect /etc/docker/registry/config.yml",
        );
    }

    out
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", format_summary(summary));
}
