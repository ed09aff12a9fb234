//! Terminal output for the CLI.

use crate::registry::{TaskRegistry, TaskRunner};
use crate::stats::{DataQuality, LanguageComparison, PowerAnalysis, QualityReport, Recommendation};
use crate::verify::{ResultValidation, VerificationReport};
use terminal_size::{terminal_size, Width};

/// Terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Truncate with an ellipsis if `s` is wider than `width` characters
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(width.saturating_sub(3)).collect();
        result.push_str("...");
        result
    }
}

/// Language label, with the C compiler when known
fn language_label(language: &str) -> String {
    match (language, crate::utils::C_COMPILER_NAME) {
        ("c", Some(compiler)) => format!("c ({compiler})"),
        _ => language.to_string(),
    }
}

fn quality_mark(quality: DataQuality) -> &'static str {
    match quality {
        DataQuality::Valid => "ok",
        DataQuality::Warning => "warn",
        DataQuality::Invalid => "INVALID",
    }
}

pub fn print_header() {
    let term_width = get_term_width().min(80);
    let title = " Cross-Language Benchmark ";
    let padding = term_width.saturating_sub(title.len() + 2) / 2;
    let right_padding = term_width.saturating_sub(padding + title.len());
    let border = "═".repeat(term_width);

    println!("╔{}╗", border);
    println!("║{}{}{}║", " ".repeat(padding), title, " ".repeat(right_padding));
    println!("╚{}╝", border);
    println!();
}

/// Boxed summary of one task
pub fn print_task_info_box(task: &dyn TaskRunner) {
    let max_content_width = get_term_width().saturating_sub(4).max(40);
    let lines = [
        format!("Task:      {}", task.name()),
        format!("Category:  {}", task.category()),
        task.description().to_string(),
        format!("Languages: {}", task.available_languages().join(", ")),
    ];
    let content_width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(60)
        .min(max_content_width);
    let border = "─".repeat(content_width + 2);

    println!("┌{}┐", border);
    for (i, line) in lines.iter().enumerate() {
        if i == 3 {
            println!("├{}┤", border);
        }
        println!("│ {:<width$} │", truncate(line, content_width), width = content_width);
    }
    println!("└{}┘", border);
    println!();
}

/// One row per task x language x scale group
pub fn print_results_table(reports: &[QualityReport]) {
    if reports.is_empty() {
        return;
    }

    let term_width = get_term_width();
    let fixed_width = 74;
    let group_col_width = term_width.saturating_sub(fixed_width).max(24);
    let table_width = group_col_width + fixed_width - 4;

    println!("  {}", "─".repeat(table_width));
    println!(
        "  {:<g_width$} {:>10} {:>10} {:>10} {:>8} {:>7} {:>9} {:>8}",
        "Task / language / scale",
        "Mean ms",
        "Median ms",
        "Std ms",
        "CV",
        "Runs",
        "Success",
        "Quality",
        g_width = group_col_width
    );
    println!("  {}", "─".repeat(table_width));

    for report in reports {
        let label = format!(
            "{} / {} / {}",
            report.task,
            language_label(&report.language),
            report.scale
        );
        println!(
            "  {:<g_width$} {:>10.3} {:>10.3} {:>10.3} {:>7.2}% {:>7} {:>8.1}% {:>8}",
            truncate(&label, group_col_width),
            report.summary.mean,
            report.summary.median,
            report.summary.std_dev,
            report.summary.coefficient_of_variation * 100.0,
            report.total_runs,
            report.success_rate() * 100.0,
            quality_mark(report.quality),
            g_width = group_col_width
        );
        for issue in &report.issues {
            println!("      - {issue}");
        }
    }
    println!();
}

pub fn print_comparisons(comparisons: &[LanguageComparison]) {
    if comparisons.is_empty() {
        return;
    }
    println!("  Comparisons:");
    for cmp in comparisons {
        println!(
            "  {} / {}: {} vs {}: d={:.2}, t={:.2}, df={:.1} -> {}",
            cmp.task,
            cmp.scale,
            language_label(&cmp.baseline),
            language_label(&cmp.candidate),
            cmp.cohens_d,
            cmp.significance.t_statistic,
            cmp.significance.degrees_of_freedom,
            cmp.recommendation
        );
        let power = match &cmp.power_analysis {
            PowerAnalysis::InsufficientData { reason } => format!("insufficient data ({reason})"),
            PowerAnalysis::Complete(result) => match result.recommendation {
                Recommendation::Sufficient => {
                    format!("power {:.2} at n={}, sufficient", result.current_power, result.current_sample_size)
                }
                Recommendation::IncreaseSampleSize { required_sample_size } => format!(
                    "power {:.2} at n={}, needs n={required_sample_size} per group",
                    result.current_power, result.current_sample_size
                ),
            },
        };
        println!("      {power}");
    }
    println!();
}

/// Hash consistency and cross-language agreement of a run
pub fn print_validation(validation: &ResultValidation) {
    if validation.consistency_issues.is_empty() && validation.mismatches.is_empty() {
        println!("  Hashes: all series consistent, all languages agree");
        println!();
        return;
    }
    for issue in &validation.consistency_issues {
        println!(
            "  ✗ {} / {} / {}: {} distinct hashes within one series",
            issue.task,
            issue.language,
            issue.scale,
            issue.distinct_hashes.len()
        );
    }
    for mismatch in &validation.mismatches {
        let hashes: Vec<String> = mismatch
            .hashes
            .iter()
            .map(|(language, hash)| format!("{language}={hash:#010x}"))
            .collect();
        let mark = if mismatch.tolerated { "~" } else { "✗" };
        println!(
            "  {mark} {} / {} {}: {}{}",
            mismatch.task,
            mismatch.scale,
            serde_json::to_string(&mismatch.params).unwrap_or_default(),
            hashes.join(", "),
            if mismatch.tolerated { " (tolerated)" } else { "" }
        );
    }
    println!();
}

pub fn print_verification(report: &VerificationReport) {
    let mark = if report.is_success() { "✅" } else { "❌" };
    println!(
        "  {mark} {} / {}: {}/{} vectors passed",
        report.task,
        language_label(&report.language),
        report.passed_count(),
        report.total()
    );
    for (category, (passed, total)) in report.by_category() {
        println!("      {category:<18} {passed}/{total}");
    }
    for outcome in report.critical_failures() {
        println!(
            "      ✗ {}: expected {:#010x}, got {}",
            outcome.name,
            outcome.expected_hash,
            outcome.describe_actual()
        );
    }
    let tolerated = report.tolerated_failures().count();
    if tolerated > 0 {
        println!("      {tolerated} tolerated large-matrix mismatches");
    }
}

pub fn print_help() {
    println!("Usage: crosslang-bench [OPTIONS] [COMMAND]");
    println!();
    println!("Commands:");
    println!("  run            Run the configured benchmark suite (default)");
    println!("  verify         Check every language against the reference vectors");
    println!("  fixtures DIR   Write reference vectors as JSON fixtures into DIR");
    println!("  list           List available tasks");
    println!();
    println!("Options:");
    println!("  --config FILE  JSON configuration (default: built-in defaults)");
    println!("  --json FILE    Export raw results as JSON");
    println!("  --csv FILE     Export raw results as CSV");
    println!("  --seed N       Override the configured seed");
    println!("  --runs N       Override the measured runs per series");
    println!("  --help, -h     Show this help message");
    println!();
    println!("Logging is controlled with RUST_LOG (default: warn).");
}

pub fn print_available_tasks(registry: &TaskRegistry) {
    println!("Available tasks:");
    println!();
    for task in registry.all() {
        println!(
            "  {:<14} [{}] - {} ({})",
            task.name(),
            task.category(),
            task.description(),
            task.available_languages().join(", ")
        );
    }
}
