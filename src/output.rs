//! Output formatting utilities

use crate::error::Result;
use crate::report::RegressionReport;
use crate::schema_diff::SchemaDiff;
use crate::value_diff::ValueDiff;
use std::fmt;
use std::fs;
use std::path::Path;

/// Pretty printer for regression reports
pub struct PrettyPrinter;

impl PrettyPrinter {
    pub fn print_report(report: &RegressionReport) {
        print!("{}", ReportTree(report));
    }

    /// Render a report as an indented tree
    pub fn render_report(report: &RegressionReport) -> String {
        ReportTree(report).to_string()
    }
}

struct ReportTree<'a>(&'a RegressionReport);

impl fmt::Display for ReportTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(
            f,
            "📊 Regression Report ({})",
            report.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;

        write_schema(f, &report.schema_changes)?;
        write_values(f, &report.value_changes)?;

        writeln!(
            f,
            "└─ Summary: {} schema issue(s), {} column(s) with value changes",
            report.summary.total_schema_issues, report.summary.columns_with_value_changes
        )?;
        writeln!(f)?;
        if report.potential_regression {
            writeln!(f, "❌ Potential regression detected")
        } else {
            writeln!(f, "✅ No regression detected")
        }
    }
}

fn write_schema(f: &mut fmt::Formatter<'_>, schema: &SchemaDiff) -> fmt::Result {
    if !schema.has_changes() {
        return writeln!(
            f,
            "├─ ✅ Schema: unchanged ({} columns)",
            schema.total_columns_current
        );
    }

    writeln!(
        f,
        "├─ ❌ Schema: CHANGED ({} → {} columns)",
        schema.total_columns_previous, schema.total_columns_current
    )?;

    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    if !schema.added_columns.is_empty() {
        sections.push((
            format!("Columns added: {}", schema.added_columns.len()),
            schema.added_columns.clone(),
        ));
    }
    if !schema.removed_columns.is_empty() {
        sections.push((
            format!("Columns removed: {}", schema.removed_columns.len()),
            schema.removed_columns.clone(),
        ));
    }
    if !schema.type_changes.is_empty() {
        let details = schema
            .type_changes
            .iter()
            .map(|(column, change)| {
                let note = if change.is_compatible() { "compatible" } else { "incompatible" };
                format!("{}: {} → {} ({})", column, change.previous, change.current, note)
            })
            .collect();
        sections.push((format!("Type changes: {}", schema.type_changes.len()), details));
    }

    write_sections(f, "│  ", &sections)
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &ValueDiff) -> fmt::Result {
    let rows = &values.row_count_change;
    let marker = if rows.is_decrease() { "❌" } else { "✅" };
    writeln!(
        f,
        "├─ {} Rows: {} → {} ({:+})",
        marker, rows.previous, rows.current, rows.difference
    )?;

    let Some(changes) = &values.columns_with_value_changes else {
        return writeln!(f, "├─ ⚠️  Values: not compared (row counts differ)");
    };

    if let Some(percentage) = values.percentage_row_change {
        writeln!(f, "├─ Rows differing: {:.2}%", percentage)?;
    }

    if changes.is_empty() {
        return writeln!(f, "├─ ✅ Values: unchanged");
    }

    writeln!(f, "├─ ❌ Values: {} column(s) changed", changes.len())?;
    for (i, (column, change)) in changes.iter().enumerate() {
        let prefix = if i == changes.len() - 1 { "└─" } else { "├─" };
        writeln!(
            f,
            "│  {} {}: {} row(s) ({:.2}%)",
            prefix, column, change.changed_rows, change.percentage
        )?;
    }
    Ok(())
}

fn write_sections(f: &mut fmt::Formatter<'_>, indent: &str, sections: &[(String, Vec<String>)]) -> fmt::Result {
    for (i, (title, items)) in sections.iter().enumerate() {
        let last = i == sections.len() - 1;
        let (prefix, child_indent) = if last { ("└─", "   ") } else { ("├─", "│  ") };
        writeln!(f, "{}{} {}", indent, prefix, title)?;
        for (j, item) in items.iter().enumerate() {
            let item_prefix = if j == items.len() - 1 { "└─" } else { "├─" };
            writeln!(f, "{}{}{} {}", indent, child_indent, item_prefix, item)?;
        }
    }
    Ok(())
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    pub fn format_report(report: &RegressionReport) -> Result<String> {
        Self::format(report)
    }
}

/// Write a report as pretty JSON, creating parent directories as needed
pub fn save_report(report: &RegressionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, JsonFormatter::format_report(report)?)?;
    log::info!("Report saved to {}", path.display());
    Ok(())
}
