use crate::config::Profile;
use crate::core::{output_file_name, Transformer};
use crate::error::{FuelmapError, FuelmapResult};
use crate::excel::TemplateExporter;
use crate::types::{RowProgress, TransformReport};
use chrono::Local;
use colored::Colorize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Print the profile in use, marking the built-in one
fn print_profile_source(profile_path: Option<&Path>, profile: &Profile) {
    match profile_path {
        Some(p) => println!("   Profile: {} ({})", profile.name.cyan(), p.display()),
        None => println!("   Profile: {} (built-in)", profile.name.cyan()),
    }
}

fn read_artifact(path: &Path, what: &str) -> FuelmapResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        let message = format!("Failed to open '{}': {}", path.display(), e);
        match what {
            "template" => FuelmapError::TemplateRead(message),
            _ => FuelmapError::SourceRead(message),
        }
    })
}

/// Resolve where the artifact is written: explicit path or date-stamped name.
fn output_path(output: Option<PathBuf>, profile: &Profile) -> PathBuf {
    output.unwrap_or_else(|| {
        PathBuf::from(output_file_name(
            &profile.output_prefix,
            Local::now().date_naive(),
        ))
    })
}

/// Single-line "rows processed / total" indicator
fn format_progress(progress: RowProgress) -> String {
    format!(
        "   Processing row {} of {} ({}%)",
        progress.index,
        progress.total,
        progress.percent()
    )
}

fn print_report(report: &TransformReport, verbose: bool) {
    println!("   Rows read:     {}", report.rows_read);
    println!(
        "   Rows written:  {}",
        report.rows_written.to_string().bold().green()
    );
    println!("   Rows excluded: {}", report.rows_excluded);

    if report.warnings.is_empty() {
        return;
    }
    println!(
        "\n{} {} field(s) left unset",
        "⚠️ ".yellow(),
        report.warnings.len()
    );
    let shown = if verbose { report.warnings.len() } else { 10 };
    for warning in report.warnings.iter().take(shown) {
        println!(
            "   row {}: {} - {}",
            warning.source_row,
            warning.field.bright_blue(),
            warning.error
        );
    }
    if report.warnings.len() > shown {
        println!(
            "   ... {} more (use --verbose to list all)",
            report.warnings.len() - shown
        );
    }
}

/// Execute the transform command
pub fn transform(
    template: PathBuf,
    data: PathBuf,
    output: Option<PathBuf>,
    profile_path: Option<PathBuf>,
    verbose: bool,
) -> FuelmapResult<()> {
    println!("{}", "⛽ Fuelmap - Transform".bold().green());
    println!("   Template: {}", template.display());
    println!("   Data:     {}", data.display());

    let profile = Profile::load_or_default(profile_path.as_deref())?;
    print_profile_source(profile_path.as_deref(), &profile);
    println!();

    let template_bytes = read_artifact(&template, "template")?;
    let data_bytes = read_artifact(&data, "data")?;

    let transformer = Transformer::new(&profile);
    let result = transformer.run_with_progress(&template_bytes, &data_bytes, |progress| {
        print!("\r{}", format_progress(progress));
        let _ = std::io::stdout().flush();
    });
    println!();
    let artifact = result?;

    let output = output_path(output, &profile);
    fs::write(&output, &artifact.bytes)?;

    println!("{}", "✅ Processing complete!".bold().green());
    print_report(&artifact.report, verbose);
    println!("\n   Output: {}\n", output.display().to_string().bold());

    Ok(())
}

/// Execute the check command - ingest both artifacts, write nothing
pub fn check(template: PathBuf, data: PathBuf, profile_path: Option<PathBuf>) -> FuelmapResult<()> {
    println!("{}", "🔍 Fuelmap - Check".bold().green());
    println!("   Template: {}", template.display());
    println!("   Data:     {}", data.display());

    let profile = Profile::load_or_default(profile_path.as_deref())?;
    print_profile_source(profile_path.as_deref(), &profile);
    println!();

    let template_bytes = read_artifact(&template, "template")?;
    let data_bytes = read_artifact(&data, "data")?;

    let summary = Transformer::new(&profile).check(&template_bytes, &data_bytes)?;

    println!("{}", "✅ Both files are readable".bold().green());
    println!("   Source columns:      {}", summary.source_columns);
    println!("   Source rows:         {}", summary.source_rows);
    println!("   Excluded vehicles:   {}", summary.excluded_rows);
    println!(
        "   Rows to write:       {}",
        (summary.source_rows - summary.excluded_rows)
            .to_string()
            .bold()
    );
    println!(
        "   Stale template rows: {} (cleared on transform)\n",
        summary.stale_template_rows
    );

    Ok(())
}

/// Execute the template command - write a blank destination template
pub fn template(output: PathBuf, profile_path: Option<PathBuf>) -> FuelmapResult<()> {
    println!("{}", "📄 Fuelmap - Blank Template".bold().green());

    let profile = Profile::load_or_default(profile_path.as_deref())?;
    print_profile_source(profile_path.as_deref(), &profile);

    TemplateExporter::new(&profile).export(&output)?;

    println!("{}", "✅ Template written".bold().green());
    println!("   Columns: {}", profile.columns.len());
    println!("   File:    {}\n", output.display());

    Ok(())
}

/// Execute the profile command - print the effective profile as YAML
pub fn profile(profile_path: Option<PathBuf>) -> FuelmapResult<()> {
    let profile = Profile::load_or_default(profile_path.as_deref())?;
    print!("{}", profile.to_yaml_string()?);
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
