use crate::error::BudgetResult;
use crate::excel::read_workbook;
use crate::generator::WorkbookGenerator;
use crate::parser;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the generate command
pub fn generate(spec: PathBuf, output: PathBuf, validate_only: bool) -> BudgetResult<()> {
    println!("{}", "📒 Budget Generator".bold().green());
    println!("   Spec:   {}", spec.display());
    if !validate_only {
        println!("   Output: {}", output.display());
    }
    println!();

    let parsed = parser::parse_spec(&spec)?;
    println!(
        "   Found {} sheets, {} declared named ranges",
        parsed.workbook.sheets.len(),
        parsed.workbook.named_ranges.len()
    );

    if validate_only {
        println!("\n{}", "✅ Specification is valid!".bold().green());
        return Ok(());
    }

    let mut generator = WorkbookGenerator::new(parsed);
    let saved = generator.generate(&output)?;

    if let Some(workbook) = generator.workbook() {
        println!();
        for sheet in workbook.sheets() {
            let visibility = sheet.visibility();
            let label = if visibility.is_hidden() {
                visibility.as_str().yellow()
            } else {
                visibility.as_str().normal()
            };
            println!("   {} ({})", sheet.name().bright_blue().bold(), label);
        }
        println!(
            "   {} named ranges",
            workbook.defined_names().len().to_string().bold()
        );
    }

    println!("\n{}", "✅ Workbook generated!".bold().green());
    println!("   Excel file: {}\n", saved.display());
    Ok(())
}

/// Execute the inspect command
pub fn inspect(workbook: PathBuf) -> BudgetResult<()> {
    println!("{}", "🔍 Inspecting workbook".bold().green());
    println!("   File: {}\n", workbook.display());

    let snapshot = read_workbook(&workbook)?;

    println!("{}", "Sheets:".bold());
    for (index, sheet) in snapshot.sheets.iter().enumerate() {
        let visibility = sheet.visibility.as_str();
        let visibility = if sheet.visibility.is_hidden() {
            visibility.yellow()
        } else {
            visibility.normal()
        };
        println!("   {}. {} ({})", index + 1, sheet.name.bright_blue(), visibility);
    }

    println!("\n{}", "Defined names:".bold());
    if snapshot.defined_names.is_empty() {
        println!("   {}", "(none)".dimmed());
    }
    for (name, refers_to) in &snapshot.defined_names {
        println!("   {:<20} {}", name.cyan(), refers_to);
    }

    println!("\n{}", "Tables:".bold());
    if snapshot.tables.is_empty() {
        println!("   {}", "(none)".dimmed());
    }
    for table in &snapshot.tables {
        println!(
            "   {} on {}: {}",
            table.name.cyan(),
            table.sheet.bright_blue(),
            table.columns.join(", ")
        );
    }
    println!();

    Ok(())
}
