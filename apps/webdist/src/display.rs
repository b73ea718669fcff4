//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::Style;
use serde::Serialize;
use std::io;
use webdist_manifest::{render_pkg_info, PackageMetadata};
use webdist_types::StageReport;

/// One row of the `stages` listing
#[derive(Debug, Clone, Serialize)]
pub struct StageEntry {
    pub name: String,
    pub description: String,
}

/// Final result of a command, rendered once the command has finished
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandResult {
    Stage(StageReport),
    StageList(Vec<StageEntry>),
    Metadata(Box<PackageMetadata>),
}

impl CommandResult {
    /// Serialize for `--json`
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render command result
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandResult::Stage(report) => self.render_stage_report(report),
            CommandResult::StageList(stages) => self.render_stage_list(stages),
            CommandResult::Metadata(metadata) => {
                print!("{}", render_pkg_info(metadata));
                Ok(())
            }
        }
    }

    fn render_stage_report(&self, report: &StageReport) -> io::Result<()> {
        let status = if report.is_clean() {
            self.style(Style::new().green().bold()).apply_to("ok")
        } else {
            self.style(Style::new().yellow().bold())
                .apply_to("completed with warnings")
        };
        println!(
            "{}: {status} (exit code {}, {}ms)",
            report.stage, report.exit_code, report.duration_ms
        );

        if !report.warnings.is_empty() {
            println!();
            println!("Warnings:");
            for warning in &report.warnings {
                println!("  - {warning}");
            }
        }

        if !report.artifacts.is_empty() {
            println!();
            println!("Artifacts:");
            for artifact in &report.artifacts {
                println!("  {}", artifact.display());
            }
        }

        Ok(())
    }

    fn render_stage_list(&self, stages: &[StageEntry]) -> io::Result<()> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ]);

        for stage in stages {
            let name = if self.colors_enabled {
                Cell::new(&stage.name).fg(Color::Cyan)
            } else {
                Cell::new(&stage.name)
            };
            table.add_row(vec![name, Cell::new(&stage.description)]);
        }

        println!("{table}");
        Ok(())
    }

    fn style(&self, style: Style) -> Style {
        if self.colors_enabled {
            style
        } else {
            Style::new()
        }
    }
}
