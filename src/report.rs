use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::chart::ChartArtifact;

pub const REPORT_FILE: &str = "README.md";

/// Markdown report: heading, story, then one image link per chart in
/// the order the charts were produced.
pub fn render_report(narrative: &str, charts: &[ChartArtifact]) -> String {
    let mut md = String::new();
    md.push_str("# Dataset Analysis\n\n");
    md.push_str("## Story\n");
    md.push_str(narrative);
    md.push_str("\n\n");
    md.push_str("## Visualizations\n");
    for chart in charts {
        md.push_str(&format!("![{0}](./{0})\n", chart.file_name));
    }
    md
}

/// Write `README.md` into `out_dir`, replacing any previous report.
pub fn write_report(out_dir: &Path, narrative: &str, charts: &[ChartArtifact]) -> Result<PathBuf> {
    let path = out_dir.join(REPORT_FILE);
    std::fs::write(&path, render_report(narrative, charts))
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote report {} with {} chart(s)", path.display(), charts.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(column: &str) -> ChartArtifact {
        ChartArtifact {
            column: column.to_string(),
            file_name: format!("{column}_distribution.png"),
        }
    }

    #[test]
    fn report_layout() {
        let md = render_report("A tale of numbers.", &[chart("age"), chart("income")]);
        assert_eq!(
            md,
            "# Dataset Analysis\n\n\
             ## Story\n\
             A tale of numbers.\n\n\
             ## Visualizations\n\
             ![age_distribution.png](./age_distribution.png)\n\
             ![income_distribution.png](./income_distribution.png)\n"
        );
    }

    #[test]
    fn report_without_charts_keeps_sections() {
        let md = render_report("story", &[]);
        assert!(md.contains("## Story\nstory\n"));
        assert!(md.ends_with("## Visualizations\n"));
    }

    #[test]
    fn write_overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REPORT_FILE), "old contents").unwrap();

        let path = write_report(dir.path(), "new story", &[chart("x")]).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(!text.contains("old contents"));
        assert!(text.contains("new story"));
        assert!(text.contains("![x_distribution.png](./x_distribution.png)"));
    }

    #[test]
    fn chart_links_use_file_names_verbatim() {
        let odd = ChartArtifact {
            column: "rate {%}".to_string(),
            file_name: "rate {%}_distribution.png".to_string(),
        };
        let md = render_report("s", &[odd]);
        assert!(md.ends_with("![rate {%}_distribution.png](./rate {%}_distribution.png)\n"));
    }
}
