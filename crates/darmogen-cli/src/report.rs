//! End-of-run summary box

use std::path::Path;

use darmogen_core::{paths, ParserConfig};

use crate::RunOutcome;

const MIN_WIDTH: usize = 20;
const PADDING: usize = 10;
const EMPTY_HINT: &str = " No entities found, check parser \"cwd\" and \"ext\".";

fn pad(text: &str, fill: char, width: usize) -> String {
    let len = text.chars().count();
    let mut out = text.to_string();
    out.extend(std::iter::repeat(fill).take(width.saturating_sub(len)));
    out
}

/// Render the box listing generated models (paths relative to `cwd`), a hint
/// when nothing was found, and any failures.
pub fn render_summary(outcome: &RunOutcome, cwd: &Path, parser: &ParserConfig) -> String {
    let models: Vec<(String, String)> = outcome
        .generation
        .written
        .iter()
        .map(|file| {
            let target = paths::to_specifier(&paths::relative_path(cwd, &file.target_file));
            (file.entity.clone(), target)
        })
        .collect();

    let failures: Vec<String> = outcome
        .parse
        .failures
        .iter()
        .map(|f| format!(" ✗ {}: {}", f.path.display(), f.error))
        .chain(
            outcome
                .generation
                .failures
                .iter()
                .map(|f| format!(" ✗ {}: {}", f.entity, f.error)),
        )
        .collect();

    let source_root = parser.source_root.display().to_string();
    let mut width = if models.is_empty() {
        (source_root.chars().count().max(parser.ext.chars().count()) + PADDING)
            .max(EMPTY_HINT.chars().count())
    } else {
        models
            .iter()
            .map(|(name, target)| name.chars().count() + target.chars().count())
            .fold(MIN_WIDTH, usize::max)
    };
    width = failures
        .iter()
        .map(|line| line.chars().count())
        .fold(width, usize::max);
    width += PADDING;

    let mut lines = vec![format!("│{}┐", pad("", '─', width))];
    if models.is_empty() {
        lines.push(format!("│{}│", pad(EMPTY_HINT, ' ', width)));
        lines.push(format!("├{}│", pad(&format!(" » cwd: {}", source_root), ' ', width)));
        lines.push(format!("├{}│", pad(&format!(" » ext: {}", parser.ext), ' ', width)));
    } else {
        let noun = if models.len() == 1 { "model" } else { "models" };
        lines.push(format!(
            "│{}│",
            pad(&format!(" Generated {} {}:", models.len(), noun), ' ', width)
        ));
        lines.push(format!("├{}┤", pad("", '─', width)));
        for (name, target) in &models {
            lines.push(format!(
                "├{}│",
                pad(&format!(" » {} ({})", name, target), ' ', width)
            ));
        }
    }

    if !failures.is_empty() {
        lines.push(format!("├{}┤", pad("", '─', width)));
        lines.push(format!(
            "│{}│",
            pad(&format!(" Failed {}:", failures.len()), ' ', width)
        ));
        for line in &failures {
            lines.push(format!("├{}│", pad(line, ' ', width)));
        }
    }

    lines.push(format!("└{}┘", pad("", '─', width)));
    let mut summary = lines.join("\n");
    summary.push('\n');
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use darmogen_codegen::EmittedFile;
    use darmogen_core::EntityIdentifier;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn parser() -> ParserConfig {
        ParserConfig::new("/proj/src", EntityIdentifier::decorator("Entity"))
    }

    #[test]
    fn test_summary_lists_models() {
        let mut outcome = RunOutcome::default();
        outcome.generation.written.push(EmittedFile {
            entity: "User".to_string(),
            target_file: PathBuf::from("/proj/out/user/user.dart"),
            content: String::new(),
        });

        let width = 32;
        let expected = [
            format!("│{}┐", "─".repeat(width)),
            format!("│{:<32}│", " Generated 1 model:"),
            format!("├{}┤", "─".repeat(width)),
            format!("├ » User (out/user/user.dart){}│", " ".repeat(4)),
            format!("└{}┘", "─".repeat(width)),
        ]
        .join("\n")
            + "\n";

        assert_eq!(
            render_summary(&outcome, Path::new("/proj"), &parser()),
            expected
        );
    }

    #[test]
    fn test_summary_hints_when_empty() {
        let summary = render_summary(&RunOutcome::default(), Path::new("/proj"), &parser());
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("No entities found"));
        assert!(lines[2].starts_with("├ » cwd: /proj/src"));
        assert!(lines[3].starts_with("├ » ext: .entity.ts"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }
}
