//! Plain-text hot method summary for terminals.

use crate::aggregator::filter::is_language_frame;
use crate::aggregator::metrics::HotMethod;

const FRAME_COLUMN: usize = 56;

fn get_ansi_color(frame: &str) -> &'static str {
    if is_language_frame(frame) {
        "\x1b[36m" // Cyan
    } else {
        "\x1b[90m" // Gray (native)
    }
}

/// Shorten a frame to `width` characters, keeping its tail (the method name)
fn truncate_frame(frame: &str, width: usize) -> String {
    let len = frame.chars().count();
    if len <= width {
        return frame.to_string();
    }
    let tail: String = frame.chars().skip(len - (width - 3)).collect();
    format!("...{}", tail)
}

/// Create a text summary table of the hottest methods
///
/// # Arguments
/// * `methods` - Ranked methods from `calculate_hot_methods`
/// * `total_samples` - Total samples of the tree the methods came from
/// * `title` - Heading printed above the table
pub fn generate_text_summary(methods: &[HotMethod], total_samples: u64, title: &str) -> String {
    let mut lines = Vec::new();
    let rule = "━".repeat(FRAME_COLUMN + 2);

    lines.push(format!("  🔥 {}", title));
    lines.push(format!("  ┏{}┳━━━━━━━━━━━━━━┳━━━━━━━━━┓", rule));
    lines.push(format!(
        "  ┃ {:<width$} ┃ {:^12} ┃ {:^7} ┃",
        "Method (Hottest First)",
        "SAMPLES",
        "%",
        width = FRAME_COLUMN
    ));
    lines.push(format!("  ┣{}╋━━━━━━━━━━━━━━╋━━━━━━━━━┫", rule));

    for method in methods {
        let color = get_ansi_color(&method.frame);
        let reset = "\x1b[0m";
        lines.push(format!(
            "  ┃ {}{:<width$}{} ┃ {:>12} ┃ {:>6.1}% ┃",
            color,
            truncate_frame(&method.frame, FRAME_COLUMN),
            reset,
            method.self_count,
            method.percentage,
            width = FRAME_COLUMN
        ));
    }

    lines.push(format!("  ┗{}┻━━━━━━━━━━━━━━┻━━━━━━━━━┛", rule));
    lines.push(format!("   Total samples: {}", total_samples));

    if methods.is_empty() {
        lines.push("   (no samples in this view)".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_methods() {
        let methods = vec![
            HotMethod {
                frame: "com.example.Parser//parse".to_string(),
                self_count: 75,
                percentage: 75.0,
            },
            HotMethod {
                frame: "memcpy".to_string(),
                self_count: 25,
                percentage: 25.0,
            },
        ];

        let summary = generate_text_summary(&methods, 100, "HOT METHODS");

        assert!(summary.contains("HOT METHODS"));
        assert!(summary.contains("com.example.Parser//parse"));
        assert!(summary.contains("75.0%"));
        assert!(summary.contains("Total samples: 100"));
    }

    #[test]
    fn test_summary_empty() {
        let summary = generate_text_summary(&[], 0, "HOT METHODS");
        assert!(summary.contains("no samples"));
    }

    #[test]
    fn test_truncate_frame_keeps_method_name() {
        let frame = format!("{}//run", "a.".repeat(40));
        let short = truncate_frame(&frame, 20);
        assert_eq!(short.chars().count(), 20);
        assert!(short.starts_with("..."));
        assert!(short.ends_with("//run"));
    }
}
