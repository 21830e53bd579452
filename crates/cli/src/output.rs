//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Render a list of items; `None` when there is nothing to show
pub fn render_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let rendered = match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Plain => items
            .iter()
            .map(|item| item.row().join("\t"))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Some(rendered)
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match render_list(items, format) {
        Some(out) => println!("{}", out),
        None if matches!(format, OutputFormat::Json) => println!("[]"),
        None => println!("No items found."),
    }
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: String,
    }

    impl TableDisplay for Row {
        fn headers() -> Vec<&'static str> {
            vec!["Name"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.name.clone()]
        }
    }

    #[test]
    fn test_render_empty() {
        let rows: Vec<Row> = Vec::new();
        assert!(render_list(&rows, OutputFormat::Table).is_none());
    }

    #[test]
    fn test_render_plain_and_json() {
        let rows = vec![
            Row { name: "a.spec.ts".into() },
            Row { name: "b.spec.ts".into() },
        ];
        assert_eq!(render_list(&rows, OutputFormat::Plain).unwrap(), "a.spec.ts\nb.spec.ts");

        let json = render_list(&rows, OutputFormat::Json).unwrap();
        assert!(json.contains("\"name\": \"a.spec.ts\""));

        let table = render_list(&rows, OutputFormat::Table).unwrap();
        assert!(table.contains("Name") && table.contains("b.spec.ts"));
    }
}
