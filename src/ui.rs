use colored::Colorize;
use reconcile::Value;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Render a field value for display
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None => "(unset)".to_string(),
        Some(Value::String(s)) if s.is_empty() => "(unset)".to_string(),
        Some(Value::String(s)) => format!("\"{s}\""),
        Some(other) => other.to_string(),
    }
}

/// "1 monitor" / "2 monitors"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "(unset)");
        assert_eq!(format_value(Some(&Value::from(""))), "(unset)");
        assert_eq!(format_value(Some(&Value::from("/health"))), "\"/health\"");
        assert_eq!(format_value(Some(&Value::Int(10))), "10");
        assert_eq!(format_value(Some(&Value::Bool(false))), "false");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "monitor"), "1 monitor");
        assert_eq!(plural(0, "monitor"), "0 monitors");
        assert_eq!(plural(3, "change"), "3 changes");
    }
}
