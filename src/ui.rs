use colored::{ColoredString, Colorize};
use workbench::{ClusterStatus, ComponentStatus};

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

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

/// One line per component: symbol, name, version or "not installed".
pub fn component(status: &ComponentStatus) {
    let symbol = if status.installed {
        "✓".green()
    } else {
        "✗".red()
    };
    let detail = component_detail(status);
    println!(
        "  {} {:<12} {}",
        symbol,
        status.component.name(),
        detail.dimmed()
    );
}

fn component_detail(status: &ComponentStatus) -> String {
    match (status.installed, status.version) {
        (true, Some(version)) => version.to_string(),
        (true, None) => "installed".to_string(),
        (false, _) => "not installed".to_string(),
    }
}

/// Cluster state, colored by health
pub fn cluster_status(status: ClusterStatus) -> ColoredString {
    match status {
        ClusterStatus::Running => status.as_str().green(),
        ClusterStatus::Stopped => status.as_str().yellow(),
        ClusterStatus::Crashed | ClusterStatus::NotResponding => status.as_str().red(),
    }
}

/// `1 product`, `2 products`
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench::{Component, SemanticVersion};

    fn status(installed: bool, version: Option<SemanticVersion>) -> ComponentStatus {
        ComponentStatus {
            component: Component::ClusterCli,
            installed,
            previously_installed: installed,
            version,
        }
    }

    #[test]
    fn test_component_detail() {
        assert_eq!(
            component_detail(&status(true, Some(SemanticVersion::new(1, 28, 2)))),
            "1.28.2"
        );
        assert_eq!(component_detail(&status(true, None)), "installed");
        assert_eq!(
            component_detail(&status(false, Some(SemanticVersion::new(1, 0, 0)))),
            "not installed"
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(count(0, "product"), "0 products");
        assert_eq!(count(1, "product"), "1 product");
        assert_eq!(count(3, "project"), "3 projects");
    }
}
