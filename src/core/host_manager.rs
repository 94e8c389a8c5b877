use crate::errors::AppError;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Fleet hosts in the order they appear in the host list file.
#[derive(Debug, Clone, Default)]
pub struct HostManager {
    hosts: Vec<String>,
}

impl HostManager {
    pub fn from_host_list(text: &str) -> Self {
        let hosts = parse_host_list(text);
        debug!("🛠️ HostManager built with {} hosts.", hosts.len());
        HostManager { hosts }
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        debug!("📄 Reading host list from: {}", path.display());
        let start_time = Instant::now();
        if !path.exists() {
            return Err(AppError::NotFound(format!("Host list file '{}' does not exist", path.display())));
        }
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("Failed to read host list '{}': {}", path.display(), e)))?;
        let manager = Self::from_host_list(&text);
        info!("✅ Loaded {} hosts from '{}' in {:?}.", manager.hosts.len(), path.display(), start_time.elapsed());
        Ok(manager)
    }

    pub fn get_all_hosts(&self) -> Vec<String> {
        self.hosts.clone()
    }

    /// Hosts whose name contains the decimal form of any selector. This is a
    /// substring match: selector `1` picks `edge1` and `edge10` alike.
    pub fn get_hosts_matching(&self, selectors: &[u32]) -> Vec<String> {
        debug!("🔎 Selecting hosts by selectors: {:?}", selectors);
        let needles: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
        let mut seen = HashSet::new();
        let selected: Vec<String> = self
            .hosts
            .iter()
            .filter(|host| needles.iter().any(|needle| host.contains(needle.as_str())))
            .filter(|host| seen.insert(host.as_str()))
            .cloned()
            .collect();
        if selected.is_empty() {
            warn!("⚠️ No hosts matched selectors {:?}", selectors);
        }
        debug!("Selected hosts: {:?}", selected);
        selected
    }

    /// All hosts when no selectors were given, otherwise the matching subset.
    pub fn select(&self, selectors: Option<&[u32]>) -> Vec<String> {
        match selectors {
            Some(selectors) if !selectors.is_empty() => self.get_hosts_matching(selectors),
            _ => self.get_all_hosts(),
        }
    }
}

// Blank lines are dropped; surrounding whitespace is trimmed.
pub fn parse_host_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matches_by_substring() {
        let manager = HostManager::from_host_list("edge1\nedge2\nedge10\n");
        assert_eq!(manager.get_hosts_matching(&[1]), vec!["edge1", "edge10"]);
    }

    #[test]
    fn multiple_selectors_do_not_duplicate_hosts() {
        let manager = HostManager::from_host_list("edge1\nedge2\nedge12\nedge1\n");
        assert_eq!(manager.get_hosts_matching(&[1, 2]), vec!["edge1", "edge2", "edge12"]);
    }

    #[test]
    fn no_selectors_means_every_host_in_file_order() {
        let manager = HostManager::from_host_list("b\na\nc");
        assert_eq!(manager.select(None), vec!["b", "a", "c"]);
        assert_eq!(manager.select(Some(&[][..])), vec!["b", "a", "c"]);
    }

    #[test]
    fn unmatched_selector_selects_nothing() {
        let manager = HostManager::from_host_list("edge1\nedge2\n");
        assert!(manager.select(Some(&[7][..])).is_empty());
    }

    #[test]
    fn blank_lines_and_whitespace_are_dropped() {
        assert_eq!(parse_host_list("  edge1 \n\n\nedge2\r\n\n"), vec!["edge1", "edge2"]);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let result = HostManager::load(&tmp.path().join("HOSTS"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn load_reads_hosts_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("HOSTS");
        fs::write(&path, "edge1\nedge2\n").unwrap();
        let manager = HostManager::load(&path).unwrap();
        assert_eq!(manager.get_all_hosts(), vec!["edge1", "edge2"]);
    }
}
