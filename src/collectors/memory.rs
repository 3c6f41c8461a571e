//! Host memory usage.

use crate::types::MemoryInfo;

/// Prints `total used` in bytes.
pub const MEMORY_COMMAND: &str = "free -b | grep Mem | awk '{print $2,$3}'";

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parses the memory command output, falling back to [`MemoryInfo::zero`].
#[must_use]
pub fn parse_memory(lines: &[String]) -> MemoryInfo {
    try_parse_memory(lines).unwrap_or_else(MemoryInfo::zero)
}

fn try_parse_memory(lines: &[String]) -> Option<MemoryInfo> {
    let text = lines.join(" ");
    let mut fields = text.split_whitespace();
    let total: u64 = fields.next()?.parse().ok()?;
    let used: u64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || total == 0 {
        return None;
    }

    Some(MemoryInfo {
        used_gb: (used as f64 / GIB).round() as u64,
        total_gb: (total as f64 / GIB).round() as u64,
        percent: used as f64 / total as f64 * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_memory() {
        // 64 GiB total, 16 GiB used
        let mem = parse_memory(&["68719476736 17179869184".to_string()]);

        assert_eq!(mem.total_gb, 64);
        assert_eq!(mem.used_gb, 16);
        assert_relative_eq!(mem.percent, 25.0);
    }

    #[test]
    fn test_parse_memory_rounds_to_nearest_gb() {
        // 1.6 GiB used of 7.4 GiB
        let used = (1.6 * GIB) as u64;
        let total = (7.4 * GIB) as u64;
        let mem = parse_memory(&[format!("{total} {used}")]);

        assert_eq!(mem.used_gb, 2);
        assert_eq!(mem.total_gb, 7);
    }

    #[test]
    fn test_parse_memory_fallback() {
        assert_eq!(parse_memory(&[]), MemoryInfo::zero());
        assert_eq!(parse_memory(&["0 0".to_string()]), MemoryInfo::zero());
        assert_eq!(parse_memory(&["123".to_string()]), MemoryInfo::zero());
        assert_eq!(parse_memory(&["1 2 3".to_string()]), MemoryInfo::zero());
        assert_eq!(parse_memory(&["total used".to_string()]), MemoryInfo::zero());
    }
}
