//! Host CPU utilization.

/// Sums the non-idle share of every `Cpu(s)` line `top` prints.
pub const CPU_COMMAND: &str = "top -bn1 | grep 'Cpu(s)' | awk '{print 100 - $8}' | paste -sd+ | bc";

/// Value reported when the CPU query yields nothing usable.
pub const CPU_FALLBACK: f64 = 0.0;

/// Parses the CPU command output, falling back to [`CPU_FALLBACK`].
#[must_use]
pub fn parse_cpu(lines: &[String]) -> f64 {
    try_parse_cpu(lines).unwrap_or(CPU_FALLBACK)
}

fn try_parse_cpu(lines: &[String]) -> Option<f64> {
    let value: f64 = lines.join("\n").trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
