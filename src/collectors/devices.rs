//! Accelerator device queries.
//!
//! GPU hosts answer `nvidia-smi` CSV, XPU hosts answer `xpu-smi`'s
//! machine-readable table. Either way a record is all-or-nothing: a line that
//! fails to parse is dropped and the remaining devices are still reported.

use crate::types::{DeviceKind, DeviceMetric};

/// `index, memory.used, memory.total, utilization.gpu, temperature.gpu, power.draw`.
pub const GPU_COMMAND: &str = "nvidia-smi --query-gpu=index,memory.used,memory.total,utilization.gpu,temperature.gpu,power.draw --format=csv,noheader,nounits";

/// Whitespace-separated positional records, one per device.
pub const XPU_COMMAND: &str = "xpu-smi --machine-readable";

/// Minimum number of fields in an `xpu-smi` device record.
pub const XPU_MIN_FIELDS: usize = 32;

const XPU_ID: usize = 2;
const XPU_TEMP: usize = 4;
const XPU_POWER: usize = 8;
const XPU_MEM_USED: usize = 17;
const XPU_MEM_TOTAL: usize = 18;
const XPU_UTIL: usize = 19;

/// Device query for a host of the given kind.
#[must_use]
pub fn device_command(kind: DeviceKind) -> &'static str {
    match kind {
        DeviceKind::Gpu => GPU_COMMAND,
        DeviceKind::Xpu => XPU_COMMAND,
    }
}

/// Parses device output for `kind`, ordered by device id.
#[must_use]
pub fn parse_devices(kind: DeviceKind, lines: &[String]) -> Vec<DeviceMetric> {
    let mut devices = match kind {
        DeviceKind::Gpu => parse_gpu(lines),
        DeviceKind::Xpu => parse_xpu(lines),
    };
    devices.sort_by_key(|d| d.id);
    devices
}

/// Parses `nvidia-smi` CSV lines such as `0, 1024, 8192, 50, 60, 120.5`.
#[must_use]
pub fn parse_gpu(lines: &[String]) -> Vec<DeviceMetric> {
    lines.iter().filter_map(|line| parse_gpu_line(line)).collect()
}

/// Parses one `nvidia-smi` record; `None` if any field is missing or malformed.
#[must_use]
pub fn parse_gpu_line(line: &str) -> Option<DeviceMetric> {
    let fields: Vec<&str> = line.split(", ").map(str::trim).collect();
    let [id, used, total, util, temp, power] = fields.as_slice() else {
        return None;
    };

    Some(DeviceMetric {
        id: id.parse().ok()?,
        kind: DeviceKind::Gpu,
        used_mem_mb: used.parse().ok()?,
        total_mem_mb: total.parse().ok()?,
        util_percent: util.parse::<u32>().ok()?.min(100),
        temp_c: temp.parse().ok()?,
        power_w: parse_finite(power)?,
    })
}

/// Parses `xpu-smi --machine-readable` records.
#[must_use]
pub fn parse_xpu(lines: &[String]) -> Vec<DeviceMetric> {
    lines.iter().filter_map(|line| parse_xpu_line(line)).collect()
}

/// Parses one `xpu-smi` record; `None` for short or malformed lines.
#[must_use]
pub fn parse_xpu_line(line: &str) -> Option<DeviceMetric> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < XPU_MIN_FIELDS {
        return None;
    }

    Some(DeviceMetric {
        id: parts[XPU_ID].parse().ok()?,
        kind: DeviceKind::Xpu,
        used_mem_mb: parts[XPU_MEM_USED].parse().ok()?,
        total_mem_mb: parts[XPU_MEM_TOTAL].parse().ok()?,
        util_percent: parts[XPU_UTIL].parse::<u32>().ok()?.min(100),
        temp_c: parts[XPU_TEMP].parse().ok()?,
        power_w: parse_finite(parts[XPU_POWER])?,
    })
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn gpu_line() -> impl Strategy<Value = (String, u32)> {
        (0u32..64, 0u64..200_000, 1u64..200_000, 0u32..=100, -20i32..120, 0.0f64..1000.0)
            .prop_map(|(id, used, total, util, temp, power)| {
                (format!("{id}, {used}, {total}, {util}, {temp}, {power:.2}"), id)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Junk lines never reduce the number of valid devices recovered.
        #[test]
        fn prop_malformed_lines_do_not_affect_valid_ones(
            valid in prop::collection::vec(gpu_line(), 0..8),
            junk in prop::collection::vec("[a-z ,\\[\\]/]{0,30}", 0..8),
        ) {
            let mut output: Vec<String> = Vec::new();
            for (i, (line, _)) in valid.iter().enumerate() {
                output.push(line.clone());
                if let Some(j) = junk.get(i) {
                    output.push(j.clone());
                }
            }

            let parsed = parse_gpu(&output);
            prop_assert_eq!(parsed.len(), valid.len());
            for (dev, (_, id)) in parsed.iter().zip(valid.iter()) {
                prop_assert_eq!(dev.id, *id);
            }
        }

        /// Well-formed lines round-trip every field.
        #[test]
        fn prop_well_formed_line_recovers_fields(
            id in 0u32..64, used in 0u64..200_000, total in 1u64..200_000,
            util in 0u32..=100, temp in -20i32..120, power in 0u32..100_000,
        ) {
            let power = f64::from(power) / 100.0;
            let line = format!("{id}, {used}, {total}, {util}, {temp}, {power}");
            let dev = parse_gpu_line(&line).unwrap();

            prop_assert_eq!(dev.id, id);
            prop_assert_eq!(dev.used_mem_mb, used);
            prop_assert_eq!(dev.total_mem_mb, total);
            prop_assert_eq!(dev.util_percent, util);
            prop_assert_eq!(dev.temp_c, temp);
            prop_assert!((dev.power_w - power).abs() < 1e-9);
        }
    }
}
