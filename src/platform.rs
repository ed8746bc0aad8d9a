//! Platform probe (§6 "Platform probe"): architecture tag and CPU model.
//!
//! An external collaborator to the measurement core, not part of its
//! normative contract — but a usable default implementation ships here,
//! built on `sysinfo`-based environment detection.

use sysinfo::System;

use crate::model::PlatformInfo;

/// Closed set of recognised platform tags (§6).
pub fn platform_tag() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x86_64",
        "aarch64" => "aarch64",
        "riscv64" => "riscv64",
        "riscv32" => "riscv32",
        "x86" => "i386",
        "arm" => "arm",
        _ => "unknown",
    }
}

/// Best-effort CPU model string and clock speed. Truncation and probe
/// failure never invalidate a result (§9): absent data is left empty/zero.
pub fn detect() -> PlatformInfo {
    let mut sys = System::new_all();
    sys.refresh_all();

    let cpu_model = sys
        .cpus()
        .first()
        .map(|c| c.brand().to_string())
        .unwrap_or_default();
    let cpu_freq_mhz = sys.cpus().first().map(|c| c.frequency() as u32).unwrap_or(0);

    PlatformInfo {
        platform_tag: platform_tag().to_string(),
        cpu_model,
        cpu_freq_mhz,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_tag_is_in_closed_set() {
        let tag = platform_tag();
        assert!(
            ["x86_64", "aarch64", "riscv64", "riscv32", "i386", "arm", "unknown"]
                .contains(&tag)
        );
    }

    #[test]
    fn detect_never_panics() {
        let info = detect();
        assert_eq!(info.platform_tag, platform_tag());
    }
}
