//! Grain value to Rundeck value maps
//!
//! Unrecognized values pass through unchanged.

const OS_FAMILY_MAP: [(&str, &str); 2] = [("Linux", "unix"), ("Windows", "windows")];
const OS_ARCH_MAP: [(&str, &str); 2] = [("x86_64", "amd64"), ("AMD64", "amd64")];

/// Map Salt's `kernel` grain onto a Rundeck `osFamily`.
pub fn map_family(value: &str) -> &str {
    OS_FAMILY_MAP
        .iter()
        .find(|(from, _)| *from == value)
        .map(|(_, to)| *to)
        .unwrap_or(value)
}

/// Map Salt's `cpuarch` grain onto a Rundeck `osArch`. Case-insensitive.
pub fn map_arch(value: &str) -> &str {
    OS_ARCH_MAP
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(value))
        .map(|(_, to)| *to)
        .unwrap_or(value)
}
