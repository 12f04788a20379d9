//! MAC address notation conversions.
//!
//! Device output renders hardware addresses in one of three conventions:
//! colon (`00:aa:11:bb:22:cc`), hyphen (`00-aa-11-bb-22-cc`) and dot
//! (`00aa.11bb.22cc`). Each conversion returns its input unchanged when the
//! target delimiter is already present, so converting twice is a no-op.
//!
//! Hex content is not validated here; the extraction patterns upstream only
//! ever capture well-formed addresses, and anything else regroups to
//! equally malformed output rather than an error.

fn hex_digits(address: &str) -> String {
    address
        .chars()
        .filter(|c| !matches!(c, ':' | '.' | '-'))
        .collect()
}

fn regroup(address: &str, group_len: usize, delimiter: &str) -> String {
    hex_digits(address)
        .as_bytes()
        .chunks(group_len)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Renders `address` as six colon-separated 2-digit groups.
pub fn colon_mac(address: &str) -> String {
    if address.contains(':') {
        return address.to_string();
    }
    regroup(address, 2, ":")
}

/// Renders `address` as six hyphen-separated 2-digit groups.
pub fn hyphen_mac(address: &str) -> String {
    if address.contains('-') {
        return address.to_string();
    }
    regroup(address, 2, "-")
}

/// Renders `address` as three dot-separated 4-digit groups.
pub fn dot_mac(address: &str) -> String {
    if address.contains('.') {
        return address.to_string();
    }
    regroup(address, 4, ".")
}
