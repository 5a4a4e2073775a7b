//! Command: print version information.
use std::io::Write;

/// Build version: `PROVISION_VERSION` or `git describe` at build time,
/// falling back to the crate version.
pub const VERSION: &str = match option_env!("PROVISION_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Write the version line to `out`.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn run(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "provision {VERSION}")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn prints_name_and_version() {
        let mut out = Vec::new();
        run(&mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with("provision "));
        assert!(line.ends_with('\n'));
        assert!(!VERSION.is_empty());
    }
}
