//! Version command implementation

use crate::error::Result;
use crate::project::Packaging;

/// Run version command
pub fn run() -> Result<()> {
    println!("sip-composer {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Minimum Rust: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("  Profile: {}", build_profile());
    println!(
        "  Packaging: {}",
        [
            Packaging::None,
            Packaging::Dir,
            Packaging::Zip,
            Packaging::Tar,
            Packaging::Tgz
        ]
        .map(|p| p.to_string())
        .join(", ")
    );

    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
