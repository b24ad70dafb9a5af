use std::process::Command;

use anyhow::{Context, Result};

const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &["foundation"],
    &["observability"],
    &["runtime"],
    &["test-utils"],
];

/// Check that every `hostlink-common` tier compiles without the others.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} hostlink-common feature tiers...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");

        println!(
            "\n[{}/{}] cargo check -p hostlink-common --no-default-features --features {joined}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
        );

        let status = Command::new("cargo")
            .args(["check", "-p", "hostlink-common", "--no-default-features", "--features"])
            .arg(&joined)
            .status()
            .with_context(|| format!("Failed to run cargo check for '{joined}'"))?;

        if !status.success() {
            anyhow::bail!("Feature tier '{joined}' failed to compile");
        }

        println!("✅ Features '{joined}' compiled successfully");
    }

    println!("\n✅ All {} feature tiers compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
