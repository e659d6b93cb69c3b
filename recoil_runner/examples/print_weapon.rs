use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
struct Args {
    path: PathBuf,
    name: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let table = recoil_runner::load_weapon_table_from_path(&args.path)?;
    let weapon = table
        .get(&args.name)
        .ok_or_else(|| anyhow::anyhow!("no weapon named {}", args.name))?;
    println!("name={}", weapon.name);
    println!(
        "mags={}",
        weapon.mags.iter().map(|m| m.size.to_string()).collect::<Vec<_>>().join(",")
    );
    println!("shots={}", weapon.pattern.len());
    println!("duration_ms={}", weapon.time_points.last().copied().unwrap_or(0.0));
    Ok(())
}
