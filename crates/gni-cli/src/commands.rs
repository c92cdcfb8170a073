use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context};
use colored::Colorize;
use gni_crypto::{derive_resource_id, encode_resource_id_as_content_address, ContentHash};
use gni_pipeline::{DispatchTable, Pipeline, PipelineConfig, RunReport, StreamValidator};
use gni_store::InMemoryEntityStore;
use gni_types::codec::hex_to_bytes;
use gni_types::{Address, RawEvent, U256};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Ingest(args) => cmd_ingest(args, format),
        Command::Verify(args) => cmd_verify(args, format),
        Command::DeriveId(args) => cmd_derive_id(args, format),
        Command::ContentHash(args) => cmd_content_hash(args, format),
    }
}

/// Read a JSON-lines event stream. Blank lines are ignored.
fn read_events(path: &Path) -> anyhow::Result<Vec<RawEvent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut events = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: RawEvent = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid event", path.display(), n + 1))?;
        events.push(event);
    }
    Ok(events)
}

fn cmd_ingest(args: IngestArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let events = read_events(&args.events)?;

    let mut pipeline = Pipeline::new(InMemoryEntityStore::new(), config);
    let report = pipeline.run(&events)?;
    let root = pipeline.store().state_root()?;

    if let Some(dump) = &args.dump {
        let snapshot = pipeline.store().snapshot()?;
        std::fs::write(dump, serde_json::to_string_pretty(&snapshot)?)
            .with_context(|| format!("writing {}", dump.display()))?;
    }

    match format {
        OutputFormat::Json => print_ingest_json(&report, &root.to_hex(), events.len()),
        OutputFormat::Text => print_ingest_text(&report, &root.short_hex(), events.len()),
    }

    if !report.is_clean() {
        bail!("{} event(s) rejected", report.failed.len());
    }
    Ok(())
}

fn print_ingest_text(report: &RunReport, root: &str, total: usize) {
    let mark = if report.is_clean() {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("{mark} Reconciled {total} events");
    println!("  Applied: {}", report.applied.to_string().bold());
    println!("  Skipped: {}", report.skipped);
    println!("  Rejected: {}", report.failed.len());
    if let Some(position) = report.last_position {
        println!("  Checkpoint: {}", position.to_string().yellow());
    }
    println!("  State root: {}", root.cyan());
    for failed in &report.failed {
        println!(
            "  {} {} {}: {}",
            "rejected".red(),
            failed.position.to_string().yellow(),
            failed.signature,
            failed.error
        );
    }
    if report.halted {
        println!("  {}", "halted at first rejected event".red());
    }
}

fn print_ingest_json(report: &RunReport, root: &str, total: usize) {
    let failed: Vec<_> = report
        .failed
        .iter()
        .map(|f| {
            json!({
                "position": f.position.to_string(),
                "signature": f.signature,
                "error": f.error.to_string(),
            })
        })
        .collect();
    let out = json!({
        "events": total,
        "applied": report.applied,
        "skipped": report.skipped,
        "failed": failed,
        "halted": report.halted,
        "checkpoint": report.last_position.map(|p| p.to_string()),
        "stateRoot": root,
    });
    println!("{out}");
}

fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let events = read_events(&args.events)?;
    let report = StreamValidator::validate(&events, &DispatchTable::standard());

    match format {
        OutputFormat::Json => {
            let violations: Vec<_> = report
                .violations
                .iter()
                .map(|v| {
                    json!({
                        "index": v.index,
                        "position": v.position.to_string(),
                        "kind": format!("{:?}", v.kind),
                        "description": v.description,
                    })
                })
                .collect();
            println!(
                "{}",
                json!({
                    "events": report.event_count,
                    "valid": report.is_valid(),
                    "violations": violations,
                })
            );
        }
        OutputFormat::Text => {
            if report.is_valid() {
                println!("{} Event stream verified", "✓".green().bold());
            } else {
                println!("{} Event stream has problems", "✗".red().bold());
            }
            println!("  Events: {}", report.event_count);
            println!("  Ordering: {}", verdict(report.ordered, "ordered", "out of order"));
            println!(
                "  Positions: {}",
                verdict(report.positions_unique, "unique", "duplicated")
            );
            println!(
                "  Signatures: {}",
                verdict(report.signatures_known, "known", "unknown")
            );
            for v in &report.violations {
                println!(
                    "  {} event {} at {}: {}",
                    format!("{:?}", v.kind).red(),
                    v.index,
                    v.position.to_string().yellow(),
                    v.description
                );
            }
        }
    }

    if !report.is_valid() {
        bail!("{} violation(s)", report.violations.len());
    }
    Ok(())
}

fn verdict(ok: bool, good: &str, bad: &str) -> colored::ColoredString {
    if ok {
        good.green()
    } else {
        bad.red()
    }
}

fn cmd_derive_id(args: DeriveIdArgs, format: OutputFormat) -> anyhow::Result<()> {
    let owner = Address::from_str(&args.owner)
        .with_context(|| format!("invalid owner address {}", args.owner))?;
    let nonce = U256::from_str(&args.nonce)
        .with_context(|| format!("invalid nonce {}", args.nonce))?;
    let id = derive_resource_id(&owner, nonce);
    let key = encode_resource_id_as_content_address(&id);

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "id": id.to_decimal(),
                "hex": format!("{:#x}", id.as_u256()),
                "key": key,
            })
        ),
        OutputFormat::Text => {
            println!("Id:  {}", id.to_decimal());
            println!("Hex: {}", format!("{:#x}", id.as_u256()).dimmed());
            println!("Key: {}", key.yellow().bold());
        }
    }
    Ok(())
}

fn cmd_content_hash(args: ContentHashArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = hex_to_bytes(&args.digest)?;
    let hash = ContentHash::from_digest_slice(&bytes)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "contentAddress": hash.to_base58() })),
        OutputFormat::Text => println!("{}", hash.to_base58().yellow().bold()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_events_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let event = json!({
            "contract": "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0",
            "signature": { "kind": "StakeDeposited", "version": "v1" },
            "params": [
                { "type": "address", "value": "0x0101010101010101010101010101010101010101" },
                { "type": "uint", "value": "0x3e8" }
            ],
            "block_number": 100,
            "block_timestamp": 1700000000,
            "transaction_hash": format!("0x{}", "ab".repeat(32)),
            "log_index": 0
        });
        std::fs::write(&path, format!("{event}\n\n{event}\n")).unwrap();

        let events = read_events(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].block_number, 100);
        assert_eq!(events[0].transaction_from, Address::ZERO);
    }

    #[test]
    fn read_events_reports_line_of_bad_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(&path, "{}\n").unwrap();
        let err = read_events(&path).unwrap_err();
        assert!(format!("{err:#}").contains(":1"));
    }
}
