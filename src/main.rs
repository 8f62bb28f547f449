use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use serde_json::{json, Map, Value};

mod cipher;
mod codec;
mod dispatch;
mod errors;
mod factor;
mod field;
mod forge;
mod gcm;
mod poly;
mod utils;
mod xex;

/// Batch runner for GF(2^128) cryptanalysis actions.
///
/// Reads `{"testcases": {"<uuid>": {"action": ..., "arguments": ...}}}`
/// from the given file and prints `{"responses": {"<uuid>": ...}}` on
/// stdout. Diagnostics go to stderr.
#[derive(Parser)]
struct Args {
    /// Path to the JSON test-case file
    file: PathBuf,
}

/// Below this many cases the thread fan-out costs more than it saves.
const PARALLEL_THRESHOLD: usize = 50;

#[derive(serde::Deserialize)]
struct TestCase {
    action: String,
    arguments: Value,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let start = Instant::now();

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let input: Value = serde_json::from_str(&raw).context("failed to parse input JSON")?;
    let testcases = input
        .get("testcases")
        .and_then(Value::as_object)
        .ok_or_else(|| anyhow!("input has no testcases object"))?;
    let parse_time = start.elapsed();

    let (responses, mode) = if testcases.len() < PARALLEL_THRESHOLD {
        (run_sequential(testcases), "sequential")
    } else {
        (run_parallel(testcases), "parallel")
    };

    println!("{}", serde_json::to_string(&json!({ "responses": responses }))?);

    eprintln!("Processed {} test cases in {:.3?} ({mode})", testcases.len(), start.elapsed());
    eprintln!("File loading and parsing took {parse_time:.3?}");
    Ok(())
}

/// Run one test case; failures become an error response, never a crash of
/// the batch.
fn run_case(case: &Value) -> Value {
    let case: TestCase = match serde_json::from_value(case.clone()) {
        Ok(case) => case,
        Err(e) => return json!({ "error": format!("malformed test case: {e}") }),
    };
    match dispatch::handle(&case.action, &case.arguments) {
        Ok(result) => result,
        Err(e) => json!({ "error": e.to_string() }),
    }
}

fn run_sequential(testcases: &Map<String, Value>) -> Map<String, Value> {
    testcases
        .iter()
        .map(|(id, case)| (id.clone(), run_case(case)))
        .collect()
}

/// Cases are independent, so chunk them across the available cores.
/// Workers report per-case results keyed by UUID and the output is
/// reassembled in input order.
fn run_parallel(testcases: &Map<String, Value>) -> Map<String, Value> {
    let cases: Vec<(&String, &Value)> = testcases.iter().collect();
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let chunk_size = (cases.len() + workers - 1) / workers;
    let bar = ProgressBar::new(cases.len() as u64);

    let mut results: HashMap<String, Value> = HashMap::with_capacity(cases.len());
    std::thread::scope(|scope| {
        let handles: Vec<_> = cases
            .chunks(chunk_size.max(1))
            .map(|chunk| {
                let bar = &bar;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|(id, case)| {
                            let result = run_case(case);
                            bar.inc(1);
                            ((*id).clone(), result)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            match handle.join() {
                Ok(chunk_results) => results.extend(chunk_results),
                Err(_) => eprintln!("a worker thread panicked; its cases are reported as errors"),
            }
        }
    });
    bar.finish_and_clear();

    testcases
        .keys()
        .map(|id| {
            let result = results
                .remove(id)
                .unwrap_or_else(|| json!({ "error": "worker thread panicked" }));
            (id.clone(), result)
        })
        .collect()
}
