// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use report_graph::config::{load_config, load_values, RuntimeBuilder};
use report_graph::engine::ExecutionContext;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <pipeline.yaml> <values.json>", args[0]);
        eprintln!(
            "Example: {} configs/text-report.yaml configs/text-report.values.json",
            args[0]
        );
        process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2]).await {
        eprintln!("❌ {:#}", e);
        process::exit(1);
    }
}

async fn run(config_path: &str, values_path: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)
        .with_context(|| format!("loading pipeline '{}'", config_path))?;
    let values = load_values(values_path, &config)
        .with_context(|| format!("loading values '{}'", values_path))?;
    let runtime = RuntimeBuilder::from_config(&config)?;

    println!("{}", runtime.graph);
    println!();

    let context = Arc::new(ExecutionContext::with_random_job_id());
    let values = runtime.run(values, context.clone()).await?;

    println!("Job {} finished:", context.job_id());
    for timing in context.stats().timings() {
        println!("  {:<32} {:?}", timing.processor, timing.duration);
    }
    println!();
    println!("Values: {}", values.keys().join(", "));
    if let Ok(report) = values.get::<String>("report") {
        println!();
        println!("{}", report);
    }
    Ok(())
}
