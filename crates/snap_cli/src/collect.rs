//! `snapshots collect`: builds the workspace and assembles a snapshot.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use snap_bazel::BazelClient;
use snap_cache::{DelegatingCache, RequestMetadata};
use snap_collect::{CollectOptions, Collector, EventSource};
use snap_common::Snapshot;
use snap_config::{validate_config, SnapshotsConfig};
use tracing::info;

use crate::workspace::Context;
use crate::{BuildArgs, CollectArgs, GlobalArgs};

/// Runs the `snapshots collect` command.
pub async fn run(args: &CollectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;
    let snapshot = collect_snapshot(&args.build, &ctx).await?;
    let json = snapshot.to_json_pretty()?;

    if let Some(out) = &args.out {
        let path = ctx.resolve_path(out);
        std::fs::write(&path, &json)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        info!("wrote snapshot to {}", path.display());
    } else if !args.no_print {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&json)?;
        writeln!(stdout)?;
    }

    if args.push {
        let name = ctx.snapshot_name(args.name.as_deref()).await?;
        let meta = ctx.store()?.push(&name, &snapshot)?;
        info!("pushed snapshot of {} bytes: {}", meta.size, meta.path);
    }
    Ok(0)
}

/// Collects a snapshot with `args` layered over the workspace configuration.
pub async fn collect_snapshot(
    args: &BuildArgs,
    ctx: &Context,
) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let mut config = ctx.config.clone();
    apply_build_args(args, &mut config);
    validate_config(&config)?;

    let options = CollectOptions {
        output_group: config.bazel.output_group.clone(),
        metadata: RequestMetadata::parse(&config.cache.metadata)?,
        concurrency: config.cache.concurrency,
    };
    let cache = DelegatingCache::new(config.cache.tls)
        .with_timeout(config.cache.timeout_secs.map(Duration::from_secs));
    let collector = Collector::new(cache, options);

    let (collector, source) = match &args.build_events {
        Some(events) => (collector, EventSource::File(ctx.resolve_path(events))),
        None => {
            let bazel = bazel_client(&config, ctx)?;
            info!("bazel path: {}", bazel.program().display());
            info!("expression: {}", config.bazel.expression);
            (
                collector.with_bazel(bazel),
                EventSource::Build {
                    expression: config.bazel.expression.clone(),
                },
            )
        }
    };

    Ok(collector.collect(&source).await?)
}

fn apply_build_args(args: &BuildArgs, config: &mut SnapshotsConfig) {
    if let Some(path) = &args.bazel_path {
        config.bazel.path = Some(path.clone());
    }
    if let Some(bazelrc) = &args.bazelrc {
        config.bazel.bazelrc = Some(bazelrc.clone());
    }
    if let Some(expression) = &args.expression {
        config.bazel.expression = expression.clone();
    }
    if let Some(group) = &args.output_group {
        config.bazel.output_group = group.clone();
    }
    if args.bazel_stderr {
        config.bazel.stderr = true;
    }
    if args.cache_tls {
        config.cache.tls = true;
    }
    config.cache.metadata.extend(args.cache_metadata.iter().cloned());
    if let Some(concurrency) = args.concurrency {
        config.cache.concurrency = concurrency;
    }
}

fn bazel_client(
    config: &SnapshotsConfig,
    ctx: &Context,
) -> Result<BazelClient, Box<dyn std::error::Error>> {
    let client = match &config.bazel.path {
        Some(path) => BazelClient::new(path, &ctx.workspace),
        None => BazelClient::locate(&ctx.workspace)?,
    };
    let bazelrc: Option<PathBuf> = config.bazel.bazelrc.as_ref().map(|rc| ctx.resolve_path(rc));
    Ok(client
        .with_bazelrc(bazelrc)
        .with_stderr(config.bazel.stderr))
}
