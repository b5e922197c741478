use std::path::PathBuf;

use circulation_core::storage::{CommitOutcome, Snapshot};

use crate::app::{open_store, resolve_config_path, AppContext, StoreTarget};
use crate::cli::InitArgs;
use crate::config::{default_store_path, write_config, CirculationConfig, StoreBackend};

/// Pick the store location for `init`: positional path, then `--store`,
/// then the XDG data directory.
fn init_target(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<StoreTarget> {
    let explicit = args
        .path
        .as_deref()
        .or(ctx.cli().store.as_deref())
        .map(PathBuf::from);

    let target = match explicit {
        Some(path) => {
            let backend = ctx
                .cli()
                .backend
                .unwrap_or_else(|| StoreBackend::infer(&path));
            StoreTarget { path, backend }
        }
        None => {
            let backend = ctx.cli().backend.unwrap_or(StoreBackend::Sqlite);
            StoreTarget {
                path: default_store_path(backend)?,
                backend,
            }
        }
    };
    Ok(target)
}

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let target = init_target(ctx, args)?;
    let existed = target.path.exists();

    if let Some(parent) = target.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create store directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }

    let store = open_store(&target)?;
    if !existed && target.backend == StoreBackend::Json {
        // Materialize the file so later commands can find it.
        if let CommitOutcome::Conflict { current } = store.commit(0, &Snapshot::default())? {
            return Err(anyhow::anyhow!(
                "Store at {} changed during init (version {})",
                target.path.display(),
                current
            ));
        }
    }
    tracing::info!(
        path = %target.path.display(),
        backend = store.backend(),
        existed,
        "store ready"
    );

    let config_path = match &args.config_path {
        Some(value) => PathBuf::from(value),
        None => resolve_config_path()?,
    };
    let wrote_config = if config_path.exists() && !args.force {
        false
    } else {
        let config = CirculationConfig::new(target.path.clone(), target.backend, None);
        write_config(&config_path, &config)?;
        true
    };

    if ctx.json() {
        let output = serde_json::json!({
            "store": target.path,
            "backend": target.backend,
            "created": !existed,
            "config": config_path,
            "config_written": wrote_config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !ctx.quiet() {
        if existed {
            println!("Using existing circulation store at {}", target.path.display());
        } else {
            println!("Initialized circulation store at {}", target.path.display());
        }
        if wrote_config {
            println!("Config: {}", config_path.display());
        } else {
            println!(
                "Config already exists at {} (use --force to overwrite)",
                config_path.display()
            );
        }
    }
    Ok(())
}
