use std::time::Duration;

use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::SqliteEntryStore;
use crate::models::RecordKind;
use crate::remote::{HttpRemoteStore, RemoteStoreError};
use crate::session::SessionStore;
use crate::sync::{
    ConnectivityProbe, HttpConnectivityProbe, PeriodicRunner, RecordOutcome, SyncReconciler,
    SyncReport,
};

/// Push unsynced entries to the sync server
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Check sync configuration and server reachability
    Status,

    /// Keep syncing on a schedule until interrupted
    Watch,
}

impl SyncCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        config: &Config,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.run_once(pool, config, session).await,
            Some(SyncSubcommand::Status) => self.status(config, session).await,
            Some(SyncSubcommand::Watch) => self.watch(pool, config).await,
        }
    }

    async fn run_once(
        &self,
        pool: &SqlitePool,
        config: &Config,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let remote = build_remote(config, session)?;
        let local = SqliteEntryStore::new(pool.clone());
        let store = SessionStore::new(config.session_path.clone());

        let reconciler = SyncReconciler::new(local, remote, store);
        let report = reconciler.reconcile().await?;

        if session.current_user_id().is_none() {
            println!("Not logged in; nothing was synced.");
            return Ok(());
        }

        print_report(&report);
        Ok(())
    }

    async fn status(
        &self,
        config: &Config,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match session.load() {
            Some(s) => println!("Session:    {} ({})", s.email, s.user_id),
            None => println!("Session:    not logged in"),
        }

        match config.sync.server_url.as_deref() {
            Some(url) => {
                println!("Server:     {}", url);
                let probe = HttpConnectivityProbe::new(url);
                if probe.is_connected().await {
                    println!("Reachable:  yes");
                } else {
                    println!("Reachable:  no");
                }
            }
            None => println!("Server:     not configured"),
        }
        Ok(())
    }

    async fn watch(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let store = SessionStore::new(config.session_path.clone());
        let remote = build_remote(config, &store)?;
        let local = SqliteEntryStore::new(pool.clone());
        let server_url = config
            .sync
            .server_url
            .as_deref()
            .ok_or(RemoteStoreError::NotConfigured)?;

        let runner = PeriodicRunner::new(
            SyncReconciler::new(local, remote, store),
            HttpConnectivityProbe::new(server_url),
        )
        .with_initial_delay(Duration::from_secs(config.sync.initial_delay_secs))
        .with_period(Duration::from_secs(config.sync.interval_hours * 3600));

        println!(
            "Watching for unsynced entries (every {}h, first run in {}s). Ctrl-C to stop.",
            config.sync.interval_hours, config.sync.initial_delay_secs
        );
        runner.run().await;
        Ok(())
    }
}

/// The session's API key wins over the config one, so a fresh login takes
/// effect without editing the config file.
fn build_remote(
    config: &Config,
    session: &SessionStore,
) -> Result<HttpRemoteStore, RemoteStoreError> {
    let server_url = config
        .sync
        .server_url
        .as_deref()
        .ok_or(RemoteStoreError::NotConfigured)?;

    let api_key = session
        .load()
        .map(|s| s.api_key)
        .or_else(|| config.sync.api_key.clone())
        .ok_or(RemoteStoreError::NotConfigured)?;

    Ok(HttpRemoteStore::new(server_url, api_key))
}

fn print_report(report: &SyncReport) {
    let total = report.synced_count() + report.failed_count();
    if total == 0 {
        println!("Everything is already in sync.");
        return;
    }

    for kind_report in &report.kinds {
        if kind_report.results.is_empty() {
            continue;
        }
        println!("{}:", label(kind_report.kind));
        for result in &kind_report.results {
            match &result.outcome {
                RecordOutcome::Synced => println!("  ✓ entry {}", result.id),
                RecordOutcome::Failed(reason) => {
                    println!("  ✗ entry {}: {}", result.id, reason)
                }
            }
        }
    }

    println!();
    println!(
        "Synced {} of {} record(s).",
        report.synced_count(),
        total
    );
    if report.failed_count() > 0 {
        println!("Failed records will be retried on the next run.");
    }
}

fn label(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Wellness => "Wellness",
        RecordKind::Exercise => "Exercise",
    }
}
