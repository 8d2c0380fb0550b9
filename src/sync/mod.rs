//! Offline-to-cloud synchronization: the reconciler core and its periodic
//! runner.

mod reconciler;
mod runner;

pub use reconciler::{
    KindReport, LocalEntryStore, LocalStoreError, RecordOutcome, RecordResult, SessionProvider,
    SyncError, SyncReconciler, SyncRecord, SyncReport,
};
pub use runner::{ConnectivityProbe, HttpConnectivityProbe, PeriodicRunner};
