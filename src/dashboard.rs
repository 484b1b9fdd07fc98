//! Live dashboard state
//!
//! The dashboard derives everything the overview screen shows from three
//! inputs: the preference store, the settings, and storage. `snapshot` is a
//! pure recomputation at a given instant. `spawn` runs it on a worker thread
//! and recomputes whenever either store publishes a change.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::settings::Settings;
use crate::models::{month_key, Currency, DateRangeModel, DateRangeType, Transaction};
use crate::preferences::PreferenceStore;
use crate::reactive::Subject;
use crate::services::aggregation::{self, DayGroup, Totals, WholeAverageData};
use crate::services::budget::BudgetSummary;
use crate::services::{date_range, BudgetService, TransactionQuery};
use crate::storage::Storage;

/// Everything derived for one point in time
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub currency: Currency,
    pub range: DateRangeModel,
    pub label: String,
    pub transactions: Vec<Transaction>,
    pub groups: Vec<DayGroup>,
    pub totals: Totals,
    pub averages: WholeAverageData,
    /// Budgets for the current month
    pub budgets: Vec<BudgetSummary>,
}

pub struct Dashboard {
    storage: Arc<Storage>,
    prefs: Arc<PreferenceStore>,
    settings: Settings,
}

impl Dashboard {
    pub fn new(storage: Arc<Storage>, prefs: Arc<PreferenceStore>, settings: Settings) -> Self {
        Self {
            storage,
            prefs,
            settings,
        }
    }

    /// The active currency; unreadable preferences fall back to the default
    pub fn currency(&self) -> Currency {
        self.prefs.currency(&self.settings).unwrap_or_else(|e| {
            warn!(error = %e, "Could not read currency preference");
            Currency::find(&self.settings.default_currency).unwrap_or_default()
        })
    }

    /// The selected window resolved at `now`
    pub fn range(&self, now: DateTime<Utc>) -> DateRangeModel {
        let range_type = self.prefs.filter_type().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read date filter preference");
            DateRangeType::ThisMonth
        });
        let custom = self.prefs.custom_range().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read custom date range");
            (None, None)
        });
        date_range::resolve(range_type, custom, now, self.settings.week_start())
    }

    /// Transactions in the window, narrowed by the stored selections
    pub fn transactions(&self, range: &DateRangeModel) -> Vec<Transaction> {
        let fetched = TransactionQuery::from_preferences(&self.prefs, range)
            .and_then(|query| query.fetch(&self.storage.transactions));

        fetched.unwrap_or_else(|e| {
            warn!(error = %e, "Could not load transactions for the dashboard");
            Vec::new()
        })
    }

    pub fn budgets(&self, currency: &Currency, now: DateTime<Utc>) -> Vec<BudgetSummary> {
        let today = now.with_timezone(&Local).date_naive();
        let month = month_key(today);

        BudgetService::new(&self.storage)
            .evaluate_all(Some(&month), currency, today)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not load budgets for the dashboard");
                Vec::new()
            })
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let currency = self.currency();
        let range = self.range(now);
        let transactions = self.transactions(&range);
        let totals = aggregation::totals(&transactions);
        let week_start = self.settings.week_start();

        debug!(
            range = %range.range_type,
            transactions = transactions.len(),
            "Recomputed dashboard"
        );

        DashboardSnapshot {
            label: date_range::label(&range, &self.settings.date_format),
            groups: aggregation::group_by_day(&transactions, &currency, &self.settings.date_format),
            averages: aggregation::averages(&totals, &range, week_start, &currency),
            budgets: self.budgets(&currency, now),
            totals,
            transactions,
            range,
            currency,
        }
    }

    /// Recompute on a worker thread after every preference or data change
    ///
    /// An initial snapshot is computed before this returns.
    pub fn spawn(self) -> DashboardHandle {
        let (tx, rx) = mpsc::channel();
        self.storage.changes().forward(tx.clone(), |_| Signal::Changed);
        self.prefs.changes().forward(tx.clone(), |_| Signal::Changed);

        let updates: Arc<Subject<Arc<DashboardSnapshot>>> = Arc::new(Subject::new());
        let latest = Arc::new(RwLock::new(Arc::new(self.snapshot(Utc::now()))));

        let worker = {
            let updates = Arc::clone(&updates);
            let latest = Arc::clone(&latest);
            thread::spawn(move || self.run(rx, &updates, &latest))
        };

        DashboardHandle {
            stop: tx,
            updates,
            latest,
            worker: Some(worker),
        }
    }

    fn run(
        &self,
        rx: Receiver<Signal>,
        updates: &Subject<Arc<DashboardSnapshot>>,
        latest: &RwLock<Arc<DashboardSnapshot>>,
    ) {
        while let Ok(Signal::Changed) = rx.recv() {
            // Coalesce a burst of changes into one recomputation
            let mut stop = false;
            for signal in rx.try_iter() {
                if signal == Signal::Stop {
                    stop = true;
                }
            }
            if stop {
                break;
            }

            let snapshot = Arc::new(self.snapshot(Utc::now()));
            if let Ok(mut guard) = latest.write() {
                *guard = Arc::clone(&snapshot);
            }
            updates.publish(snapshot);
        }
        debug!("Dashboard worker stopped");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Changed,
    Stop,
}

/// A running dashboard. Dropping it stops the worker.
pub struct DashboardHandle {
    stop: Sender<Signal>,
    updates: Arc<Subject<Arc<DashboardSnapshot>>>,
    latest: Arc<RwLock<Arc<DashboardSnapshot>>>,
    worker: Option<JoinHandle<()>>,
}

impl DashboardHandle {
    /// Receive every snapshot computed from now on
    pub fn subscribe(&self) -> Receiver<Arc<DashboardSnapshot>> {
        self.updates.subscribe()
    }

    /// The most recent snapshot
    pub fn latest(&self) -> Arc<DashboardSnapshot> {
        match self.latest.read() {
            Ok(guard) => (*guard).clone(),
            Err(poisoned) => (*poisoned.into_inner()).clone(),
        }
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(Signal::Stop);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
