//! Driver around the board state machine.
//!
//! `BoardApp` owns the single `BoardState`, runs the effects transitions ask
//! for (persisting sources, reloading issues) and feeds loader events back
//! into the state machine as actions.

use crate::board::{transition, Action, BoardState, Effect, Transition};
use crate::config::Config;
use crate::data::default_sources;
use crate::integrations::loader::{self, FetchFn, LoadEvent, LoadSummary};
use crate::store::SourceStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError};

pub struct BoardApp {
    pub config: Arc<Config>,
    pub state: BoardState,
    store: SourceStore,
    fetch: FetchFn,
    /// Events of the current load; replaced (and the old one dropped) when a
    /// new load starts
    load_rx: Option<mpsc::Receiver<LoadEvent>>,
    pub last_summary: Option<LoadSummary>,
}

impl BoardApp {
    pub fn new(config: Config, store: SourceStore, fetch: FetchFn) -> Self {
        let state = config.board.initial_state();
        Self {
            config: Arc::new(config),
            state,
            store,
            fetch,
            load_rx: None,
            last_summary: None,
        }
    }

    /// Replay the saved sources (or the defaults) into the board, which
    /// starts the first load.
    pub fn bootstrap(&mut self) -> Result<()> {
        let sources = match self.store.load()? {
            Some(sources) => sources,
            None => {
                tracing::info!("No saved sources, using defaults");
                default_sources()
            }
        };
        self.dispatch(Action::SaveSources { sources })
    }

    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let Transition { state, effects } = transition(std::mem::take(&mut self.state), action);
        self.state = state;
        for effect in effects {
            self.run_effect(effect)?;
        }
        Ok(())
    }

    /// Dispatch an untyped `{"command": ...}` action
    pub fn dispatch_json(&mut self, value: serde_json::Value) -> Result<()> {
        let action = Action::from_json(value)?;
        self.dispatch(action)
    }

    fn run_effect(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::PersistSources(sources) => self
                .store
                .save(&sources)
                .with_context(|| format!("Failed to persist sources to {}", self.store.path().display())),
            Effect::ReloadIssues => {
                self.start_load();
                Ok(())
            }
        }
    }

    /// Start loading every source under a fresh epoch.
    ///
    /// A load already in flight is superseded: its receiver is dropped and
    /// any event it still produces is rejected by the epoch check.
    pub fn start_load(&mut self) {
        self.dispatch_internal(Action::LoadStart);
        let epoch = self.state.epoch();
        self.last_summary = None;
        self.load_rx = Some(loader::spawn_load(
            self.state.sources.clone(),
            epoch,
            self.config.loader.clone(),
            Arc::clone(&self.fetch),
        ));
    }

    pub fn is_loading(&self) -> bool {
        self.load_rx.is_some()
    }

    /// Apply every loader event available right now. Returns `true` once the
    /// current load has finished.
    pub fn poll_load(&mut self) -> bool {
        let Some(mut rx) = self.load_rx.take() else {
            return false;
        };

        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if self.apply_event(event) {
                        return true;
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.load_rx = Some(rx);
                    return false;
                }
                Err(TryRecvError::Disconnected) => {
                    self.abandon_load();
                    return true;
                }
            }
        }
    }

    /// Wait until the current load has finished
    pub async fn wait_for_load(&mut self) -> Option<&LoadSummary> {
        let mut rx = self.load_rx.take()?;
        loop {
            match rx.recv().await {
                Some(event) => {
                    if self.apply_event(event) {
                        break;
                    }
                }
                None => {
                    self.abandon_load();
                    break;
                }
            }
        }
        self.last_summary.as_ref()
    }

    /// Returns `true` when the event completes the current load
    fn apply_event(&mut self, event: LoadEvent) -> bool {
        let current = event.epoch() == self.state.epoch();
        let complete = matches!(event, LoadEvent::Complete { .. });
        if let LoadEvent::Complete { summary, .. } = &event {
            if current {
                self.last_summary = Some(summary.clone());
            }
        }
        self.dispatch_internal(event.into_action());
        current && complete
    }

    /// Loader stopped without saying it was done
    fn abandon_load(&mut self) {
        tracing::warn!("Loader for epoch {} stopped before completing", self.state.epoch());
        let epoch = self.state.epoch();
        self.dispatch_internal(Action::LoadComplete { epoch });
    }

    /// Loading actions never produce effects
    fn dispatch_internal(&mut self, action: Action) {
        let Transition { state, effects } = transition(std::mem::take(&mut self.state), action);
        self.state = state;
        debug_assert!(effects.is_empty());
    }
}
