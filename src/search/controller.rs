//! Debounced search state
//!
//! A [`SearchController`] runs as a tokio task that owns the current query
//! and tag selection. Query edits arriving in quick succession are collapsed
//! so only the last one is filtered; submits and tag toggles apply at once.
//! Each applied change publishes fresh [`SearchResults`] on a watch channel.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

use super::{filter, SelectedTags};
use crate::content::PostSummary;

/// Snapshot published after every applied change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Query the posts were filtered with
    pub query: String,
    /// Selected tags, sorted
    pub selected: Vec<String>,
    /// Matching posts, in manifest order
    pub posts: Vec<PostSummary>,
}

#[derive(Debug)]
enum Command {
    SetQuery(String),
    Submit(String),
    ToggleTag(String),
    ClearTags,
    Shutdown,
}

/// Cheap, cloneable sender of search commands
#[derive(Debug, Clone)]
pub struct SearchHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SearchHandle {
    /// Update the query once no further update arrives within the debounce window
    pub fn set_query(&self, query: impl Into<String>) {
        self.send(Command::SetQuery(query.into()));
    }

    /// Apply a query immediately, dropping any pending debounced one
    pub fn submit(&self, query: impl Into<String>) {
        self.send(Command::Submit(query.into()));
    }

    pub fn toggle_tag(&self, tag: impl Into<String>) {
        self.send(Command::ToggleTag(tag.into()));
    }

    pub fn clear_tags(&self) {
        self.send(Command::ClearTags);
    }

    /// Stop the controller task
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.tx.send(command) {
            tracing::debug!("Search controller has stopped, dropping {:?}", e.0);
        }
    }
}

/// State owned by the background search task
pub struct SearchController {
    posts: Vec<PostSummary>,
    query: String,
    selected: SelectedTags,
    debounce: Duration,
    results: watch::Sender<SearchResults>,
}

impl SearchController {
    /// Start the controller on the current tokio runtime.
    ///
    /// The receiver starts out holding every post; it sees a new value each
    /// time the query or tag selection takes effect. The task ends on
    /// [`SearchHandle::shutdown`], or once every handle has been dropped,
    /// after applying any query still waiting out the debounce window.
    pub fn spawn(
        posts: Vec<PostSummary>,
        debounce: Duration,
    ) -> (SearchHandle, watch::Receiver<SearchResults>) {
        let initial = SearchResults {
            posts: posts.clone(),
            ..Default::default()
        };
        let (results, results_rx) = watch::channel(initial);
        let (tx, rx) = mpsc::unbounded_channel();

        let controller = Self {
            posts,
            query: String::new(),
            selected: SelectedTags::new(),
            debounce,
            results,
        };
        tokio::spawn(controller.run(rx));

        (SearchHandle { tx }, results_rx)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        let mut pending: Option<(String, Instant)> = None;

        loop {
            let deadline = pending.as_ref().map(|(_, deadline)| *deadline);
            let command = match deadline {
                Some(deadline) => {
                    tokio::select! {
                        command = rx.recv() => command,
                        _ = sleep_until(deadline) => {
                            if let Some((query, _)) = pending.take() {
                                self.query = query;
                                self.publish();
                            }
                            continue;
                        }
                    }
                }
                None => rx.recv().await,
            };

            match command {
                Some(Command::SetQuery(query)) => {
                    pending = Some((query, Instant::now() + self.debounce));
                }
                Some(Command::Submit(query)) => {
                    pending = None;
                    self.query = query;
                    self.publish();
                }
                Some(Command::ToggleTag(tag)) => {
                    self.selected.toggle(&tag);
                    self.publish();
                }
                Some(Command::ClearTags) => {
                    self.selected.clear();
                    self.publish();
                }
                Some(Command::Shutdown) => break,
                None => {
                    // Every handle is gone; let the last typed query land.
                    if let Some((query, _)) = pending.take() {
                        self.query = query;
                        self.publish();
                    }
                    break;
                }
            }
        }

        tracing::debug!("Search controller stopped");
    }

    fn publish(&self) {
        let posts: Vec<PostSummary> = filter(&self.posts, &self.query, &self.selected)
            .into_iter()
            .cloned()
            .collect();

        tracing::debug!(
            "Search {:?} with {} tag(s): {} of {} posts",
            self.query,
            self.selected.len(),
            posts.len(),
            self.posts.len()
        );

        self.results.send_replace(SearchResults {
            query: self.query.clone(),
            selected: self.selected.iter().map(str::to_string).collect(),
            posts,
        });
    }
}
