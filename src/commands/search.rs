//! Interactive search over the manifest
//!
//! Every line read from stdin updates the query; updates are debounced so a
//! burst of lines only triggers one search. `#tag` toggles a tag filter,
//! `:clear` clears the tag filter and `:q` quits. At end of input the last
//! query is still applied.

use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::commands::list::format_list;
use crate::content::SiteContent;
use crate::search::{all_tags, SearchController, SearchHandle, SearchResults};
use crate::Blog;

/// A line of user input
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Query(&'a str),
    ToggleTag(&'a str),
    ClearTags,
    Quit,
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            ":q" | ":quit" => Input::Quit,
            ":clear" => Input::ClearTags,
            trimmed => match trimmed.strip_prefix('#') {
                Some(tag) if !tag.is_empty() => Input::ToggleTag(tag),
                _ => Input::Query(line),
            },
        }
    }

    fn apply(self, handle: &SearchHandle) {
        match self {
            Input::Query(query) => handle.set_query(query),
            Input::ToggleTag(tag) => handle.toggle_tag(tag),
            Input::ClearTags => handle.clear_tags(),
            Input::Quit => handle.shutdown(),
        }
    }
}

pub async fn run(blog: &Blog) -> Result<()> {
    let posts = SiteContent::new(blog).load_manifest()?;
    let total = posts.len();

    println!("Tags: {}", all_tags(&posts).join(", "));
    println!("Type to search, #tag to toggle a tag, :clear to reset tags, :q to quit.");

    let debounce = Duration::from_millis(blog.config.search.debounce_ms);
    let (handle, results) = SearchController::spawn(posts, debounce);

    let printer = tokio::spawn(print_results(
        results,
        total,
        blog.config.date_format.clone(),
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = Input::parse(&line);
        let quit = input == Input::Quit;
        input.apply(&handle);
        if quit {
            break;
        }
    }

    drop(handle);
    printer.await?;
    Ok(())
}

async fn print_results(mut results: watch::Receiver<SearchResults>, total: usize, date_format: String) {
    while results.changed().await.is_ok() {
        let snapshot = results.borrow_and_update().clone();
        let matches: Vec<_> = snapshot.posts.iter().collect();

        println!();
        if !snapshot.selected.is_empty() {
            println!("[tags: {}]", snapshot.selected.join(", "));
        }
        println!("{}", format_list(&matches, total, &date_format));
    }
}
