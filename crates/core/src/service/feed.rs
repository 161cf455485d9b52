//! Run inputs built from the library.

use futures::{stream, Stream};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::library::{LibraryError, LibraryService};
use crate::media::{MediaEntry, MediaType};
use crate::processed::ProcessedStore;
use crate::processor::RunItem;

/// Items fetched per library page.
pub const PAGE_SIZE: u64 = 1000;

/// Episodes are small records, so they are fetched in bigger pages.
pub const EPISODE_PAGE_SIZE: u64 = 4000;

/// Consecutive skipped items reported as one batch.
pub const SKIP_BATCH: usize = 1000;

fn page_size(media_type: MediaType) -> u64 {
    if media_type == MediaType::Episode {
        EPISODE_PAGE_SIZE
    } else {
        PAGE_SIZE
    }
}

/// Walks whole library sections page by page.
///
/// With a processed store attached, items already processed under their
/// current label are not yielded; they are counted and reported as
/// [`RunItem::Skipped`] batches instead.
pub struct LibraryPager {
    library: Arc<dyn LibraryService>,
    processed: Option<Arc<dyn ProcessedStore>>,
    movieset_root: Option<String>,
    lists: Vec<(MediaType, u64)>,
    current: usize,
    offset: u64,
    page: VecDeque<Value>,
    skipped: usize,
    held: Option<MediaEntry>,
}

impl LibraryPager {
    /// Counts every section up front. Returns the pager and the total item count.
    pub async fn open(
        library: Arc<dyn LibraryService>,
        media_types: &[MediaType],
        processed: Option<Arc<dyn ProcessedStore>>,
        movieset_root: Option<String>,
    ) -> Result<(Self, usize), LibraryError> {
        let mut lists = Vec::with_capacity(media_types.len());
        for &media_type in media_types {
            let first = library.list_items(media_type, Some(0..1)).await?;
            debug!(media_type = %media_type, total = first.total, "Counted library items");
            lists.push((media_type, first.total));
        }
        let total = lists.iter().map(|(_, count)| *count as usize).sum();
        Ok((
            Self {
                library,
                processed,
                movieset_root,
                lists,
                current: 0,
                offset: 0,
                page: VecDeque::new(),
                skipped: 0,
                held: None,
            },
            total,
        ))
    }

    pub fn into_stream(self) -> impl Stream<Item = RunItem> + Send {
        stream::unfold(self, |mut pager| async move {
            let item = pager.next_item().await?;
            Some((item, pager))
        })
    }

    async fn next_item(&mut self) -> Option<RunItem> {
        if let Some(entry) = self.held.take() {
            return Some(RunItem::entry(entry));
        }
        loop {
            let Some(record) = self.page.pop_front() else {
                if self.fetch_page().await {
                    continue;
                }
                return self.flush_skipped();
            };
            let entry = match MediaEntry::from_json(&record, self.movieset_root.as_deref()) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed library record");
                    continue;
                }
            };
            if self.should_process(&entry) {
                if self.skipped > 0 {
                    self.held = Some(entry);
                    return self.flush_skipped();
                }
                return Some(RunItem::entry(entry));
            }
            self.skipped += 1;
            if self.skipped > SKIP_BATCH {
                return self.flush_skipped();
            }
        }
    }

    fn should_process(&self, entry: &MediaEntry) -> bool {
        let Some(processed) = &self.processed else {
            return true;
        };
        match processed.exists(entry.dbid, entry.media_type(), &entry.label) {
            Ok(exists) => !exists,
            Err(e) => {
                warn!(label = %entry.label, error = %e, "Could not check processed items");
                true
            }
        }
    }

    fn flush_skipped(&mut self) -> Option<RunItem> {
        match std::mem::take(&mut self.skipped) {
            0 => None,
            count => Some(RunItem::Skipped(count)),
        }
    }

    /// Loads the next non-empty page. Returns false when every section is
    /// exhausted or the library stops answering.
    async fn fetch_page(&mut self) -> bool {
        while let Some(&(media_type, total)) = self.lists.get(self.current) {
            if self.offset >= total {
                self.current += 1;
                self.offset = 0;
                continue;
            }
            let range = self.offset..self.offset + page_size(media_type);
            match self.library.list_items(media_type, Some(range)).await {
                Ok(page) if !page.items.is_empty() => {
                    self.offset += page.items.len() as u64;
                    self.page.extend(page.items);
                    return true;
                }
                Ok(_) => {
                    self.current += 1;
                    self.offset = 0;
                }
                Err(e) => {
                    error!(media_type = %media_type, error = %e, "Could not page through library");
                    self.current = self.lists.len();
                    return false;
                }
            }
        }
        false
    }
}

/// Recently added videos, fetched one by one.
///
/// An episode brings its season along, and a movie its movie set, each at
/// most once per feed.
pub struct RecentFeed {
    library: Arc<dyn LibraryService>,
    movieset_root: Option<String>,
    queue: VecDeque<(MediaType, i64)>,
    seasons: HashSet<i64>,
    sets: HashSet<i64>,
}

impl RecentFeed {
    pub fn new(
        library: Arc<dyn LibraryService>,
        items: impl IntoIterator<Item = (MediaType, i64)>,
        movieset_root: Option<String>,
    ) -> Self {
        Self {
            library,
            movieset_root,
            queue: items.into_iter().collect(),
            seasons: HashSet::new(),
            sets: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn into_stream(self) -> impl Stream<Item = RunItem> + Send {
        stream::unfold(self, |mut feed| async move {
            let item = feed.next_item().await?;
            Some((item, feed))
        })
    }

    async fn next_item(&mut self) -> Option<RunItem> {
        while let Some((media_type, dbid)) = self.queue.pop_front() {
            let record = match self.library.item_details(media_type, dbid).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(media_type = %media_type, dbid, error = %e, "Could not load recently added item");
                    continue;
                }
            };
            match media_type {
                MediaType::Episode => {
                    if let Some(season) = parent_id(&record, "seasonid") {
                        if self.seasons.insert(season) {
                            self.queue.push_front((MediaType::Season, season));
                        }
                    }
                }
                MediaType::Movie => {
                    if let Some(set) = parent_id(&record, "setid") {
                        if self.sets.insert(set) {
                            self.queue.push_front((MediaType::MovieSet, set));
                        }
                    }
                }
                _ => {}
            }
            match MediaEntry::from_json(&record, self.movieset_root.as_deref()) {
                Ok(entry) => return Some(RunItem::entry(entry)),
                Err(e) => warn!(media_type = %media_type, dbid, error = %e, "Skipping malformed library record"),
            }
        }
        None
    }
}

fn parent_id(record: &Value, key: &str) -> Option<i64> {
    record.get(key).and_then(Value::as_i64).filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processed::SqliteProcessedStore;
    use crate::testing::{fixtures, MockLibrary};
    use futures::StreamExt;
    use serde_json::json;

    fn describe(items: &[RunItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                RunItem::Entry(entry) => format!("{}:{}", entry.media_type(), entry.dbid),
                RunItem::Skipped(count) => format!("skipped:{}", count),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_pager_counts_and_walks_sections() {
        let library = Arc::new(MockLibrary::new());
        for dbid in 1..=3 {
            library
                .add_item(
                    MediaType::Movie,
                    fixtures::movie_record(dbid, &format!("Movie {}", dbid), &format!("/m/{}/m.mkv", dbid)),
                )
                .await;
        }
        library
            .add_item(MediaType::TvShow, fixtures::tvshow_record(9, "Firefly", "/tv/Firefly/"))
            .await;

        let (pager, total) = LibraryPager::open(library.clone(), &[MediaType::TvShow, MediaType::Movie], None, None)
            .await
            .unwrap();
        assert_eq!(total, 4);
        let items: Vec<RunItem> = pager.into_stream().collect().await;
        assert_eq!(describe(&items), vec!["tvshow:9", "movie:1", "movie:2", "movie:3"]);
    }

    #[tokio::test]
    async fn test_pager_batches_processed_items() {
        let library = Arc::new(MockLibrary::new());
        let store = Arc::new(SqliteProcessedStore::in_memory().unwrap());
        for dbid in 1..=5 {
            let title = format!("Movie {}", dbid);
            library
                .add_item(MediaType::Movie, fixtures::movie_record(dbid, &title, "/m/a.mkv"))
                .await;
            if dbid != 3 {
                store.set_data(dbid, MediaType::Movie, &title, None).unwrap();
            }
        }

        let (pager, total) = LibraryPager::open(library, &[MediaType::Movie], Some(store as Arc<dyn ProcessedStore>), None)
            .await
            .unwrap();
        assert_eq!(total, 5);
        let items: Vec<RunItem> = pager.into_stream().collect().await;
        assert_eq!(describe(&items), vec!["skipped:2", "movie:3", "skipped:2"]);
    }

    #[tokio::test]
    async fn test_pager_renamed_item_counts_as_new() {
        let library = Arc::new(MockLibrary::new());
        let store = Arc::new(SqliteProcessedStore::in_memory().unwrap());
        library
            .add_item(MediaType::Movie, fixtures::movie_record(1, "Alien", "/m/a.mkv"))
            .await;
        store.set_data(1, MediaType::Movie, "Alien (Director's Cut)", None).unwrap();

        let (pager, _) = LibraryPager::open(library, &[MediaType::Movie], Some(store as Arc<dyn ProcessedStore>), None)
            .await
            .unwrap();
        let items: Vec<RunItem> = pager.into_stream().collect().await;
        assert_eq!(describe(&items), vec!["movie:1"]);
    }

    #[tokio::test]
    async fn test_pager_count_failure() {
        let library = Arc::new(MockLibrary::new());
        library
            .set_next_error(LibraryError::ConnectionFailed("refused".to_string()))
            .await;
        let result = LibraryPager::open(library, &[MediaType::Movie], None, None).await;
        assert!(matches!(result, Err(LibraryError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_recent_feed_adds_parents_once() {
        let library = Arc::new(MockLibrary::new());
        let mut episode1 = fixtures::episode_record(11, 2, "Firefly", "Serenity", "/tv/Firefly/s01e01.mkv");
        episode1["seasonid"] = json!(5);
        let mut episode2 = fixtures::episode_record(12, 2, "Firefly", "The Train Job", "/tv/Firefly/s01e02.mkv");
        episode2["seasonid"] = json!(5);
        library.add_item(MediaType::Episode, episode1).await;
        library.add_item(MediaType::Episode, episode2).await;
        library
            .add_item(MediaType::Season, fixtures::season_record(5, 2, "Firefly", 1))
            .await;
        let mut movie = fixtures::movie_record(1, "Alien", "/m/Alien/Alien.mkv");
        movie["setid"] = json!(0);
        library.add_item(MediaType::Movie, movie).await;

        let feed = RecentFeed::new(
            library,
            [(MediaType::Episode, 11), (MediaType::Episode, 12), (MediaType::Movie, 1), (MediaType::Movie, 404)],
            None,
        );
        assert_eq!(feed.len(), 4);
        let items: Vec<RunItem> = feed.into_stream().collect().await;
        assert_eq!(describe(&items), vec!["episode:11", "season:5", "episode:12", "movie:1"]);
    }
}
