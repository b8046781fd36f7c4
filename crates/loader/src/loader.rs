use crate::chapter::{Chapter, ChapterId};
use crate::error::{ErrorKind, Result, SharedFailure};
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use quire_sanitize::{Policy, extract_title};
use quire_source::{ChapterPaths, SourceHandle};
use std::collections::HashMap;
use std::sync::Arc;
use time::UtcDateTime;
use tokio::sync::RwLock;
use tracing::instrument;

type Outcome = std::result::Result<Arc<Chapter>, SharedFailure>;
type PendingLoad = Shared<BoxFuture<'static, Outcome>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Number of chapters; valid identifiers are `1..=total`.
    pub total: u32,
    /// With caching disabled every load fetches, but titles are still remembered.
    pub cache_enabled: bool,
    pub default_title: String,
    pub paths: ChapterPaths,
}
impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            total: 21,
            cache_enabled: true,
            default_title: "Chapter".to_string(),
            paths: ChapterPaths::default(),
        }
    }
}

#[derive(Default)]
struct State {
    /// Bumped by every [`Loader::clear_cache`]; loads started under an older
    /// generation don't write their results back.
    generation: u64,
    chapters: HashMap<ChapterId, Arc<Chapter>>,
    titles: HashMap<ChapterId, String>,
    in_flight: HashMap<ChapterId, PendingLoad>,
}

struct Inner {
    options: LoaderOptions,
    policy: Arc<Policy>,
    source: SourceHandle,
    state: RwLock<State>,
}

/// Fetches, sanitizes and caches chapters by number.
///
/// Cloning is cheap and every clone shares the same cache, so construct one
/// per book and hand clones to whatever needs chapters.
///
/// Concurrent loads of the same chapter share a single fetch, which runs as
/// its own task: it completes (and fills the cache) even if every caller
/// waiting on it gives up. The state lock is never held across an `.await`.
///
/// # Examples
///
/// ```
/// use quire_loader::{Loader, LoaderOptions};
/// use quire_sanitize::Policy;
/// use quire_source::MockSource;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> quire_loader::error::Result<()> {
/// let source = Arc::new(MockSource::with_files([("chapters/chapter-01.html", "<h1>Arrival</h1><p>...</p>")]));
/// let loader = Loader::new(source, Arc::new(Policy::default()), LoaderOptions::default());
/// let chapter = loader.load(1).await?;
/// assert_eq!(chapter.title, "Arrival");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Loader {
    inner: Arc<Inner>,
}
impl Loader {
    pub fn new(source: SourceHandle, policy: Arc<Policy>, options: LoaderOptions) -> Self {
        let inner = Inner {
            options,
            policy,
            source,
            state: RwLock::new(State::default()),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn total(&self) -> u32 {
        self.inner.options.total
    }

    pub fn policy(&self) -> &Policy {
        &self.inner.policy
    }

    /// Check a chapter number against the configured range.
    pub fn chapter_id(&self, id: u32) -> Result<ChapterId> {
        let total = self.total();
        if id == 0 || id > total {
            exn::bail!(ErrorKind::InvalidIdentifier { id, total });
        }
        Ok(ChapterId::new(id))
    }

    /// Every valid chapter, in order.
    pub fn ids(&self) -> impl Iterator<Item = ChapterId> + use<> {
        (1..=self.total()).map(ChapterId::new)
    }

    /// Load a chapter, from the cache if possible.
    ///
    /// # Errors
    ///
    /// - [`InvalidIdentifier`](ErrorKind::InvalidIdentifier) if `id` is out
    ///   of range; nothing is fetched.
    /// - [`Fetch`](ErrorKind::Fetch) if the source couldn't deliver it.
    /// - [`Parse`](ErrorKind::Parse) if it had no markup at all.
    ///
    /// Failed loads leave the cache untouched and can simply be retried. The
    /// source's own error is kept as the cause.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self), fields(source = self.inner.source.name()))]
    pub async fn load(&self, id: u32) -> Result<Arc<Chapter>> {
        let id = self.chapter_id(id)?;
        let pending = {
            let mut state = self.inner.state.write().await;
            if self.inner.options.cache_enabled
                && let Some(chapter) = state.chapters.get(&id)
            {
                tracing::debug!("Cache hit");
                return Ok(chapter.clone());
            }
            match state.in_flight.get(&id) {
                Some(pending) => {
                    tracing::debug!("Joining in-flight load");
                    pending.clone()
                },
                None => {
                    tracing::debug!("Cache miss");
                    let task = tokio::spawn(self.clone().fetch_and_store(id, state.generation));
                    let pending = async move {
                        match task.await {
                            Ok(outcome) => outcome,
                            Err(err) => Err(SharedFailure::new(
                                exn::Exn::new(err).raise(ErrorKind::Fetch("load task did not complete".to_string())),
                            )),
                        }
                    }
                    .boxed()
                    .shared();
                    state.in_flight.insert(id, pending.clone());
                    pending
                },
            }
        };
        pending.await.map_err(|failure| failure.report())
    }

    /// Warm the cache in the background.
    ///
    /// Failures are logged and otherwise ignored. Must be called from within a
    /// Tokio runtime.
    pub fn preload(&self, id: u32) {
        let loader = self.clone();
        tokio::spawn(async move {
            if let Err(err) = loader.load(id).await {
                let kind: &ErrorKind = &err;
                tracing::warn!(id, error = %kind, "Could not preload chapter");
            }
        });
    }

    /// Preload the chapters either side of `id`, where they exist.
    pub fn preload_adjacent(&self, id: u32) {
        if id > 1 {
            self.preload(id - 1);
        }
        if id < self.total() {
            self.preload(id + 1);
        }
    }

    /// Title of a chapter, loading it only if it hasn't been loaded before.
    pub async fn get_title(&self, id: u32) -> Result<String> {
        let chapter_id = self.chapter_id(id)?;
        if let Some(title) = self.inner.state.read().await.titles.get(&chapter_id) {
            return Ok(title.clone());
        }
        Ok(self.load(id).await?.title.clone())
    }

    /// Titles of every chapter, in order, for building a table of contents.
    ///
    /// Chapters that fail to load are listed under their fallback title.
    #[instrument(skip(self))]
    pub async fn titles(&self) -> Vec<(ChapterId, String)> {
        let lookups = self.ids().map(|id| async move {
            let title = match self.get_title(id.get()).await {
                Ok(title) => title,
                Err(err) => {
                    let kind: &ErrorKind = &err;
                    tracing::warn!(%id, error = %kind, "Could not load chapter title");
                    self.fallback_title(id)
                },
            };
            (id, title)
        });
        join_all(lookups).await
    }

    pub async fn is_cached(&self, id: ChapterId) -> bool {
        self.inner.state.read().await.chapters.contains_key(&id)
    }

    /// Forget every loaded chapter and title.
    ///
    /// Loads already in flight still complete for whoever is waiting on them,
    /// but their results aren't cached.
    pub async fn clear_cache(&self) {
        let mut state = self.inner.state.write().await;
        state.generation += 1;
        state.chapters.clear();
        state.titles.clear();
        state.in_flight.clear();
        tracing::debug!(generation = state.generation, "Cache cleared");
    }

    fn fallback_title(&self, id: ChapterId) -> String {
        format!("{} {id}", self.inner.options.default_title)
    }

    async fn fetch_and_store(self, id: ChapterId, generation: u64) -> Outcome {
        let outcome = self.fetch_and_build(id).await.map_err(SharedFailure::new);
        let mut state = self.inner.state.write().await;
        if state.generation != generation {
            tracing::debug!(%id, "Cache cleared during load; discarding result");
            return outcome;
        }
        state.in_flight.remove(&id);
        if let Ok(chapter) = &outcome {
            state.titles.insert(id, chapter.title.clone());
            if self.inner.options.cache_enabled {
                state.chapters.insert(id, chapter.clone());
            }
        }
        outcome
    }

    async fn fetch_and_build(&self, id: ChapterId) -> Result<Arc<Chapter>> {
        let path = self.inner.options.paths.resolve(id.get()).map_err(|err| caused(err, ErrorKind::Fetch))?;
        let bytes = match self.inner.source.fetch(&path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(%id, path = %path.display(), error = ?err, "Fetch failed");
                return Err(caused(err, ErrorKind::Fetch));
            },
        };
        let document = quire_sanitize::clean(&bytes, &self.inner.policy).map_err(|err| caused(err, ErrorKind::Parse))?;
        let title = extract_title(&document, self.fallback_title(id));
        tracing::debug!(%id, %title, size = bytes.len(), "Loaded chapter");
        Ok(Arc::new(Chapter {
            id,
            title,
            content: document.to_html(),
            loaded_at: UtcDateTime::now(),
        }))
    }
}

/// Raise `err` under a kind that repeats its message.
fn caused<E>(err: exn::Exn<E>, kind: fn(String) -> ErrorKind) -> crate::error::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let reason = err.to_string();
    err.raise(kind(reason))
}
