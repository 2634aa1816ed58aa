//! Main dependency resolver implementation
//!
//! The resolution session keeps an explicit stack for cycle detection and
//! accumulates every version constraint seen per path, so a later branch
//! of the graph can tighten (and re-select) an earlier choice. Each fetch
//! commits its cache entry as it completes and the session records the
//! keys it created; a failed resolution removes them again, leaving no
//! cache entries behind.

use crate::{PackageMetadata, ResolutionResult, ResolvedPackage};
use pakt_config::Config;
use pakt_errors::{Error, ManifestError, PackageError};
use pakt_manifest::Manifest;
use pakt_net::{NetClient, NetConfig};
use pakt_store::{OverrideStore, PackageCache};
use pakt_types::{PackageId, PackagePath, UnresolvedPackage, VersionSpec};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Dependency resolver
#[derive(Clone)]
pub struct Resolver {
    metadata: Arc<dyn PackageMetadata>,
    cache: PackageCache,
    overrides: OverrideStore,
    net: NetClient,
    config: Config,
}

#[derive(Default)]
struct Session {
    stack: Vec<PackagePath>,
    constraints: HashMap<PackagePath, Vec<VersionSpec>>,
    chosen: HashMap<PackagePath, PackageId>,
    nodes: HashMap<PackageId, ResolvedPackage>,
    /// Cache keys this session created, removed again if it fails
    committed: Vec<String>,
}

impl Resolver {
    #[must_use]
    pub fn new(
        metadata: Arc<dyn PackageMetadata>,
        cache: PackageCache,
        overrides: OverrideStore,
        net: NetClient,
        config: Config,
    ) -> Self {
        Self {
            metadata,
            cache,
            overrides,
            net,
            config,
        }
    }

    /// Build a resolver whose cache, override store and network client
    /// all derive from configuration.
    ///
    /// # Errors
    ///
    /// Returns errors from creating the storage root, loading the
    /// persisted override store, or initializing the HTTP client.
    pub async fn from_config(
        metadata: Arc<dyn PackageMetadata>,
        config: Config,
    ) -> Result<Self, Error> {
        let storage = config.storage_dir();
        tokio::fs::create_dir_all(&storage)
            .await
            .map_err(|e| Error::io_with_path(&e, &storage))?;

        let cache = PackageCache::new(&storage);
        let overrides = OverrideStore::load(&storage).await?;
        let net = NetClient::new(NetConfig {
            timeout: Duration::from_secs(config.network.timeout),
            retry_count: config.network.retries,
            retry_delay: Duration::from_secs(config.network.retry_delay),
            ..NetConfig::default()
        })?;
        Ok(Self::new(metadata, cache, overrides, net, config))
    }

    /// The override store backing this resolver
    #[must_use]
    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    /// Resolve a set of requested references into a dependency graph.
    ///
    /// # Errors
    ///
    /// Graph errors (`NoMatchingVersion`, `VersionConflict`,
    /// `CyclicDependency`) abort the whole request; no partial graph is
    /// returned and cache entries created along the way are removed.
    pub async fn resolve(
        &self,
        requests: &[UnresolvedPackage],
    ) -> Result<ResolutionResult, Error> {
        let mut session = Session::default();

        let outcome = async {
            for request in requests {
                self.resolve_one(request, &mut session).await?;
            }
            Ok::<(), Error>(())
        }
        .await;

        match outcome {
            Ok(()) => {
                // Re-selection may have replaced an identity chosen for an
                // earlier request, so roots come from the final choices.
                let mut roots = Vec::with_capacity(requests.len());
                for request in requests {
                    let id = session.chosen.get(&request.path).cloned().ok_or_else(|| {
                        Error::internal(format!("no resolution recorded for {}", request.path))
                    })?;
                    roots.push(id);
                }
                let mut result = ResolutionResult {
                    nodes: session.nodes,
                    roots,
                };
                prune_unreachable(&mut result);
                Ok(result)
            }
            Err(e) => {
                // Undo the entries this session created so a failed
                // resolution leaves the cache as it found it.
                for key in &session.committed {
                    let _guard = self.cache.lock(key).await;
                    self.cache.remove_entry(key).await;
                }
                Err(e)
            }
        }
    }

    async fn resolve_one(
        &self,
        request: &UnresolvedPackage,
        session: &mut Session,
    ) -> Result<PackageId, Error> {
        if let Some(pos) = session.stack.iter().position(|p| p == &request.path) {
            let mut cycle: Vec<String> =
                session.stack[pos..].iter().map(ToString::to_string).collect();
            cycle.push(request.path.to_string());
            return Err(PackageError::CyclicDependency { cycle }.into());
        }

        // Overrides outrank everything: no version matching, no network.
        if let Some((id, dir)) = self.overrides.lookup(&request.path) {
            if let Some(existing) = session.chosen.get(&request.path) {
                return Ok(existing.clone());
            }
            debug!(package = %id, dir = %dir.display(), "override hit");
            let dependencies = self.expand(&id, &dir, session).await?;
            session.nodes.insert(
                id.clone(),
                ResolvedPackage {
                    directory: dir,
                    dependencies,
                },
            );
            session.chosen.insert(request.path.clone(), id.clone());
            return Ok(id);
        }

        session
            .constraints
            .entry(request.path.clone())
            .or_default()
            .push(request.range.clone());

        if let Some(existing) = session.chosen.get(&request.path).cloned() {
            if request.range.matches(&existing.version) {
                return Ok(existing);
            }
            return self.reselect(request, existing, session).await;
        }

        let id = self.select(&request.path, &request.range, session).await?;
        let directory = self.fetch(&id, session).await?;
        let dependencies = self.expand(&id, &directory, session).await?;
        session.nodes.insert(
            id.clone(),
            ResolvedPackage {
                directory,
                dependencies,
            },
        );
        session.chosen.insert(request.path.clone(), id.clone());
        Ok(id)
    }

    /// Pick the highest available version satisfying every constraint
    /// seen so far for the path.
    async fn select(
        &self,
        path: &PackagePath,
        range: &VersionSpec,
        session: &Session,
    ) -> Result<PackageId, Error> {
        let versions = self.metadata.available_versions(path).await?;
        let specs = session
            .constraints
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let satisfying_all = versions
            .iter()
            .filter(|v| specs.iter().all(|s| s.matches(v)))
            .max();

        if let Some(version) = satisfying_all {
            return Ok(PackageId::new(path.clone(), version.clone()));
        }

        // Nothing satisfies the accumulated set: classify the failure.
        if versions.iter().any(|v| range.matches(v)) {
            let details = specs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" and ");
            Err(PackageError::VersionConflict {
                path: path.to_string(),
                details,
            }
            .into())
        } else {
            Err(PackageError::NoMatchingVersion {
                path: path.to_string(),
                range: range.to_string(),
            }
            .into())
        }
    }

    /// An earlier choice no longer satisfies a new constraint: pick the
    /// highest version satisfying the whole set and redo that package.
    async fn reselect(
        &self,
        request: &UnresolvedPackage,
        old: PackageId,
        session: &mut Session,
    ) -> Result<PackageId, Error> {
        let id = self.select(&request.path, &request.range, session).await?;
        warn!(package = %request.path, old = %old.version, new = %id.version,
            "re-selecting to satisfy tightened constraints");

        session.nodes.remove(&old);
        session.chosen.remove(&request.path);

        let directory = self.fetch(&id, session).await?;
        let dependencies = self.expand(&id, &directory, session).await?;
        session.nodes.insert(
            id.clone(),
            ResolvedPackage {
                directory,
                dependencies,
            },
        );
        session.chosen.insert(request.path.clone(), id.clone());

        // Dependents recorded the old identity; point them at the new one.
        for node in session.nodes.values_mut() {
            if node.dependencies.remove(&old) {
                node.dependencies.insert(id.clone());
            }
        }
        Ok(id)
    }

    /// Fetch-or-cache a concrete identity, returning its directory.
    ///
    /// The per-key guard is held only for the duration of this one fetch.
    /// Holding guards across the whole session would let two sessions
    /// fetching overlapping keys in opposite orders wait on each other
    /// forever.
    async fn fetch(&self, id: &PackageId, session: &mut Session) -> Result<PathBuf, Error> {
        let source = self.metadata.source_for(id).await?.apply_version(&id.version);
        source.validate()?;
        let key = source.source_hash();

        let _guard = self.cache.lock(&key).await;

        if self.cache.has_entry(&key).await {
            debug!(package = %id, key, "cache hit");
            return Ok(self.cache.entry_path(&key));
        }

        let staging = self.cache.begin_staging(&key).await?;
        info!(package = %id, source = source.kind(), "fetching");
        match source
            .download(&self.net, &staging, self.config.resolver.max_file_size)
            .await
        {
            Ok(()) => {
                let dir = self.cache.commit(&key).await?;
                session.committed.push(key);
                Ok(dir)
            }
            Err(e) => {
                self.cache.abort(&key).await;
                Err(e)
            }
        }
    }

    /// Read a resolved tree's manifest and resolve its declared
    /// dependencies, in declaration order. A tree without a manifest
    /// declares nothing.
    async fn expand(
        &self,
        id: &PackageId,
        dir: &std::path::Path,
        session: &mut Session,
    ) -> Result<BTreeSet<PackageId>, Error> {
        session.stack.push(id.path.clone());
        let result = self.expand_inner(dir, session).await;
        session.stack.pop();
        result
    }

    async fn expand_inner(
        &self,
        dir: &std::path::Path,
        session: &mut Session,
    ) -> Result<BTreeSet<PackageId>, Error> {
        let declared = match Manifest::load(dir).await {
            Ok(manifest) => manifest.declared_dependencies()?,
            Err(Error::Manifest(ManifestError::NotFound { .. })) => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut dependencies = BTreeSet::new();
        for dep in declared {
            let child = Box::pin(self.resolve_one(&dep, session)).await?;
            dependencies.insert(child);
        }
        Ok(dependencies)
    }
}

/// Drop nodes that became unreachable after re-selection replaced part
/// of the graph.
fn prune_unreachable(result: &mut ResolutionResult) {
    let mut reachable: HashSet<PackageId> = HashSet::new();
    let mut queue: Vec<PackageId> = result.roots.clone();
    while let Some(id) = queue.pop() {
        if !reachable.insert(id.clone()) {
            continue;
        }
        if let Some(node) = result.nodes.get(&id) {
            queue.extend(node.dependencies.iter().cloned());
        }
    }
    result.nodes.retain(|id, _| reachable.contains(id));
}
