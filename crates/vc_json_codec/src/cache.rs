//! The codec cache of a [`Marshaller`](crate::Marshaller).

use core::any::TypeId;
use core::hash::{BuildHasher, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use log::{debug, trace, warn};
use vc_json_reflect::info::TypeInfo;

use crate::codec::{self, CodecRef, DeferredCodec};
use crate::{Error, IOConfig};

// -----------------------------------------------------------------------------
// NoOpHash

/// A hasher passing a single `u64` through, `TypeId` already is a hash.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

type CodecMap = HashMap<TypeId, CodecRef, NoOpHashState>;

// -----------------------------------------------------------------------------
// Cache

#[derive(Default)]
struct Codecs {
    /// Codecs usable at any path.
    shared: CodecMap,
    /// Codecs built under a path with exclusions below it.
    scoped: HashMap<Box<str>, CodecMap, FixedState>,
}

impl Codecs {
    fn scope(&self, scope: Option<&str>) -> Option<&CodecMap> {
        match scope {
            None => Some(&self.shared),
            Some(path) => self.scoped.get(path),
        }
    }

    fn scope_mut(&mut self, scope: Option<&str>) -> &mut CodecMap {
        match scope {
            None => &mut self.shared,
            Some(path) => self.scoped.entry_ref(path).or_default(),
        }
    }
}

/// A map from (path, type) to codec.
///
/// Lookups take a shared lock only. A miss installs a [`DeferredCodec`] and builds
/// outside of the lock, so concurrent misses of the same key wait on the
/// placeholder while unrelated keys build in parallel.
pub(crate) struct Cache {
    config: IOConfig,
    codecs: RwLock<Codecs>,
}

impl Cache {
    pub fn new(config: IOConfig) -> Self {
        Self {
            config,
            codecs: RwLock::new(Codecs::default()),
        }
    }

    #[inline]
    pub fn config(&self) -> &IOConfig {
        &self.config
    }

    /// Returns the codec of `info` at output path `path`, building it on a miss.
    ///
    /// A type is cached per path only if some exclusion lies below that path.
    /// Failures are not cached.
    pub fn get_or_build(&self, info: &'static TypeInfo, path: &str) -> Result<CodecRef, Error> {
        let scope = self.config.has_exclusions_below(path).then_some(path);
        let type_id = info.type_id();

        if let Some(codec) = self.read().scope(scope).and_then(|m| m.get(&type_id)) {
            return Ok(codec.clone());
        }

        let deferred = {
            let mut codecs = self.write();
            let map = codecs.scope_mut(scope);
            if let Some(codec) = map.get(&type_id) {
                return Ok(codec.clone());
            }
            let deferred = Arc::new(DeferredCodec::new(info.type_path()));
            map.insert(type_id, deferred.clone());
            deferred
        };
        trace!("deferred codec installed: `{}` at `{path}`", info.type_path());

        let pending = Pending {
            cache: self,
            scope,
            type_id,
            type_path: info.type_path(),
            deferred,
            settled: false,
        };
        match codec::build(self, info, path) {
            Ok(codec) => {
                debug!("codec built: `{}` at `{path}`", info.type_path());
                pending.resolve(&codec);
                Ok(codec)
            }
            Err(err) => {
                warn!("codec build failed: `{}` at `{path}`: {err}", info.type_path());
                pending.fail(&err);
                Err(err)
            }
        }
    }

    /// Drops every codec.
    pub fn clear(&self) {
        *self.write() = Codecs::default();
    }

    /// Returns the number of cached codecs.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        let codecs = self.read();
        codecs.shared.len() + codecs.scoped.values().map(HashMap::len).sum::<usize>()
    }

    fn read(&self) -> RwLockReadGuard<'_, Codecs> {
        self.codecs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Codecs> {
        self.codecs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A cache entry under construction.
///
/// Dropped unsettled (the build panicked), it fails and removes its placeholder.
struct Pending<'a> {
    cache: &'a Cache,
    scope: Option<&'a str>,
    type_id: TypeId,
    type_path: &'static str,
    deferred: Arc<DeferredCodec>,
    settled: bool,
}

impl Pending<'_> {
    fn resolve(mut self, codec: &CodecRef) {
        self.settled = true;
        self.cache
            .write()
            .scope_mut(self.scope)
            .insert(self.type_id, codec.clone());
        self.deferred.resolve(codec);
        trace!("deferred codec resolved: `{}`", self.type_path);
    }

    fn fail(mut self, err: &Error) {
        self.settled = true;
        self.remove();
        self.deferred.fail(err);
    }

    fn remove(&self) {
        let mut codecs = self.cache.write();
        let map = codecs.scope_mut(self.scope);
        let placeholder: CodecRef = self.deferred.clone();
        if map
            .get(&self.type_id)
            .is_some_and(|codec| Arc::ptr_eq(codec, &placeholder))
        {
            map.remove(&self.type_id);
        }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.remove();
            self.deferred.fail("codec construction panicked");
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use core::hash::{BuildHasher, Hash, Hasher};

    use vc_json_reflect::Typed;

    use super::{Cache, NoOpHashState};
    use crate::IOConfig;

    #[test]
    fn noop_hash() {
        let mut hasher = NoOpHashState.build_hasher();
        3_u64.hash(&mut hasher);
        assert_eq!(hasher.finish(), 3);

        let a = NoOpHashState.hash_one(TypeId::of::<i32>());
        let b = NoOpHashState.hash_one(TypeId::of::<i64>());
        assert_ne!(a, b);
    }

    #[test]
    fn built_once() {
        let cache = Cache::new(IOConfig::new());
        let a = cache.get_or_build(<Vec<i32>>::type_info(), "").unwrap();
        let b = cache.get_or_build(<Vec<i32>>::type_info(), "items").unwrap();
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        // `Vec<i32>` and `i32`
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn scoped_by_exclusions() {
        let cache = Cache::new(IOConfig::new().with_exclude(["owner.secret"]));
        let a = cache.get_or_build(<Vec<i32>>::type_info(), "owner").unwrap();
        let b = cache.get_or_build(<Vec<i32>>::type_info(), "items").unwrap();
        assert!(!std::sync::Arc::ptr_eq(&a, &b));
    }
}
