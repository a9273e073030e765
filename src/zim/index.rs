//! Sampled key index and URL resolution.
//!
//! The archive's URL pointer table is sorted by (namespace, URL), so any URL
//! can be found by binary search. Every probe costs a seek and a string read,
//! though. The [`SampledIndex`] keeps a sparse, per-namespace set of known
//! keys that narrows the search window before the first probe, and it
//! remembers every URL resolved since, so repeated lookups touch no I/O.
//!
//! The index only grows. It is seeded at open time from evenly spaced
//! samples and never evicts.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use std::ops::Bound;
use log::{debug, trace};

use crate::zim::format::dirent;
use crate::zim::types::error::{Result, ZimError};
use crate::zim::types::models::UrlNamespace;

/// Per-namespace ordered map from a key (URL or title) to a table index.
///
/// Not a complete index, only a hint structure for bracketing searches.
#[derive(Debug, Default, Clone)]
pub struct SampledIndex {
    namespaces: HashMap<UrlNamespace, BTreeMap<String, u32>>,
}

impl SampledIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key -> index`. The first index recorded for a key wins.
    ///
    /// Returns `true` if the key was new.
    pub fn insert(&mut self, namespace: UrlNamespace, key: String, index: u32) -> bool {
        let keys = self.namespaces.entry(namespace).or_default();
        if keys.contains_key(&key) {
            return false;
        }
        keys.insert(key, index);
        true
    }

    pub fn get(&self, namespace: UrlNamespace, key: &str) -> Option<u32> {
        self.namespaces.get(&namespace)?.get(key).copied()
    }

    pub fn contains_namespace(&self, namespace: UrlNamespace) -> bool {
        self.namespaces.contains_key(&namespace)
    }

    /// Total number of keys across all namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys known for one namespace.
    pub fn namespace_len(&self, namespace: UrlNamespace) -> usize {
        self.namespaces.get(&namespace).map_or(0, BTreeMap::len)
    }

    /// Known keys of a namespace in ascending order.
    pub fn keys(&self, namespace: UrlNamespace) -> impl Iterator<Item = &str> + '_ {
        self.namespaces
            .get(&namespace)
            .into_iter()
            .flat_map(|keys| keys.keys().map(String::as_str))
    }

    /// The tightest known indices whose keys enclose `key`.
    ///
    /// Returns `(lower, upper)` where `lower` belongs to the greatest known
    /// key `<= key` and `upper` to the smallest known key `>= key`, or `None`
    /// when `key` falls outside the known range of the namespace.
    pub fn bracket(&self, namespace: UrlNamespace, key: &str) -> Option<(u32, u32)> {
        let keys = self.namespaces.get(&namespace)?;
        let (_, &lower) = keys
            .range::<str, _>((Bound::Unbounded, Bound::Included(key)))
            .next_back()?;
        let (_, &upper) = keys
            .range::<str, _>((Bound::Included(key), Bound::Unbounded))
            .next()?;
        Some((lower, upper))
    }
}

/// Resolves `url` in `namespace` to its index in the URL pointer table.
///
/// A known key is answered from the index without touching the stream.
/// Otherwise the index brackets the search and a binary search over the
/// full URL table narrows it, reading one entry URL per probe. Comparison
/// is ordinal (byte-wise), matching the table's sort order. A resolved URL
/// is recorded in the index.
pub fn resolve_url<R: Read + Seek>(
    stream: &mut R,
    url_pointers: &[u64],
    index: &mut SampledIndex,
    namespace: UrlNamespace,
    url: &str,
) -> Result<u32> {
    let not_found = || ZimError::NotFound {
        namespace,
        url: url.to_string(),
    };

    if let Some(found) = index.get(namespace, url) {
        trace!("Index hit for {}/{}: {}", namespace, url, found);
        return Ok(found);
    }

    let (mut lower, mut upper) = index.bracket(namespace, url).ok_or_else(not_found)?;
    trace!("Searching {}/{} between {} and {}", namespace, url, lower, upper);

    while lower < upper {
        let probe = lower + (upper - lower) / 2;
        if probe == lower {
            break;
        }

        let offset = url_pointers.get(probe as usize).copied().ok_or_else(|| {
            ZimError::InvalidFormat(format!("URL index {} is out of range", probe))
        })?;
        let probe_url = dirent::read_entry_url(stream, offset)?;
        trace!("Probe {}: {}", probe, probe_url);

        match url.cmp(probe_url.as_str()) {
            std::cmp::Ordering::Equal => {
                debug!("Resolved {}/{} to {}, adding to index", namespace, url, probe);
                index.insert(namespace, probe_url, probe);
                return Ok(probe);
            }
            std::cmp::Ordering::Less => upper = probe,
            std::cmp::Ordering::Greater => lower = probe,
        }
    }

    Err(not_found())
}
