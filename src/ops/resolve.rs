//! Repository descriptor resolution.
//!
//! Sources are tried in priority order:
//!
//! 1. every required working copy already exists → local descriptors, and no
//!    override or lookup is consulted at all;
//! 2. an override set;
//! 3. the set registered for the build identifier.
//!
//! Resolution is all-or-nothing across the full required name set.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::core::layout::Layout;
use crate::core::repository::{Remote, RepoName, RepositoryDescriptor, VcsKind};
use crate::sources::repo_set::{RepoEntry, RepoSetSource};
use crate::util::errors::PrepError;

/// Resolve descriptors for every required repository, in [`RepoName::ALL`] order.
pub fn resolve_repositories(
    layout: &Layout,
    source: &dyn RepoSetSource,
) -> Result<Vec<RepositoryDescriptor>> {
    if all_local_roots_exist(layout) {
        tracing::debug!("all working copies present, using local checkouts");
        return Ok(RepoName::ALL
            .iter()
            .map(|n| RepositoryDescriptor::local(*n, layout.local_root(*n)))
            .collect());
    }

    if let Some(entries) = source.override_set()? {
        return descriptors_from_entries(layout, &entries, "override");
    }

    let identifier = source.identifier()?;
    tracing::info!("Looking up repository set for `{}`", identifier);
    match source.find(&identifier)? {
        Some(entries) => descriptors_from_entries(layout, &entries, &identifier),
        None => Err(PrepError::configuration(format!(
            "no repository set matches identifier `{}`, no override is present, \
             and not every working copy exists under {}",
            identifier,
            layout.checkout_root.display()
        ))
        .into()),
    }
}

fn all_local_roots_exist(layout: &Layout) -> bool {
    RepoName::ALL
        .iter()
        .all(|n| layout.local_root(*n).is_dir())
}

/// Convert a repository set into descriptors, requiring exactly one entry per name.
fn descriptors_from_entries(
    layout: &Layout,
    entries: &[RepoEntry],
    origin: &str,
) -> Result<Vec<RepositoryDescriptor>> {
    let mut by_name: BTreeMap<RepoName, RepositoryDescriptor> = BTreeMap::new();

    for entry in entries {
        let name: RepoName = entry
            .name
            .parse()
            .map_err(|e: String| PrepError::configuration(format!("{}: {}", origin, e)))?;
        let vcs: VcsKind = entry
            .vcs
            .parse()
            .map_err(|e: String| PrepError::configuration(format!("{}: {}", origin, e)))?;
        if vcs == VcsKind::Unversioned {
            return Err(PrepError::configuration(format!(
                "{}: repository `{}` must name svn or git",
                origin, name
            ))
            .into());
        }

        let descriptor = RepositoryDescriptor::remote(
            name,
            vcs,
            layout.local_root(name),
            Remote {
                url: entry.url.clone(),
                reference: entry.reference.clone(),
            },
        );
        if by_name.insert(name, descriptor).is_some() {
            return Err(PrepError::configuration(format!(
                "{}: repository `{}` is listed more than once",
                origin, name
            ))
            .into());
        }
    }

    let missing: Vec<&str> = RepoName::ALL
        .iter()
        .filter(|n| !by_name.contains_key(*n))
        .map(|n| n.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(PrepError::configuration(format!(
            "{}: repository set is missing {}",
            origin,
            missing.join(", ")
        ))
        .into());
    }

    Ok(RepoName::ALL
        .iter()
        .filter_map(|n| by_name.remove(n))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::BuildConfiguration;
    use crate::test_support::{full_entries, TestTree};
    use std::cell::Cell;

    /// Counts every call so tests can prove a source was never consulted.
    struct CountingSource {
        overrides: Option<Vec<RepoEntry>>,
        found: Option<Vec<RepoEntry>>,
        calls: Cell<usize>,
    }

    impl CountingSource {
        fn new(overrides: Option<Vec<RepoEntry>>, found: Option<Vec<RepoEntry>>) -> Self {
            CountingSource {
                overrides,
                found,
                calls: Cell::new(0),
            }
        }
    }

    impl RepoSetSource for CountingSource {
        fn override_set(&self) -> Result<Option<Vec<RepoEntry>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.overrides.clone())
        }

        fn identifier(&self) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok("main".to_string())
        }

        fn find(&self, _identifier: &str) -> Result<Option<Vec<RepoEntry>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.found.clone())
        }
    }

    #[test]
    fn test_all_local_roots_short_circuit_lookup() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        tree.create_local_roots(&RepoName::ALL);
        let source = CountingSource::new(Some(full_entries()), Some(full_entries()));

        let repos = resolve_repositories(&tree.ctx.layout, &source).unwrap();

        assert_eq!(repos.len(), 5);
        assert!(repos.iter().all(|r| r.url().is_none() && r.reference().is_none()));
        assert!(repos.iter().all(|r| r.vcs() == VcsKind::Unversioned));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_override_supplies_all_five() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let source = CountingSource::new(Some(full_entries()), None);

        let repos = resolve_repositories(&tree.ctx.layout, &source).unwrap();

        let names: Vec<RepoName> = repos.iter().map(|r| r.name()).collect();
        assert_eq!(names, RepoName::ALL.to_vec());
        assert!(repos.iter().all(|r| r.url().is_some() && r.reference() == Some("stable")));
        assert_eq!(repos[2].local_root(), tree.local_root(RepoName::Swift));
    }

    #[test]
    fn test_partial_local_roots_still_use_override() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        tree.create_local_roots(&[RepoName::Llvm, RepoName::Clang]);
        let source = CountingSource::new(Some(full_entries()), None);

        let repos = resolve_repositories(&tree.ctx.layout, &source).unwrap();
        assert!(repos.iter().all(|r| r.url().is_some()));
    }

    #[test]
    fn test_lookup_used_without_override() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let source = CountingSource::new(None, Some(full_entries()));

        let repos = resolve_repositories(&tree.ctx.layout, &source).unwrap();
        assert_eq!(repos.len(), 5);
        assert_eq!(source.calls.get(), 3);
    }

    #[test]
    fn test_no_set_is_configuration_error() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let source = CountingSource::new(None, None);

        let err = resolve_repositories(&tree.ctx.layout, &source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::Configuration { .. })
        ));
        assert!(err.to_string().contains("`main`"));
    }

    #[test]
    fn test_incomplete_set_is_rejected() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let mut entries = full_entries();
        entries.retain(|e| e.name != "cmark");
        let source = CountingSource::new(Some(entries), None);

        let err = resolve_repositories(&tree.ctx.layout, &source).unwrap_err();
        assert!(err.to_string().contains("missing cmark"));
    }

    #[test]
    fn test_unknown_vcs_is_rejected() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let mut entries = full_entries();
        entries[0].vcs = "hg".to_string();
        let source = CountingSource::new(Some(entries), None);

        let err = resolve_repositories(&tree.ctx.layout, &source).unwrap_err();
        assert!(err.to_string().contains("unknown vcs `hg`"));
    }
}
