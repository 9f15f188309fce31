//! Rebuilding of space/folder membership after paths have moved
//!
//! Rule application clears the children of every moved space and folder, and
//! pruning removes entities without touching the listings that point at them.
//! The reconciler restores a tree in which every folder and view is listed by
//! exactly one parent:
//!
//! 1. folders that ended up at the same path are merged;
//! 2. child entries pointing at folders or views that no longer exist are
//!    removed;
//! 3. each unlisted view is attached to its parent space or folder;
//! 4. unlisted folders are attached the same way, repeatedly, until every
//!    folder is listed.
//!
//! A missing parent folder is synthesized. A missing parent space is fatal,
//! and so are two views that ended up at the same path.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogPath, ChildKind, ChildRef, Folder};
use crate::error::MigrationError;

/// Where a synthesized folder is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Back,
    /// Ahead of every existing folder, so it is declared before its children
    Front,
}

/// Reconcile the tree. Returns the number of synthesized folders.
pub fn reconcile_tree(catalog: &mut Catalog) -> Result<usize, MigrationError> {
    check_view_collisions(catalog)?;
    merge_duplicate_folders(catalog);
    drop_dangling_children(catalog);

    let mut synthesized = 0;

    for (id, path) in catalog.unreferenced_views() {
        let child = ChildRef::view(&id, &path);
        if attach(catalog, child, Placement::Back)? {
            synthesized += 1;
        }
    }

    loop {
        let orphans = catalog.unreferenced_folders();
        if orphans.is_empty() {
            break;
        }
        debug!("Attaching {} unlisted folders", orphans.len());
        for (id, path) in orphans {
            let child = ChildRef::folder(&id, &path);
            if attach(catalog, child, Placement::Front)? {
                synthesized += 1;
            }
        }
    }

    Ok(synthesized)
}

/// Views cannot be merged like folders; two at one path abort the run.
fn check_view_collisions(catalog: &Catalog) -> Result<(), MigrationError> {
    let mut seen: HashMap<&CatalogPath, &str> = HashMap::with_capacity(catalog.views.len());
    for view in &catalog.views {
        if let Some(first) = seen.insert(&view.path, &view.id) {
            return Err(MigrationError::PathCollision {
                path: view.path.clone(),
                first: first.to_string(),
                second: view.id.clone(),
            });
        }
    }
    Ok(())
}

/// Keep the first folder of each path and move the children of later
/// duplicates into it.
fn merge_duplicate_folders(catalog: &mut Catalog) {
    let mut merged: Vec<Folder> = Vec::with_capacity(catalog.folders.len());
    for folder in std::mem::take(&mut catalog.folders) {
        match merged.iter_mut().find(|f| f.path == folder.path) {
            Some(existing) => {
                info!(
                    "Merging folder {} ({}) into {}",
                    folder.path, folder.id, existing.id
                );
                for child in folder.children {
                    if !existing.children.iter().any(|c| c.path == child.path) {
                        existing.children.push(child);
                    }
                }
            }
            None => merged.push(folder),
        }
    }
    catalog.folders = merged;
}

fn drop_dangling_children(catalog: &mut Catalog) {
    let existing: HashSet<CatalogPath> = catalog
        .folders
        .iter()
        .map(|f| f.path.clone())
        .chain(catalog.views.iter().map(|v| v.path.clone()))
        .collect();

    let keep = |owner: &CatalogPath, child: &ChildRef| {
        let keep = child.kind() == ChildKind::Other || existing.contains(&child.path);
        if !keep {
            debug!("Removing listing of {} from {}", child.path, owner);
        }
        keep
    };

    for space in &mut catalog.spaces {
        let owner = space.path();
        space.children.retain(|c| keep(&owner, c));
    }
    for folder in &mut catalog.folders {
        let owner = &folder.path;
        folder.children.retain(|c| keep(owner, c));
    }
}

/// List `child` under its parent space or folder. Returns true when the
/// parent folder had to be synthesized.
fn attach(
    catalog: &mut Catalog,
    child: ChildRef,
    placement: Placement,
) -> Result<bool, MigrationError> {
    let parent = child.path.parent();
    let label = match child.kind() {
        ChildKind::Folder => "folder",
        _ => "view",
    };

    match parent.len() {
        0 => Err(MigrationError::RootLevelEntity { path: child.path }),
        1 => {
            let name = &parent.segments()[0];
            let Some(space) = catalog.space_mut(name) else {
                return Err(MigrationError::MissingSpace {
                    space: name.clone(),
                    entity: child.path,
                });
            };
            info!("Appending {} {} to space {}", label, child.path, space.name);
            space.children.push(child);
            Ok(false)
        }
        _ => {
            let (index, synthesized) = match catalog.folder_position(&parent) {
                Some(index) => (index, false),
                None => {
                    info!("No existing parent folder found, creating one: {}", parent);
                    let folder = Folder::synthesized(parent);
                    match placement {
                        Placement::Back => {
                            catalog.folders.push(folder);
                            (catalog.folders.len() - 1, true)
                        }
                        Placement::Front => {
                            catalog.folders.insert(0, folder);
                            (0, true)
                        }
                    }
                }
            };
            let folder = &mut catalog.folders[index];
            info!("Appending {} {} to folder {}", label, child.path, folder.path);
            folder.children.push(child);
            Ok(synthesized)
        }
    }
}
