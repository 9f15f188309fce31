//! Catalog model: paths, entities, snapshot and snapshot I/O

mod entities;
mod io;
mod path;
mod snapshot;

pub use entities::{
    ChildKind, ChildRef, Container, DependencyRecord, Folder, Reflection, Space, Tag, View, Wiki,
    CONTAINER_TYPE_FOLDER, CONTAINER_TYPE_SPACE,
};
pub use io::{load_catalog, save_catalog, CatalogLocation};
pub use path::{CatalogPath, MigrationRule};
pub use snapshot::Catalog;
