//! Resource directory tree of the `.rsrc` section.
//!
//! Resources are organized as a tree of directory tables, conventionally three levels deep:
//! type, then name, then language. Every directory entry either points to another table (high bit
//! of its offset field set) or to a [`ResourceDataEntry`] leaf. All offsets are relative to the
//! start of the resource section.
//!
//! # Walking untrusted trees
//!
//! The offsets come straight from the file, so a crafted file can point a table at itself, nest
//! tables arbitrarily deep or declare tens of thousands of entries. [`ResourceTree::parse`]
//! therefore
//!
//! - walks with an explicit work-list instead of recursion,
//! - stops descending at [`ParseOptions::max_resource_depth`],
//! - never reads the same table twice,
//! - stops collecting leaves at [`ParseOptions::max_resource_entries`],
//! - checks every table, entry and leaf against the file length.
//!
//! A failure affects only the entry where it happens; the rest of the tree is still collected.
//!
//! # Root level filtering
//!
//! At the root, named entries are skipped and only numeric ids (resource types) are inspected.
//! An optional type filter restricts which of them are expanded; the icon lookup only follows
//! [`ResourceType::Icon`]. Below the root every entry is expanded, named or not.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bottlescope::PeFile;
//! use bottlescope::resources::ResourceType;
//!
//! let pe = PeFile::from_file("drive_c/Program Files/Game/game.exe")?;
//! if let Some(tree) = pe.resources(Some(&[ResourceType::Icon])) {
//!     for entry in tree.all_entries() {
//!         println!("icon {} ({} bytes)", entry.id, entry.size);
//!     }
//! }
//! # Ok::<(), bottlescope::Error>(())
//! ```

mod entry;

pub use entry::{ResourceDataEntry, ResourceDirectoryTable, ResourceId, DATA_ENTRY_SIZE};

use std::collections::HashSet;

use log::{debug, trace};
use strum::{Display, EnumIter, FromRepr};

use crate::{config::ParseOptions, file::File};

/// Size of a resource directory table header in bytes.
pub const TABLE_HEADER_SIZE: usize = 16;
/// Size of a resource directory entry in bytes.
pub const DIRECTORY_ENTRY_SIZE: usize = 8;

const HIGH_BIT: u32 = 0x8000_0000;

/// Predefined resource types (`RT_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, Display)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum ResourceType {
    Cursor = 1,
    Bitmap = 2,
    Icon = 3,
    Menu = 4,
    Dialog = 5,
    String = 6,
    FontDir = 7,
    Font = 8,
    Accelerator = 9,
    RcData = 10,
    MessageTable = 11,
    GroupCursor = 12,
    GroupIcon = 14,
    Version = 16,
    DlgInclude = 17,
    PlugPlay = 19,
    Vxd = 20,
    AniCursor = 21,
    AniIcon = 22,
    Html = 23,
    Manifest = 24,
}

/// Table waiting to be read by the walker.
struct Pending {
    offset: usize,
    depth: usize,
    parent: Option<usize>,
    id: Option<ResourceId>,
    type_id: Option<ResourceId>,
}

/// The resource directory tree, stored as a flat arena.
///
/// Index 0 is always the root table. Tables refer to their children by arena index, so the tree
/// can be traversed without recursion or shared ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTree {
    tables: Vec<ResourceDirectoryTable>,
    entries: Vec<ResourceDataEntry>,
}

impl ResourceTree {
    /// Walks the resource tree rooted at the file offset `base`.
    ///
    /// ## Arguments
    /// * `file` - The image the tree lives in
    /// * `base` - File offset of the resource section; root of the tree and base of all offsets
    /// * `filter` - Resource types to expand at the root, `None` for all of them
    /// * `options` - Depth and size limits
    #[must_use]
    pub fn parse(
        file: &File,
        base: usize,
        filter: Option<&[ResourceType]>,
        options: &ParseOptions,
    ) -> ResourceTree {
        let mut tree = ResourceTree {
            tables: Vec::new(),
            entries: Vec::new(),
        };
        let mut visited = HashSet::from([base]);
        let mut budget = options.max_resource_directory_entries;
        let mut stack = vec![Pending {
            offset: base,
            depth: 0,
            parent: None,
            id: None,
            type_id: None,
        }];

        while let Some(pending) = stack.pop() {
            let index = tree.push_table(file, &pending);
            let Some(children) =
                tree.read_entries(file, base, index, &pending, filter, options, &mut budget)
            else {
                break;
            };

            for (offset, id) in children.into_iter().rev() {
                if !visited.insert(offset) {
                    debug!("Resource table at 0x{offset:x} is referenced twice, skipping");
                    continue;
                }
                let type_id = pending.type_id.clone().or_else(|| Some(id.clone()));
                stack.push(Pending {
                    offset,
                    depth: pending.depth + 1,
                    parent: Some(index),
                    id: Some(id),
                    type_id,
                });
            }
        }

        trace!(
            "ResourceTree::parse base=0x{base:x} tables={} entries={}",
            tree.tables.len(),
            tree.entries.len()
        );
        tree
    }

    fn push_table(&mut self, file: &File, pending: &Pending) -> usize {
        let mut reader = file.reader(pending.offset);
        let table = ResourceDirectoryTable {
            characteristics: reader.field(),
            time_date_stamp: reader.field(),
            major_version: reader.field(),
            minor_version: reader.field(),
            number_of_named_entries: reader.field(),
            number_of_id_entries: reader.field(),
            offset: pending.offset,
            depth: pending.depth,
            id: pending.id.clone(),
            subtables: Vec::new(),
            entries: Vec::new(),
        };

        let index = self.tables.len();
        self.tables.push(table);
        if let Some(parent) = pending.parent {
            self.tables[parent].subtables.push(index);
        }
        index
    }

    /// Reads the entries of table `index`, collecting its leaves and returning the subtables to
    /// visit. `None` once the leaf limit or the directory entry `budget` is exhausted.
    #[allow(clippy::too_many_arguments)]
    fn read_entries(
        &mut self,
        file: &File,
        base: usize,
        index: usize,
        pending: &Pending,
        filter: Option<&[ResourceType]>,
        options: &ParseOptions,
        budget: &mut usize,
    ) -> Option<Vec<(usize, ResourceId)>> {
        let named = usize::from(self.tables[index].number_of_named_entries);
        let count = self.tables[index].declared_entries();
        let first = if pending.depth == 0 { named } else { 0 };
        let mut children = Vec::new();

        for position in first..count {
            if *budget == 0 {
                debug!(
                    "Resource walk stopped after {} directory entries",
                    options.max_resource_directory_entries
                );
                return None;
            }
            *budget -= 1;

            let at = pending
                .offset
                .saturating_add(TABLE_HEADER_SIZE + position * DIRECTORY_ENTRY_SIZE);
            let mut reader = file.reader(at);
            let (Ok(name_field), Ok(offset_field)) =
                (reader.read_le::<u32>(), reader.read_le::<u32>())
            else {
                debug!(
                    "Resource table at 0x{:x} declares {count} entries, entry {position} is past the end of the file",
                    pending.offset
                );
                break;
            };

            let id = if name_field & HIGH_BIT == 0 {
                ResourceId::Id((name_field & 0xFFFF) as u16)
            } else {
                let name_offset = base.saturating_add((name_field & !HIGH_BIT) as usize);
                match file.reader(name_offset).read_prefixed_utf16() {
                    Ok(name) => ResourceId::Name(name),
                    Err(error) => {
                        debug!("Resource name at 0x{name_offset:x} unreadable - {error}");
                        continue;
                    }
                }
            };

            if pending.depth == 0 {
                if let Some(filter) = filter {
                    let wanted = id
                        .resource_type()
                        .is_some_and(|kind| filter.contains(&kind));
                    if !wanted {
                        continue;
                    }
                }
            }

            let target = base.saturating_add((offset_field & !HIGH_BIT) as usize);
            if offset_field & HIGH_BIT != 0 {
                if pending.depth + 1 >= options.max_resource_depth {
                    debug!(
                        "Resource table {id} at 0x{target:x} exceeds depth {}",
                        options.max_resource_depth
                    );
                    continue;
                }
                if file.data_slice(target, TABLE_HEADER_SIZE).is_err() {
                    debug!("Resource table {id} at 0x{target:x} is outside of the file");
                    continue;
                }
                children.push((target, id));
            } else {
                if self.entries.len() >= options.max_resource_entries {
                    debug!(
                        "Resource walk stopped after {} entries",
                        options.max_resource_entries
                    );
                    return None;
                }

                let type_id = pending.type_id.clone().or_else(|| Some(id.clone()));
                match ResourceDataEntry::read(file, target, id, type_id) {
                    Ok(entry) => {
                        self.tables[index].entries.push(self.entries.len());
                        self.entries.push(entry);
                    }
                    Err(error) => debug!("Skipping resource data entry at 0x{target:x} - {error}"),
                }
            }
        }

        Some(children)
    }

    /// The root table.
    #[must_use]
    pub fn root(&self) -> &ResourceDirectoryTable {
        &self.tables[0]
    }

    /// All tables, in the order they were read.
    #[must_use]
    pub fn tables(&self) -> &[ResourceDirectoryTable] {
        &self.tables
    }

    /// The direct subtables of `table`, in entry order.
    pub fn subtables<'a>(
        &'a self,
        table: &'a ResourceDirectoryTable,
    ) -> impl Iterator<Item = &'a ResourceDirectoryTable> + 'a {
        table.subtables.iter().map(move |&index| &self.tables[index])
    }

    /// The leaves directly referenced by `table`, in entry order.
    pub fn entries<'a>(
        &'a self,
        table: &'a ResourceDirectoryTable,
    ) -> impl Iterator<Item = &'a ResourceDataEntry> + 'a {
        table.entries.iter().map(move |&index| &self.entries[index])
    }

    /// Every leaf of the tree in pre-order: a table's own leaves first, then those of each of its
    /// subtables in entry order.
    #[must_use]
    pub fn all_entries(&self) -> Vec<&ResourceDataEntry> {
        let mut result = Vec::with_capacity(self.entries.len());
        let mut stack = vec![0_usize];

        while let Some(index) = stack.pop() {
            let table = &self.tables[index];
            result.extend(table.entries.iter().map(|&entry| &self.entries[entry]));
            stack.extend(table.subtables.iter().rev());
        }

        result
    }

    /// Number of collected leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no leaf was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
