use std::fmt;
use std::path::{Path, PathBuf};

use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::{FileType, TaggedFileExt};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};

/// The named tag slots this tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Album,
    AlbumSort,
    AlbumArtist,
    Artist,
    ArtistSort,
    Genre,
    TrackNumber,
    TrackTitle,
    TrackTitleSort,
    /// Release year (`©day`). Part of the slot set; no operation
    /// rewrites it.
    #[allow(dead_code)]
    Year,
}

impl TagField {
    /// The lofty key this field maps to. For MP4 these land in the
    /// usual `ilst` atoms (`©alb`, `soal`, `aART`, `©ART`, ...).
    fn item_key(self) -> ItemKey {
        match self {
            TagField::Album => ItemKey::AlbumTitle,
            TagField::AlbumSort => ItemKey::AlbumTitleSortOrder,
            TagField::AlbumArtist => ItemKey::AlbumArtist,
            TagField::Artist => ItemKey::TrackArtist,
            TagField::ArtistSort => ItemKey::TrackArtistSortOrder,
            TagField::Genre => ItemKey::Genre,
            TagField::TrackNumber => ItemKey::TrackNumber,
            TagField::TrackTitle => ItemKey::TrackTitle,
            TagField::TrackTitleSort => ItemKey::TrackTitleSortOrder,
            TagField::Year => ItemKey::RecordingDate,
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagField::Album => "album",
            TagField::AlbumSort => "album-sort",
            TagField::AlbumArtist => "album-artist",
            TagField::Artist => "artist",
            TagField::ArtistSort => "artist-sort",
            TagField::Genre => "genre",
            TagField::TrackNumber => "track-number",
            TagField::TrackTitle => "track-title",
            TagField::TrackTitleSort => "track-title-sort",
            TagField::Year => "year",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be opened or parsed as a tagged container.
    #[error("{}: {}", path.display(), source)]
    Open {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
    /// The file parsed, but as some other container format.
    #[error("{} is not an m4a", .0.display())]
    NotAContainer(PathBuf),
    /// Writing the tag set back to disk failed.
    #[error("failed to save tags to {}: {}", path.display(), source)]
    Save {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
}

/// Narrow contract over one file's tag set. Nothing behind this trait is
/// assumed about on-disk layout beyond named slots holding scalar values.
pub trait TagStore {
    fn get(&self, field: TagField) -> Option<String>;
    fn set(&mut self, field: TagField, value: &str);
    /// The (current, total) track number pair, when present.
    fn track_number(&self) -> Option<(u32, Option<u32>)>;
    /// Persist the current tag set to disk.
    fn save(&mut self) -> Result<(), StoreError>;
    /// Point future saves at the file's new location after a rename.
    fn relocated(&mut self, path: &Path);
}

/// MP4 `ilst` tag set pulled into memory via lofty, saved back with
/// `save_to_path`.
pub struct LoftyStore {
    path: PathBuf,
    tag: Tag,
}

impl LoftyStore {
    /// Open `path` and read its tag set. Fails when the file is missing,
    /// unreadable, or not an MP4 container. A valid container with no
    /// tags yet gets an empty `ilst` tag.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let tagged_file = Probe::open(path)
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .options(ParseOptions::new().read_properties(false))
            .read()
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        if tagged_file.file_type() != FileType::Mp4 {
            return Err(StoreError::NotAContainer(path.to_path_buf()));
        }

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .cloned()
            .unwrap_or_else(|| Tag::new(TagType::Mp4Ilst));

        Ok(Self {
            path: path.to_path_buf(),
            tag,
        })
    }
}

impl TagStore for LoftyStore {
    fn get(&self, field: TagField) -> Option<String> {
        match field {
            TagField::TrackNumber => self.tag.track().map(|n| n.to_string()),
            _ => self.tag.get_string(field.item_key()).map(str::to_string),
        }
    }

    fn set(&mut self, field: TagField, value: &str) {
        match field {
            TagField::TrackNumber => {
                if let Ok(number) = value.parse() {
                    self.tag.set_track(number);
                }
            }
            _ => {
                self.tag.insert_text(field.item_key(), value.to_string());
            }
        }
    }

    fn track_number(&self) -> Option<(u32, Option<u32>)> {
        self.tag.track().map(|n| (n, self.tag.track_total()))
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.tag
            .save_to_path(&self.path, WriteOptions::default())
            .map_err(|source| StoreError::Save {
                path: self.path.clone(),
                source,
            })
    }

    fn relocated(&mut self, path: &Path) {
        self.path = path.to_path_buf();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct Inner {
        fields: HashMap<TagField, String>,
        track: Option<(u32, Option<u32>)>,
        saves: usize,
        fail_saves: bool,
        relocated_to: Option<PathBuf>,
    }

    /// In-memory stand-in for entity tests. Clones share state, so a
    /// test can keep a probe handle after boxing the store.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryStore {
        inner: Rc<RefCell<Inner>>,
    }

    impl MemoryStore {
        pub(crate) fn with_field(self, field: TagField, value: &str) -> Self {
            self.inner
                .borrow_mut()
                .fields
                .insert(field, value.to_string());
            self
        }

        pub(crate) fn with_track(self, current: u32, total: Option<u32>) -> Self {
            self.inner.borrow_mut().track = Some((current, total));
            self
        }

        pub(crate) fn failing_saves(self) -> Self {
            self.inner.borrow_mut().fail_saves = true;
            self
        }

        pub(crate) fn field(&self, field: TagField) -> Option<String> {
            self.inner.borrow().fields.get(&field).cloned()
        }

        pub(crate) fn saves(&self) -> usize {
            self.inner.borrow().saves
        }

        pub(crate) fn relocated_to(&self) -> Option<PathBuf> {
            self.inner.borrow().relocated_to.clone()
        }
    }

    impl TagStore for MemoryStore {
        fn get(&self, field: TagField) -> Option<String> {
            match field {
                TagField::TrackNumber => self
                    .inner
                    .borrow()
                    .track
                    .map(|(current, _)| current.to_string()),
                _ => self.field(field),
            }
        }

        fn set(&mut self, field: TagField, value: &str) {
            self.inner
                .borrow_mut()
                .fields
                .insert(field, value.to_string());
        }

        fn track_number(&self) -> Option<(u32, Option<u32>)> {
            self.inner.borrow().track
        }

        fn save(&mut self) -> Result<(), StoreError> {
            let mut inner = self.inner.borrow_mut();
            if inner.fail_saves {
                return Err(StoreError::Save {
                    path: PathBuf::from("/memory"),
                    source: std::io::Error::other("save failed").into(),
                });
            }
            inner.saves += 1;
            Ok(())
        }

        fn relocated(&mut self, path: &Path) {
            self.inner.borrow_mut().relocated_to = Some(path.to_path_buf());
        }
    }
}
