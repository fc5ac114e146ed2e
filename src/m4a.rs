use std::fs;
use std::path::{Path, PathBuf};

use crate::file_utils;
use crate::logger::Logger;
use crate::sanitize::sanitize;
use crate::store::{LoftyStore, TagField, TagStore};

/// Extension for Apple Lossless files.
pub const M4A_EXT: &str = "m4a";

/// Fields rewritten by `sanitize_tags`, in processing order.
const SANITIZE_FIELDS: [TagField; 7] = [
    TagField::Album,
    TagField::AlbumSort,
    TagField::AlbumArtist,
    TagField::Artist,
    TagField::ArtistSort,
    TagField::TrackTitle,
    TagField::TrackTitleSort,
];

/// What a single tag write actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The value differed, was written, and was saved.
    Updated,
    /// The stored value already matched; nothing was written.
    Unchanged,
    /// The field is not present in this file; writes to absent fields
    /// are skipped.
    Missing,
    /// The container never opened, so there is no tag store.
    Unavailable,
    /// The write went through but saving to disk failed; logged.
    Failed,
}

/// Result of a rename attempt. Every variant carries the computed
/// canonical path, so the caller always learns the target name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The file was moved to its canonical path.
    Moved(PathBuf),
    /// The file already had its canonical name; no filesystem call.
    Unchanged(PathBuf),
    /// The move failed (missing source or permissions); logged.
    Failed(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum M4aError {
    /// The container never opened; no tag data is available.
    #[error("{} has no readable tags", .0.display())]
    NoStore(PathBuf),
    /// A field required for the canonical filename is absent.
    #[error("{} is missing the {} tag", path.display(), field)]
    MissingField { path: PathBuf, field: TagField },
}

/// One open Apple Lossless file: its resolved path, its tag store, and
/// the logger it reports through.
pub struct M4aFile {
    path: PathBuf,
    basedir: PathBuf,
    store: Option<Box<dyn TagStore>>,
    logger: Logger,
}

impl M4aFile {
    /// Open an m4a file. An unreadable or non-MP4 container is logged
    /// and leaves the entity without a tag store; every later tag
    /// operation then reports `Unavailable` instead of touching disk.
    pub fn open(path: &Path, logger: Logger) -> Self {
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let basedir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let store: Option<Box<dyn TagStore>> = match LoftyStore::open(&path) {
            Ok(store) => Some(Box::new(store)),
            Err(err) => {
                logger.info(&err.to_string());
                None
            }
        };

        Self {
            path,
            basedir,
            store,
            logger,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_store(
        path: PathBuf,
        store: Option<Box<dyn TagStore>>,
        logger: Logger,
    ) -> Self {
        let basedir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            basedir,
            store,
            logger,
        }
    }

    /// Current on-disk location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `value` into `field` and save immediately. Absent fields
    /// and values that already match are skipped.
    pub fn set_tag(&mut self, field: TagField, value: &str) -> SetOutcome {
        let Some(store) = self.store.as_mut() else {
            self.logger.debug(&format!(
                "{}: no tag store, skipping {field}",
                self.path.display()
            ));
            return SetOutcome::Unavailable;
        };

        let Some(current) = store.get(field) else {
            self.logger
                .debug(&format!("{}: {field} not found", self.path.display()));
            return SetOutcome::Missing;
        };

        if current == value {
            return SetOutcome::Unchanged;
        }

        self.logger.tag_set(&self.path, field, value);
        store.set(field, value);
        match store.save() {
            Ok(()) => SetOutcome::Updated,
            Err(err) => {
                self.logger.error(&err.to_string());
                SetOutcome::Failed
            }
        }
    }

    /// Update the album tags (album and album sort order) together.
    pub fn set_album(&mut self, album: &str) {
        for field in [TagField::Album, TagField::AlbumSort] {
            self.set_tag(field, album);
        }
    }

    /// Update the artist tags (artist, artist sort order, album artist)
    /// together.
    pub fn set_artist(&mut self, artist: &str) {
        for field in [TagField::Artist, TagField::ArtistSort, TagField::AlbumArtist] {
            self.set_tag(field, artist);
        }
    }

    /// Update the genre tag.
    pub fn set_genre(&mut self, genre: &str) {
        self.set_tag(TagField::Genre, genre);
    }

    /// Rewrite one field to its canonical form.
    pub fn sanitize_field(&mut self, field: TagField) -> SetOutcome {
        let Some(store) = self.store.as_ref() else {
            self.logger.debug(&format!(
                "{}: no tag store, skipping {field}",
                self.path.display()
            ));
            return SetOutcome::Unavailable;
        };

        let Some(current) = store.get(field) else {
            self.logger
                .debug(&format!("{}: {field} not found", self.path.display()));
            return SetOutcome::Missing;
        };

        self.set_tag(field, &sanitize(&current))
    }

    /// Canonicalize the text tags that feed display and filenames. A
    /// missing field is skipped; the remaining fields are still
    /// processed.
    pub fn sanitize_tags(&mut self) {
        for field in SANITIZE_FIELDS {
            self.sanitize_field(field);
        }
    }

    fn required_tag(&self, field: TagField) -> Result<String, M4aError> {
        self.store
            .as_ref()
            .ok_or_else(|| M4aError::NoStore(self.path.clone()))?
            .get(field)
            .ok_or_else(|| M4aError::MissingField {
                path: self.path.clone(),
                field,
            })
    }

    /// Compose `"<dir>/<NN> <artist> - <title>.m4a"` from the tags as
    /// they currently stand. Pure: nothing is written.
    pub fn canonical_filename(&self) -> Result<PathBuf, M4aError> {
        let artist = self.required_tag(TagField::Artist)?;
        let title = self.required_tag(TagField::TrackTitle)?;
        let (track, _total) = self
            .store
            .as_ref()
            .ok_or_else(|| M4aError::NoStore(self.path.clone()))?
            .track_number()
            .ok_or_else(|| M4aError::MissingField {
                path: self.path.clone(),
                field: TagField::TrackNumber,
            })?;

        Ok(self
            .basedir
            .join(format!("{track:02} {artist} - {title}.{M4A_EXT}")))
    }

    /// Sanitize the artist and track title tags, then compose the
    /// canonical filename from the result. The sanitization writes
    /// through to the store, so this is not a pure query.
    pub fn generate_filename(&mut self) -> Result<PathBuf, M4aError> {
        for field in [TagField::Artist, TagField::TrackTitle] {
            self.sanitize_field(field);
        }
        self.canonical_filename()
    }

    /// Move the file to its canonical name. An already-canonical name
    /// is a no-op; a failed move is logged and reported, never raised.
    pub fn rename(&mut self) -> Result<RenameOutcome, M4aError> {
        let target = self.generate_filename()?;
        if target == self.path {
            return Ok(RenameOutcome::Unchanged(target));
        }

        self.logger.rename(&self.path, &target);
        match file_utils::move_file(&self.path, &target) {
            Ok(()) => {
                self.path = target.clone();
                if let Some(store) = self.store.as_mut() {
                    store.relocated(&target);
                }
                Ok(RenameOutcome::Moved(target))
            }
            Err(err) => {
                self.logger.debug(&format!(
                    "cannot rename {} to {}: {err}",
                    self.path.display(),
                    target.display()
                ));
                Ok(RenameOutcome::Failed(target))
            }
        }
    }
}
