//! Appends finished shard indexes to the main index.
//!
//! Tantivy has no "add indexes" call, so shards are appended at the segment
//! level: under the main index's writer lock every segment file of each shard is
//! copied into the main directory and a new `meta.json` listing the old and the
//! new segments is published atomically. No document is re-tokenized.
//!
//! Segment files carry a footer. Reads go through the shard's managed directory,
//! which strips it, and writes through the main one, which adds it back.

use std::{
    collections::BTreeSet,
    io::Write,
    path::{Path, PathBuf},
};

use tantivy::{
    Directory, Index, SegmentId,
    directory::{INDEX_WRITER_LOCK, TerminatingWrite},
};
use tracing::{debug, info};

use crate::{IndexError, schema::LogSchema};

/// File Tantivy reads the segment list from.
const META_FILE: &str = "meta.json";

/// Appends the segments of every index in `shard_dirs` to the index at `main_dir`.
///
/// No writer may be open on the main index. Returns the ids of the segments added.
pub fn append_shards(
    main_dir: &Path,
    shard_dirs: &[PathBuf],
) -> Result<Vec<SegmentId>, IndexError> {
    let main = Index::open_in_dir(main_dir)
        .map_err(|e| IndexError::open_index(main_dir.to_path_buf(), &e))?;
    let directory = main.directory();
    let _lock = directory
        .acquire_lock(&INDEX_WRITER_LOCK)
        .map_err(IndexError::merge)?;

    let mut meta = main.load_metas().map_err(IndexError::merge)?;
    let mut opstamp = meta.opstamp;
    let mut added = Vec::new();

    for shard_dir in shard_dirs {
        let shard = Index::open_in_dir(shard_dir)
            .map_err(|e| IndexError::open_index(shard_dir.clone(), &e))?;
        if LogSchema::from_schema(&shard.schema()).is_none() {
            return Err(IndexError::merge(format!(
                "{} does not hold a log index",
                shard_dir.display()
            )));
        }
        let shard_meta = shard.load_metas().map_err(IndexError::merge)?;
        opstamp = opstamp.max(shard_meta.opstamp);

        for segment in shard_meta.segments {
            if segment.num_docs() == 0 {
                continue;
            }
            let files: BTreeSet<PathBuf> = segment.list_files().into_iter().collect();
            for file in files {
                if shard.directory().exists(&file).map_err(IndexError::merge)? {
                    copy_into(&shard, directory, &file)?;
                }
            }
            debug!(
                shard = %shard_dir.display(),
                segment = %segment.id().uuid_string(),
                docs = segment.num_docs(),
                "appending segment"
            );
            added.push(segment.id());
            meta.segments.push(segment);
        }
    }

    if added.is_empty() {
        return Ok(added);
    }

    meta.opstamp = opstamp + 1;
    let mut buffer = serde_json::to_vec_pretty(&meta).map_err(IndexError::merge)?;
    buffer.push(b'\n');
    directory.sync_directory()?;
    directory.atomic_write(Path::new(META_FILE), &buffer)?;

    info!(segments = added.len(), shards = shard_dirs.len(), "shard indexes appended");
    Ok(added)
}

/// Copies one segment file of `shard` into the main index directory.
fn copy_into(shard: &Index, directory: &dyn Directory, name: &Path) -> Result<(), IndexError> {
    let bytes = shard
        .directory()
        .open_read(name)
        .map_err(IndexError::merge)?
        .read_bytes()?;
    let mut writer = directory.open_write(name).map_err(IndexError::merge)?;
    writer.write_all(bytes.as_slice())?;
    writer.terminate()?;
    Ok(())
}
