//! Archive file and file recycle log repositories.

use crate::cursor::BoxCursor;
use crate::error::CatalogueResult;
use crate::models::{
    ArchiveFileRow, ArchiveFileSearchCriteria, FileRecycleLogRow, RecycleLogSearchCriteria,
    TapeFileWritten,
};
use async_trait::async_trait;

/// Repository for archived files and their tape copies.
#[async_trait]
pub trait ArchiveFileRepo: Send + Sync {
    /// Record that a copy of a file was written to tape.
    ///
    /// Creates the archive file on its first copy. The tape's last fseq must
    /// advance by exactly one.
    async fn file_written_to_tape(&self, event: &TapeFileWritten) -> CatalogueResult<()>;

    async fn get_archive_file(&self, archive_file_id: u64)
    -> CatalogueResult<Option<ArchiveFileRow>>;

    /// Lazily list archive files, with their tape copies, from the listing pool.
    async fn get_archive_files(
        &self,
        criteria: &ArchiveFileSearchCriteria,
    ) -> CatalogueResult<BoxCursor<ArchiveFileRow>>;

    /// Delete an archive file, moving every tape copy into the recycle log.
    async fn delete_archive_file(
        &self,
        disk_instance_name: &str,
        archive_file_id: u64,
        reason: &str,
    ) -> CatalogueResult<()>;
}

/// Repository for tape copies of deleted files.
#[async_trait]
pub trait FileRecycleLogRepo: Send + Sync {
    async fn get_file_recycle_logs(
        &self,
        criteria: &RecycleLogSearchCriteria,
    ) -> CatalogueResult<BoxCursor<FileRecycleLogRow>>;

    /// Forget every recycled copy that lived on a tape.
    async fn delete_files_from_recycle_log(&self, vid: &str) -> CatalogueResult<u64>;
}
