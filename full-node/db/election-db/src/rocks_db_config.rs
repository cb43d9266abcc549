// Adapted from Aptos-Core.

use rocksdb::Options;
use serde::Deserialize;

/// Selected RocksDB options for tuning the instance that stores elections and their results.
/// The defaults are taken from Aptos.
/// See <https://github.com/facebook/rocksdb/blob/master/include/rocksdb/options.h>
/// for detailed explanations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RocksdbConfig {
    /// The maximum number of files that can be open concurrently. Defaults to 5000
    pub max_open_files: i32,
    /// Once write-ahead logs exceed this size, RocksDB will start forcing the flush of column
    /// families whose memtables are backed by the oldest live WAL file. Defaults to 1GB
    pub max_total_wal_size: u64,
    /// The maximum number of background threads, including threads for flushing and compaction.
    /// Defaults to 16.
    pub max_background_jobs: i32,
}

impl Default for RocksdbConfig {
    fn default() -> Self {
        Self {
            // Allow db to close old sst files, saving memory.
            max_open_files: 5000,
            // Elections write to several column families at very different rates (one ballot
            // per vote, one results row per candidate at the end), so cap the WAL at 1G.
            max_total_wal_size: 1u64 << 30,
            // This includes threads for flushing and compaction. Rocksdb will decide the # of
            // threads to use internally.
            max_background_jobs: 16,
        }
    }
}

/// Generate [`rocksdb::Options`] corresponding to the given [`RocksdbConfig`].
pub fn gen_rocksdb_options(config: &RocksdbConfig) -> Options {
    let mut db_opts = Options::default();
    db_opts.set_max_open_files(config.max_open_files);
    db_opts.set_max_total_wal_size(config.max_total_wal_size);
    db_opts.set_max_background_jobs(config.max_background_jobs);
    db_opts.create_if_missing(true);
    db_opts.create_missing_column_families(true);
    // Batches span the election and results tables; flush them together.
    db_opts.set_atomic_flush(true);

    db_opts
}
