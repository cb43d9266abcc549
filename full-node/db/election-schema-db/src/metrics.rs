// Copyright (c) Aptos
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter_vec, HistogramVec,
    IntCounterVec,
};

pub static SCHEMADB_ITER_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_iter_latency_seconds",
        "election_schema_db iter latency in seconds",
        &["cf_name"],
        exponential_buckets(/*start=*/ 1e-6, /*factor=*/ 2.0, /*count=*/ 22).unwrap(),
    )
    .unwrap()
});

pub static SCHEMADB_ITER_BYTES: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_iter_bytes",
        "election_schema_db iter size in bytes",
        &["cf_name"]
    )
    .unwrap()
});

pub static SCHEMADB_GET_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_get_latency_seconds",
        "election_schema_db get latency in seconds",
        &["cf_name"],
        exponential_buckets(/*start=*/ 1e-6, /*factor=*/ 2.0, /*count=*/ 22).unwrap(),
    )
    .unwrap()
});

pub static SCHEMADB_GET_BYTES: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_get_bytes",
        "election_schema_db get call returned data size in bytes",
        &["cf_name"]
    )
    .unwrap()
});

pub static SCHEMADB_BATCH_COMMIT_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_batch_commit_latency_seconds",
        "election_schema_db schema batch commit latency in seconds",
        &["db_name"],
        exponential_buckets(/*start=*/ 1e-3, /*factor=*/ 2.0, /*count=*/ 20).unwrap(),
    )
    .unwrap()
});

pub static SCHEMADB_BATCH_COMMIT_BYTES: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_batch_commit_bytes",
        "election_schema_db schema batch commit size in bytes",
        &["db_name"]
    )
    .unwrap()
});

pub static SCHEMADB_PUT_BYTES: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_put_bytes",
        "election_schema_db put call puts data size in bytes",
        &["cf_name"]
    )
    .unwrap()
});

pub static SCHEMADB_DELETES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "election_schema_db_deletes",
        "election_schema_db delete calls",
        &["cf_name"]
    )
    .unwrap()
});

pub static SCHEMADB_BATCH_PUT_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "election_schema_db_batch_put_latency_seconds",
        "election_schema_db schema batch put latency in seconds",
        &["cf_name"],
        exponential_buckets(/*start=*/ 1e-6, /*factor=*/ 2.0, /*count=*/ 22).unwrap(),
    )
    .unwrap()
});
