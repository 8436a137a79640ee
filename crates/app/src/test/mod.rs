//! Test support

mod db;
pub(crate) mod helpers;

pub(crate) use context::TestContext;
pub(crate) use db::{TestDb, TestRedis};
pub(crate) use stores::{MemorySaleStore, RecordingPublisher};
