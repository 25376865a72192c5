// ============================================================
// SNAPSHOT DECODER
// ============================================================
// Decode the store's delimited-text export into subscriber records.

mod snapshot_decoder;

pub use snapshot_decoder::SnapshotDecoder;
