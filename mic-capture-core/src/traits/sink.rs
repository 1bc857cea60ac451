use crate::models::record::EncodedRecord;

/// Receives the finished record from a completed session.
///
/// The core's entire contract with the sink: called exactly once per
/// completed session, after finalization, never with an error value. Sinks
/// typically serialize the record and hand it to the calling process.
pub trait RecordSink: Send + Sync {
    fn deliver(&self, record: &EncodedRecord);
}
