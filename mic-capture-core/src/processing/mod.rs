//! Pure processing helpers: mime negotiation tables, WAV container writing,
//! and final record assembly. Nothing here owns a device or a thread.

pub mod encoder;
pub mod mime;
pub mod wav;
