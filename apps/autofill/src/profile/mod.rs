// Profile management: storage backends, resume import and the HTTP surface
// for reading and editing the stored profile and settings.

pub mod handlers;
pub mod prompts;
pub mod resume;
pub mod store;
