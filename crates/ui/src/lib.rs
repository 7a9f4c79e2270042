#![deny(unsafe_code)]
/// Terminal chat client for the zova generation backend.
///
/// Messages (optionally with one image, audio or PDF attachment) are sent to the
/// backend route matching the attachment type and the replies rendered inline.
pub mod app;
/// Chat domain: composer, controller and conversation surfaces.
pub mod chat;
/// Backend address resolution.
pub mod settings;
