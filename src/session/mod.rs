/// Preview session with last-request-wins supersession.
pub mod preview;
