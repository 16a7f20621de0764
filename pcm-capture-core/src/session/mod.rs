pub mod backend;
pub mod event_loop_thread;
pub mod unsupported;

#[cfg(test)]
pub(crate) mod fake_host;
