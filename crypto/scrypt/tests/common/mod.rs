#[path = "../../src/test_util.rs"]
mod test_util;

pub use test_util::unhex;

// RUST_LOG=scrypt=trace cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
