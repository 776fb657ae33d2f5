/// Installs a `tracing` fmt subscriber that writes to standard error.
///
/// Failures recorded with `ErrorLog::Stderr` only become visible once some
/// subscriber is installed. Safe to call more than once; later calls are
/// no-ops, as is calling it after the host application installed its own.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}
