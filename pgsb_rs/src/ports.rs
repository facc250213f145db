//! Ephemeral TCP port allocation.
//!
//! Binds `127.0.0.1:0`, reads the port the kernel picked and releases it.
//! Nothing holds the port afterwards: another process may take it before
//! the provisioned service binds it. That window is accepted.

use std::io;
use std::net::TcpListener;

pub fn allocate_ephemeral() -> io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    tracing::debug!(port, "allocated ephemeral port");
    Ok(port)
}

/// Use `requested` when given, otherwise allocate.
pub fn choose(requested: Option<u16>) -> io::Result<u16> {
    match requested {
        Some(port) => Ok(port),
        None => allocate_ephemeral(),
    }
}
