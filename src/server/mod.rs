use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::progression::TrackRegistry;

pub mod api;
pub mod routes;

pub const BIND_ENV: &str = "FROSTGUIDE_BIND";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// Connections handled at once; later ones queue until a worker frees up.
pub const DEFAULT_WORKERS: usize = 8;

/// Serves the JSON API until the listener fails.
pub fn run_server(bind_addr: &str, registry: Arc<TrackRegistry>) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    tracing::info!(
        target: "frostguide::server",
        addr = %bind_addr,
        tracks = registry.len(),
        "frostguide server listening on http://{bind_addr}"
    );
    serve_listener(listener, registry, DEFAULT_WORKERS)
}

/// Accept loop over an already bound listener. Requests run on a pool of
/// `workers` threads sharing the read-only registry.
pub fn serve_listener(
    listener: TcpListener,
    registry: Arc<TrackRegistry>,
    workers: usize,
) -> std::io::Result<()> {
    let pool = worker_pool(workers)?;
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let registry = Arc::clone(&registry);
                pool.spawn(move || {
                    if let Err(err) = handle_connection(&mut stream, &registry) {
                        tracing::warn!(target: "frostguide::server", error = %err, "request error");
                    }
                });
            }
            Err(err) => {
                tracing::warn!(target: "frostguide::server", error = %err, "connection failed")
            }
        }
    }

    Ok(())
}

fn worker_pool(workers: usize) -> std::io::Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|index| format!("frostguide-http-{index}"))
        .build()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
}

fn handle_connection(stream: &mut TcpStream, registry: &TrackRegistry) -> std::io::Result<()> {
    let mut buffer = [0_u8; 16_384];
    let bytes_read = stream.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let body = request
        .split("\r\n\r\n")
        .nth(1)
        .or_else(|| request.split("\n\n").nth(1))
        .unwrap_or("");

    let response = routes::route_request(registry, method, path, body);
    tracing::debug!(
        target: "frostguide::server",
        method,
        path,
        status = response.status_code,
        "handled request"
    );
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}
