//! Network plumbing
//!
//! The CYW43 and embassy-net runner tasks, plus a minimal HTTP/1.0 GET
//! used by the data sources. HTTP/1.0 with `Connection: close` keeps the
//! client trivial: no keep-alive, no chunked bodies, read to EOF.

use aither_core::traits::FetchError;
use core::fmt::Write;
use cyw43_pio::PioSpi;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::Duration;
use embedded_io_async::Write as _;
use heapless::String;

/// Per-socket buffer size; responses stream through the caller's buffer
const SOCKET_BUF: usize = 4096;

#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Fetch `http://{host}{path}` and return the response body.
///
/// The whole exchange shares the caller's buffer; a body longer than the
/// buffer is truncated at the buffer's end. Callers wrap this in
/// `with_timeout` so a stalled peer surfaces as [`FetchError::Timeout`].
pub async fn http_get<'b>(
    stack: Stack<'static>,
    host: &str,
    path: &str,
    buf: &'b mut [u8],
) -> Result<&'b [u8], FetchError> {
    let addrs = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|_| FetchError::Transport)?;
    let addr = *addrs.first().ok_or(FetchError::Transport)?;

    let mut rx_buffer = [0u8; SOCKET_BUF];
    let mut tx_buffer = [0u8; SOCKET_BUF];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(10)));

    socket
        .connect((addr, 80))
        .await
        .map_err(|_| FetchError::Transport)?;

    let mut request: String<256> = String::new();
    write!(
        request,
        "GET {path} HTTP/1.0\r\nHost: {host}\r\nUser-Agent: aither\r\nConnection: close\r\n\r\n"
    )
    .map_err(|_| FetchError::Transport)?;

    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|_| FetchError::Transport)?;

    let mut total = 0;
    loop {
        match socket.read(&mut buf[total..]).await {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                if total == buf.len() {
                    break;
                }
            }
            Err(_) => return Err(FetchError::Transport),
        }
    }
    let response = &buf[..total];

    if !status_is_ok(response) {
        return Err(FetchError::Transport);
    }

    let body_start =
        find_subslice(response, b"\r\n\r\n").ok_or(FetchError::Malformed)? + 4;
    Ok(&response[body_start..])
}

/// Accept any `HTTP/1.x 200` status line
fn status_is_ok(response: &[u8]) -> bool {
    response.starts_with(b"HTTP/1.") && response.get(8..13) == Some(&b" 200 "[..])
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
