use alloc::vec::Vec;

use embassy_net::{dns::DnsQueryType, tcp::TcpSocket, Stack};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Write;
use humidity_core::{
    config::{CONNECT_TIMEOUT_MS, HTTP_RESPONSE_MAX, SERVER_RESPONSE_TIMEOUT_MS},
    http::{
        expected_len, parse_response, HttpRequest, HttpResponse, HttpTransport, Scheme,
        TransportError,
    },
};
use static_cell::StaticCell;

const HTTP_RW_BUF: usize = 2048;
const HTTP_READ_CHUNK: usize = 512;
const CLOSE_FLUSH_MS: u64 = 250;

/// One request per connection over plain TCP. `https` targets are refused;
/// point the endpoints at a TLS-terminating relay or the emulator instead.
pub(crate) struct TcpTransport {
    stack: Stack<'static>,
    rx_buffer: &'static mut [u8; HTTP_RW_BUF],
    tx_buffer: &'static mut [u8; HTTP_RW_BUF],
}

impl TcpTransport {
    pub(super) fn new(stack: Stack<'static>) -> Self {
        static RX_BUFFER: StaticCell<[u8; HTTP_RW_BUF]> = StaticCell::new();
        static TX_BUFFER: StaticCell<[u8; HTTP_RW_BUF]> = StaticCell::new();

        Self {
            stack,
            rx_buffer: RX_BUFFER.init([0u8; HTTP_RW_BUF]),
            tx_buffer: TX_BUFFER.init([0u8; HTTP_RW_BUF]),
        }
    }
}

impl HttpTransport for TcpTransport {
    async fn request(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if request.scheme != Scheme::Http {
            return Err(TransportError::UnsupportedScheme);
        }

        let addresses = self
            .stack
            .dns_query(&request.host, DnsQueryType::A)
            .await
            .map_err(|err| {
                log::warn!("http: dns {} err={:?}", request.host, err);
                TransportError::Dns
            })?;
        let address = *addresses.first().ok_or(TransportError::Dns)?;

        let mut socket = TcpSocket::new(
            self.stack,
            &mut self.rx_buffer[..],
            &mut self.tx_buffer[..],
        );
        socket.set_timeout(Some(Duration::from_millis(CONNECT_TIMEOUT_MS)));

        with_timeout(
            Duration::from_millis(CONNECT_TIMEOUT_MS),
            socket.connect((address, request.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout)?
        .map_err(|err| {
            log::warn!("http: connect {}:{} err={:?}", request.host, request.port, err);
            TransportError::Connect
        })?;

        let result = exchange(&mut socket, &request.encode()).await;

        let _ = with_timeout(Duration::from_millis(CLOSE_FLUSH_MS), socket.flush()).await;
        socket.close();
        result
    }
}

async fn exchange(socket: &mut TcpSocket<'_>, encoded: &[u8]) -> Result<HttpResponse, TransportError> {
    socket
        .write_all(encoded)
        .await
        .map_err(|_| TransportError::Io)?;
    socket.flush().await.map_err(|_| TransportError::Io)?;

    let mut raw = Vec::with_capacity(HTTP_READ_CHUNK * 2);
    let read = async {
        let mut chunk = [0u8; HTTP_READ_CHUNK];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(n) => n,
                Err(_) => return Err(TransportError::Io),
            };
            if n == 0 {
                return Ok(());
            }
            raw.extend_from_slice(&chunk[..n]);
            if raw.len() > HTTP_RESPONSE_MAX {
                return Err(TransportError::ResponseTooLarge);
            }
            if expected_len(&raw).is_some_and(|len| raw.len() >= len) {
                return Ok(());
            }
        }
    };

    with_timeout(Duration::from_millis(SERVER_RESPONSE_TIMEOUT_MS), read)
        .await
        .map_err(|_| TransportError::Timeout)??;
    parse_response(&raw)
}
