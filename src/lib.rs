//! # mailwire
//!
//! mailwire is a minimal SMTP engine with both halves of the protocol:
//! a client that resolves recipient domains and delivers a message to
//! each of them, and a server that runs the receiving transaction and hands
//! complete messages to a pluggable [`Handler`].
//!
//! ## Receiving
//!
//! ```rust,no_run
//! use mailwire::{ChannelHandler, SmtpServer};
//! use std::sync::mpsc;
//! use std::thread;
//! use std::time::Duration;
//!
//! let (tx, rx) = mpsc::channel();
//! let server = SmtpServer::new("test.local");
//!
//! thread::spawn(move || {
//!     server
//!         .start("127.0.0.1:2525", move |_| ChannelHandler::new(tx.clone()))
//!         .unwrap();
//! });
//!
//! if let Ok(email) = rx.recv_timeout(Duration::from_secs(1)) {
//!     println!("Received email from: {}", email.from);
//! }
//! ```
//!
//! ## Sending
//!
//! ```rust,no_run
//! use mailwire::{ClientConfig, DnsResolver, Message, SmtpClient};
//!
//! let resolver = DnsResolver::from_system_conf()?;
//! let client = SmtpClient::new(ClientConfig::default(), Box::new(resolver));
//! let message = Message::new("a@x.com").to("b@y.com").subject("Hi").body("Hello");
//! client.send(&message)?;
//! # Ok::<(), mailwire::SmtpError>(())
//! ```
//!
//! ## Supported SMTP commands
//!
//! - `HELO` / `EHLO` - Identify the client
//! - `MAIL FROM` - Specify the sender's address
//! - `RCPT TO` - Specify a recipient (multiple recipients are supported)
//! - `DATA` - Send the message, terminated by a line holding only `.`
//! - `QUIT` - Close connection
//!
//! ## Notes
//!
//! - The server accepts commands in any order by default; see
//!   [`SequencePolicy::Strict`] for RFC-style ordering.
//! - The client expects `220` in reply to `EHLO` unless
//!   [`Compatibility::Standard`] is selected.
//! - No TLS, authentication, pipelining, or queueing. A failed delivery is
//!   reported to the caller and never retried.

mod smtp;

pub use smtp::{
    Address, ChannelHandler, ClientConfig, ClientState, ClientTransaction, Command,
    CommandChannel, Compatibility, Connection, Dialer, DnsResolver, Email, Handler, LogHandler,
    Message, MxRecord, MxResolver, PendingResponse, RecipientGroup, SequencePolicy, ServerSession,
    SmtpClient, SmtpError, SmtpResponse, SmtpServer, SmtpState, TcpDialer, Transport,
    group_by_domain, parse_address, resolve_mx_hosts, select_connection,
};
