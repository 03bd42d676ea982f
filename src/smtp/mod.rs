//! SMTP client and server implementation

pub mod address;
pub mod channel;
pub mod client;
pub mod commands;
pub mod connector;
pub mod email;
pub mod error;
pub mod handler;
pub mod message;
pub mod resolver;
pub mod response;
pub mod server;
pub mod session;

pub use address::{Address, RecipientGroup, group_by_domain, parse_address};
pub use channel::{CommandChannel, PendingResponse};
pub use client::{ClientConfig, ClientState, ClientTransaction, Compatibility, SmtpClient};
pub use commands::Command;
pub use connector::{Dialer, TcpDialer, Transport, select_connection};
pub use email::Email;
pub use error::SmtpError;
pub use handler::{ChannelHandler, Handler, LogHandler};
pub use message::Message;
pub use resolver::{DnsResolver, MxRecord, MxResolver, resolve_mx_hosts};
pub use response::SmtpResponse;
pub use server::{Connection, SmtpServer};
pub use session::{SequencePolicy, ServerSession, SmtpState};
