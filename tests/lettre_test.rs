use lettre::message::{Mailbox, Message};
use lettre::{SmtpTransport, Transport};
use mailwire::{ChannelHandler, SmtpServer};
use std::error::Error;
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[test]
fn basic_lettre_send() -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let server = SmtpServer::new("localhost");

    thread::spawn(move || {
        server
            .start_with_listener(listener, move |_| ChannelHandler::new(tx.clone()))
            .expect("server start failed")
    });

    let message = Message::builder()
        .from("花子 <hanako@example.com>".parse::<Mailbox>()?)
        .to("太郎 <tarou@example.com>".parse::<Mailbox>()?)
        .subject("件名")
        .body("本文".to_owned())?;

    let mailer = SmtpTransport::builder_dangerous("127.0.0.1")
        .port(port)
        .build();

    mailer.send(&message)?;

    let email = rx.recv_timeout(Duration::from_secs(1))?;
    assert_eq!(email.from, "hanako@example.com");
    assert_eq!(email.to, vec!["tarou@example.com"]);
    assert!(email.get_body().is_some());

    Ok(())
}
