//! Basic usage example for mailwire
//!
//! Starts a server that forwards received mail to a channel, then delivers
//! one message to it with the client.

use mailwire::{
    ChannelHandler, ClientConfig, Compatibility, Message, MxRecord, MxResolver, SmtpClient,
    SmtpError, SmtpServer,
};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// The relay host is fixed below, so no lookups are ever made
struct NoMx;

impl MxResolver for NoMx {
    fn lookup_mx(&self, _domain: &str) -> Result<Vec<MxRecord>, SmtpError> {
        Ok(Vec::new())
    }
}

fn main() {
    println!("mailwire Basic Usage Example");
    println!("============================");

    let (tx, rx) = mpsc::channel();
    let server = SmtpServer::new("example.local");
    println!("Created SMTP server with hostname: example.local");

    let _server_thread = thread::spawn(move || {
        if let Err(e) = server.start("127.0.0.1:2525", move |_| ChannelHandler::new(tx.clone())) {
            eprintln!("Server error: {e}");
        }
    });

    println!("Server started on 127.0.0.1:2525");
    thread::sleep(Duration::from_millis(100));

    let config = ClientConfig {
        host: Some("127.0.0.1".to_string()),
        port: 2525,
        local_identity: "client.example.com".to_string(),
        compatibility: Compatibility::Standard,
        ..Default::default()
    };
    let client = SmtpClient::new(config, Box::new(NoMx));

    let message = Message::new("sender@example.com")
        .to("recipient@example.com")
        .cc("another@example.org")
        .subject("Test Email from mailwire")
        .body("This is a test email sent to demonstrate\nthe mailwire client and server.");

    println!("\nSending test email...");
    if let Err(e) = client.send(&message) {
        eprintln!("Failed to send email: {e}");
        return;
    }

    // One transaction per recipient domain, so two deliveries arrive
    println!("\nCollecting emails...");
    let mut emails = Vec::new();
    while let Ok(email) = rx.recv_timeout(Duration::from_millis(500)) {
        emails.push(email);
    }

    for email in &emails {
        println!("Email received:");
        println!("  From: {}", email.from);
        println!("  To: {:?}", email.to);
        println!("  Subject: {:?}", email.get_subject());
        println!("  Timestamp: {:?}", email.timestamp);
    }
    println!("Collected {} email(s) total", emails.len());
}
