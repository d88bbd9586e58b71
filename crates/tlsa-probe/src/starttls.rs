//! Plain-text STARTTLS dialogues for mail protocols.

use std::fmt;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};

/// Protocol to upgrade before the TLS handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTls {
    /// SMTP, `STARTTLS` after `EHLO`
    Smtp,
    /// POP3, `STLS`
    Pop3,
    /// IMAP, tagged `STARTTLS`
    Imap,
}

impl StartTls {
    /// Protocol spoken on a well-known port, if that port needs an upgrade
    #[must_use]
    pub const fn from_port(port: u16) -> Option<Self> {
        match port {
            25 => Some(Self::Smtp),
            110 => Some(Self::Pop3),
            143 => Some(Self::Imap),
            _ => None,
        }
    }

    /// Protocol name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Smtp => "SMTP",
            Self::Pop3 => "POP3",
            Self::Imap => "IMAP",
        }
    }

    /// Run the dialogue on `stream` until the server is ready for a
    /// ClientHello. `client_name` is announced in `EHLO`.
    pub async fn negotiate<S>(self, stream: &mut S, client_name: &str) -> ProbeResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut conn = Dialogue {
            io: BufReader::new(stream),
            protocol: self,
        };

        match self {
            Self::Smtp => {
                conn.expect_reply("220").await?;
                conn.send(&format!("EHLO {client_name}")).await?;
                conn.expect_reply("250").await?;
                conn.send("STARTTLS").await?;
                conn.expect_reply("220").await?;
            }
            Self::Pop3 => {
                conn.expect_line("+OK").await?;
                conn.send("STLS").await?;
                conn.expect_line("+OK").await?;
            }
            Self::Imap => {
                conn.expect_line("* OK").await?;
                conn.send("a001 STARTTLS").await?;
                conn.expect_tagged("a001", "a001 OK").await?;
            }
        }

        debug!(protocol = self.name(), "STARTTLS accepted");
        Ok(())
    }
}

impl fmt::Display for StartTls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct Dialogue<'a, S> {
    io: BufReader<&'a mut S>,
    protocol: StartTls,
}

impl<S> Dialogue<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn send(&mut self, command: &str) -> ProbeResult<()> {
        debug!(protocol = self.protocol.name(), command, "send");
        let writer = self.io.get_mut();
        writer.write_all(command.as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> ProbeResult<String> {
        let mut line = String::new();
        if self.io.read_line(&mut line).await? == 0 {
            return Err(self.fail("connection closed"));
        }
        let line = line.trim_end().to_string();
        debug!(protocol = self.protocol.name(), line = %line, "recv");
        Ok(line)
    }

    async fn expect_line(&mut self, prefix: &str) -> ProbeResult<()> {
        let line = self.read_line().await?;
        if line.starts_with(prefix) {
            Ok(())
        } else {
            Err(self.fail(line))
        }
    }

    /// Read an SMTP reply, following `NNN-` continuation lines
    async fn expect_reply(&mut self, code: &str) -> ProbeResult<()> {
        loop {
            let line = self.read_line().await?;
            if !line.starts_with(code) {
                return Err(self.fail(line));
            }
            if line.as_bytes().get(code.len()) != Some(&b'-') {
                return Ok(());
            }
        }
    }

    /// Skip untagged responses until the one carrying `tag`
    async fn expect_tagged(&mut self, tag: &str, ok: &str) -> ProbeResult<()> {
        loop {
            let line = self.read_line().await?;
            if line.starts_with(ok) {
                return Ok(());
            }
            if line.starts_with(tag) {
                return Err(self.fail(line));
            }
        }
    }

    fn fail(&self, reply: impl Into<String>) -> ProbeError {
        ProbeError::StartTls {
            protocol: self.protocol.name(),
            reply: reply.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt};

    /// Play `script` as the server: lines starting with `S:` are sent, lines
    /// starting with `C:` must arrive from the client. Returns what the
    /// client sent.
    async fn run(protocol: StartTls, script: &'static [&'static str]) -> (ProbeResult<()>, String) {
        let (mut client, server) = duplex(4096);

        let server_task = tokio::spawn(async move {
            let mut reader = BufReader::new(server);
            let mut received = String::new();
            for step in script {
                if let Some(out) = step.strip_prefix("S:") {
                    reader.get_mut().write_all(format!("{out}\r\n").as_bytes()).await.unwrap();
                } else if step.starts_with("C:") {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    received.push_str(&line);
                }
            }
            // hold the connection open until the client is done
            let mut rest = Vec::new();
            let _ = reader.read_to_end(&mut rest).await;
            received
        });

        let result = protocol.negotiate(&mut client, "probe.example").await;
        drop(client);
        (result, server_task.await.unwrap())
    }

    #[test]
    fn test_from_port() {
        assert_eq!(StartTls::from_port(25), Some(StartTls::Smtp));
        assert_eq!(StartTls::from_port(110), Some(StartTls::Pop3));
        assert_eq!(StartTls::from_port(143), Some(StartTls::Imap));
        assert_eq!(StartTls::from_port(443), None);
        assert_eq!(StartTls::from_port(993), None);
    }

    #[tokio::test]
    async fn test_smtp_multiline_ehlo() {
        let (result, received) = run(
            StartTls::Smtp,
            &[
                "S:220-mx.example.com ESMTP",
                "S:220 ready",
                "C:",
                "S:250-mx.example.com",
                "S:250-PIPELINING",
                "S:250-STARTTLS",
                "S:250 8BITMIME",
                "C:",
                "S:220 2.0.0 Ready to start TLS",
            ],
        )
        .await;
        result.unwrap();
        assert_eq!(received, "EHLO probe.example\r\nSTARTTLS\r\n");
    }

    #[tokio::test]
    async fn test_smtp_refused() {
        let (result, _) = run(
            StartTls::Smtp,
            &["S:220 ready", "C:", "S:250 mx.example.com", "C:", "S:454 TLS not available"],
        )
        .await;
        match result.unwrap_err() {
            ProbeError::StartTls { protocol, reply } => {
                assert_eq!(protocol, "SMTP");
                assert_eq!(reply, "454 TLS not available");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_pop3() {
        let (result, received) = run(
            StartTls::Pop3,
            &["S:+OK POP3 ready", "C:", "S:+OK Begin TLS negotiation"],
        )
        .await;
        result.unwrap();
        assert_eq!(received, "STLS\r\n");
    }

    #[tokio::test]
    async fn test_imap_skips_untagged() {
        let (result, received) = run(
            StartTls::Imap,
            &[
                "S:* OK [CAPABILITY IMAP4rev1 STARTTLS] ready",
                "C:",
                "S:* CAPABILITY IMAP4rev1 STARTTLS",
                "S:a001 OK Begin TLS negotiation now",
            ],
        )
        .await;
        result.unwrap();
        assert_eq!(received, "a001 STARTTLS\r\n");
    }

    #[tokio::test]
    async fn test_imap_tagged_failure() {
        let (result, _) = run(
            StartTls::Imap,
            &["S:* OK ready", "C:", "S:a001 BAD STARTTLS disabled"],
        )
        .await;
        assert!(matches!(result, Err(ProbeError::StartTls { protocol: "IMAP", .. })));
    }

    #[tokio::test]
    async fn test_server_hangs_up() {
        let (mut client, server) = duplex(64);
        drop(server);
        let result = StartTls::Pop3.negotiate(&mut client, "probe.example").await;
        assert!(matches!(result, Err(ProbeError::StartTls { .. })));
    }
}
