//! Line-delimited JSON framing over a TCP stream.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::net::TcpStream;

use anyhow::ensure;
use anyhow::Context;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Both directions of one connection: buffered reads, line-framed writes.
pub struct Codec {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Codec {
    pub fn new(stream: TcpStream) -> Result<Self> {
        let reader = BufReader::new(stream.try_clone().context("cloning the stream")?);
        Ok(Self { reader, writer: stream })
    }

    /// Write one message as a single JSON line.
    pub fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        self.writer.write_all(line.as_bytes()).context("writing to the peer")?;
        Ok(())
    }

    /// Read the next message. Fails on EOF or a line that isn't valid JSON
    /// for `T`.
    pub fn recv<T: DeserializeOwned>(&mut self) -> Result<T> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).context("reading from the peer")?;
        ensure!(read > 0, "peer closed the connection");

        serde_json::from_str(line.trim_end()).context("malformed message")
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::DoWorkRequest;
    use crate::GetWorkResponse;
    use crate::Reply;

    /// A connected pair of codecs over loopback.
    fn pair() -> (Codec, Codec) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || TcpStream::connect(addr).unwrap());
        let (server, _) = listener.accept().unwrap();

        (Codec::new(server).unwrap(), Codec::new(client.join().unwrap()).unwrap())
    }

    #[test]
    fn messages_round_trip() {
        let (mut server, mut client) = pair();

        client.send(&DoWorkRequest { state: vec![1, 2, 3], budget_ms: 500 }).unwrap();
        let received: DoWorkRequest = server.recv().unwrap();

        assert_eq!(received.state, vec![1, 2, 3]);
        assert_eq!(received.budget_ms, 500);
    }

    #[test]
    fn replies_carry_errors_across() {
        let (mut server, mut client) = pair();

        server.send(&Reply::<GetWorkResponse>::Err("bad state".into())).unwrap();
        let reply: Reply<GetWorkResponse> = client.recv().unwrap();

        let err = reply.into_result().unwrap_err();
        assert!(err.to_string().contains("bad state"));
    }

    #[test]
    fn consecutive_messages_stay_framed() {
        let (mut server, mut client) = pair();

        for budget in [1u64, 2, 3] {
            client.send(&DoWorkRequest { state: vec![], budget_ms: budget }).unwrap();
        }

        for budget in [1u64, 2, 3] {
            let received: DoWorkRequest = server.recv().unwrap();
            assert_eq!(received.budget_ms, budget);
        }
    }

    #[test]
    fn eof_is_an_error() {
        let (mut server, client) = pair();
        drop(client);

        assert!(server.recv::<DoWorkRequest>().is_err());
    }
}
