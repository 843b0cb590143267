use bytes::BytesMut;
use std::io::{self, BufRead, Write};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use ember::resp::take_line;

#[tokio::main]
async fn main() -> io::Result<()> {
    let mut host = "127.0.0.1".to_string();
    let mut port = 6379u16;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--host" | "-h" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 1;
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    if let Ok(p) = args[i + 1].parse() {
                        port = p;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let addr = format!("{host}:{port}");
    let mut stream = TcpStream::connect(&addr).await?;
    eprintln!("Connected to {addr}");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut buf = BytesMut::with_capacity(4096);

    loop {
        print!("ember> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            break; // EOF
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\r\n").await?;

        match read_reply(&mut stream, &mut buf).await? {
            Some(text) => println!("{text}"),
            None => {
                eprintln!("Connection closed by server");
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Read one complete reply and render it. Returns `None` on EOF.
async fn read_reply(stream: &mut TcpStream, buf: &mut BytesMut) -> io::Result<Option<String>> {
    let header = match read_line(stream, buf).await? {
        Some(line) => line,
        None => return Ok(None),
    };

    let rendered = match header.as_bytes().first() {
        Some(b'+') => header[1..].to_string(),
        Some(b'-') => format!("(error) {}", &header[1..]),
        Some(b':') => format!("(integer) {}", &header[1..]),
        Some(b'$') => {
            if header == "$-1" {
                "(nil)".to_string()
            } else {
                // Bulk payload follows on its own line.
                match read_line(stream, buf).await? {
                    Some(payload) => format!("\"{payload}\""),
                    None => return Ok(None),
                }
            }
        }
        _ => header,
    };

    Ok(Some(rendered))
}

async fn read_line(stream: &mut TcpStream, buf: &mut BytesMut) -> io::Result<Option<String>> {
    loop {
        if let Some(line) = take_line(buf) {
            return Ok(Some(line));
        }
        let n = stream.read_buf(buf).await?;
        if n == 0 {
            return Ok(None);
        }
    }
}
