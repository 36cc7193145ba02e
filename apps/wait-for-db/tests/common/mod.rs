#![allow(dead_code)]

use std::net::TcpListener;

#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

/// A localhost port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

const SSL_REQUEST_CODE: u32 = 80_877_103;

/// Minimal Postgres server on localhost that accepts every startup without a
/// password and goes idle. Serves connections until the test process exits.
pub fn spawn_fake_postgres() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake postgres");
    let port = listener.local_addr().expect("local addr").port();

    std::thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            std::thread::spawn(move || {
                let _ = serve_startup(stream);
            });
        }
    });

    port
}

fn serve_startup(mut stream: std::net::TcpStream) -> std::io::Result<()> {
    use std::io::{Read, Write};

    let mut header = [0u8; 8];
    stream.read_exact(&mut header)?;
    let mut len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let code = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    if code == SSL_REQUEST_CODE {
        stream.write_all(b"N")?;
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf)?;
        len = u32::from_be_bytes(len_buf) as usize;
        let mut startup = vec![0u8; len.saturating_sub(4)];
        stream.read_exact(&mut startup)?;
    } else {
        let mut rest = vec![0u8; len.saturating_sub(8)];
        stream.read_exact(&mut rest)?;
    }

    let mut reply = Vec::new();
    // AuthenticationOk
    reply.extend_from_slice(b"R");
    reply.extend_from_slice(&8u32.to_be_bytes());
    reply.extend_from_slice(&0u32.to_be_bytes());
    // BackendKeyData
    reply.extend_from_slice(b"K");
    reply.extend_from_slice(&12u32.to_be_bytes());
    reply.extend_from_slice(&4242u32.to_be_bytes());
    reply.extend_from_slice(&7u32.to_be_bytes());
    // ReadyForQuery, idle
    reply.extend_from_slice(b"Z");
    reply.extend_from_slice(&5u32.to_be_bytes());
    reply.extend_from_slice(b"I");
    stream.write_all(&reply)?;
    stream.flush()?;

    // Drain until the client sends Terminate and hangs up.
    let mut sink = [0u8; 256];
    while stream.read(&mut sink)? > 0 {}
    Ok(())
}
