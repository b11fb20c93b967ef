use anyhow::Result;
use launch_api::Envelope;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Read one line-delimited JSON envelope. `None` once the peer closes the
/// stream; blank lines are skipped.
pub async fn read_envelope<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Envelope>> {
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    let env = serde_json::from_str(line.trim())?;
    Ok(Some(env))
}

/// Send one envelope as a single newline-terminated line and flush, so the
/// editor sees it before the next read.
pub async fn write_envelope<W: AsyncWrite + Unpin>(writer: &mut W, env: &Envelope) -> Result<()> {
    let mut line = serde_json::to_vec(env)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
