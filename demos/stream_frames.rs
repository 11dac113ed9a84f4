//! Encode a short synthetic animation while a second thread drains the produced bytes.

use gifcast::{EncoderOptions, GifEncoder, OutputEvent, Repeat, channel_output};
use std::io::Write as _;

const W: u32 = 64;
const H: u32 = 64;

fn frame(t: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((W * H * 4) as usize);
    for y in 0..H {
        for x in 0..W {
            out.push(((x * 4 + t * 16) % 256) as u8);
            out.push(((y * 4) % 256) as u8);
            out.push(((x + y + t * 8) % 256) as u8);
            out.push(0xFF);
        }
    }
    out
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = EncoderOptions::from_json_str(r#"{ "repeat": 0, "frameRate": 12.5 }"#)?;
    assert_eq!(opts.repeat, Repeat::Infinite);
    let mut enc = GifEncoder::with_options(W, H, &opts)?;

    let (out, rx) = channel_output();
    enc.add_output(out)?;
    let writer = std::thread::spawn(move || -> anyhow::Result<usize> {
        let path = std::env::temp_dir().join("gifcast_stream_frames.gif");
        let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
        let mut total = 0;
        for event in rx {
            match event {
                OutputEvent::Bytes(b) => {
                    total += b.len();
                    file.write_all(&b)?;
                }
                OutputEvent::Finished => break,
            }
        }
        file.flush()?;
        println!("wrote {} ({total} bytes)", path.display());
        Ok(total)
    });

    for t in 0..16 {
        let report = enc.add_frame(&frame(t))?;
        println!(
            "frame {}: {} bytes, {} colors used",
            report.index, report.bytes, report.used_colors
        );
    }
    enc.finish()?;

    writer
        .join()
        .map_err(|_| anyhow::anyhow!("writer thread panicked"))??;
    Ok(())
}
