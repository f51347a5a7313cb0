//! Pixelflut display wall output.
//!
//! Pixelflut canvases forget nothing but get painted over by everyone else,
//! so the current frame is redrawn continuously until a new one arrives.
//! Pixels are spread round-robin over several TCP connections.

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use image::Rgba;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedWriteHalf, TcpStream},
    sync::{mpsc, oneshot, watch},
    task::JoinSet,
    time::sleep,
};
use tracing::{debug, info, warn};

use super::FrameSink;
use crate::frame::Frame;

const RECONNECT_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct PixelflutConfig {
    /// `host:port` of the pixelflut server.
    pub server: String,
    /// Number of concurrent connections.
    pub threads: usize,
    /// Where the frame's top-left corner lands on the canvas.
    pub offset: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pixel {
    x: u32,
    y: u32,
    value: Rgba<u8>,
}

impl Pixel {
    fn command(&self) -> String {
        let [r, g, b, a] = self.value.0;
        format!(
            "PX {x} {y} {r:02x}{g:02x}{b:02x}{a:02x}\n",
            x = self.x,
            y = self.y
        )
    }
}

/// Asks the server for its canvas size with `SIZE`.
pub async fn fetch_canvas_size(server: &str) -> Result<(u32, u32)> {
    let (rx, mut tx) = TcpStream::connect(server)
        .await
        .with_context(|| format!("connecting to {server}"))?
        .into_split();

    tx.write_all(b"SIZE\n").await.context("sending SIZE")?;

    let mut answer = String::new();
    let read = BufReader::new(rx)
        .read_line(&mut answer)
        .await
        .context("reading SIZE answer")?;
    if read == 0 {
        bail!("{server} hung up before answering SIZE");
    }

    parse_size_answer(&answer)
}

/// Parses `SIZE <width> <height>`.
fn parse_size_answer(answer: &str) -> Result<(u32, u32)> {
    let mut words = answer.split_whitespace();
    match (words.next(), words.next(), words.next(), words.next()) {
        (Some("SIZE"), Some(width), Some(height), None) => {
            let width = width.parse().with_context(|| format!("canvas width `{width}`"))?;
            let height = height
                .parse()
                .with_context(|| format!("canvas height `{height}`"))?;
            Ok((width, height))
        }
        _ => bail!("unexpected answer to SIZE: {:?}", answer.trim_end()),
    }
}

/// Visible pixels of `frame`, moved by `offset` and cut to the canvas.
fn frame_to_pixels(frame: &Frame, offset: (u32, u32), canvas: (u32, u32)) -> Vec<Pixel> {
    frame
        .as_image()
        .enumerate_pixels()
        .filter(|(_, _, px)| px[3] != 0)
        .filter_map(|(x, y, px)| {
            Some(Pixel {
                x: x.checked_add(offset.0)?,
                y: y.checked_add(offset.1)?,
                value: *px,
            })
        })
        .filter(|px| px.x < canvas.0 && px.y < canvas.1)
        .collect()
}

type Batch = (Buffer, oneshot::Sender<usize>);

async fn open_writer(server: &str) -> Result<OwnedWriteHalf> {
    Ok(TcpStream::connect(server)
        .await
        .with_context(|| format!("connecting to {server}"))?
        .into_split()
        .1)
}

async fn connection(
    server: String,
    conn_id: usize,
    num_conns: usize,
) -> Result<mpsc::UnboundedSender<Batch>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Batch>();
    let mut tcp_tx = open_writer(&server).await?;

    tokio::spawn(async move {
        while let Some((buffer, done)) = rx.recv().await {
            let mut errors = 0;

            for px in buffer.iter().skip(conn_id).step_by(num_conns) {
                let command = px.command();

                while let Err(e) = tcp_tx.write_all(command.as_bytes()).await {
                    errors += 1;
                    debug!(conn_id, "write failed, reconnecting: {e}");
                    match open_writer(&server).await {
                        Ok(writer) => tcp_tx = writer,
                        Err(e) => {
                            warn!(conn_id, "{e:#}");
                            sleep(RECONNECT_DELAY).await;
                        }
                    }
                }
            }

            if done.send(errors).is_err() {
                break;
            }
        }
        debug!(conn_id, "connection closed");
    });

    Ok(tx)
}

#[derive(Default, Debug)]
struct Stats {
    errors: usize,
}

fn start_stats(threads: usize) -> mpsc::UnboundedSender<Stats> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Stats>();

    tokio::spawn(async move {
        let mut errors = 0;
        while let Some(stats) = rx.recv().await {
            if stats.errors > 0 {
                errors += stats.errors;
                warn!(threads, errors, "pixelflut write errors");
            }
        }
    });

    tx
}

type Buffer = Arc<Vec<Pixel>>;

struct ConnectionBundle {
    tx: watch::Sender<Buffer>,
}

impl ConnectionBundle {
    async fn new(config: &PixelflutConfig, stats_tx: mpsc::UnboundedSender<Stats>) -> Result<Self> {
        let threads = config.threads.max(1);
        let mut connections = Vec::with_capacity(threads);
        for i in 0..threads {
            connections.push(connection(config.server.clone(), i, threads).await?);
        }
        let connections = Arc::new(connections);

        let (tx, rx) = watch::channel(Buffer::default());
        tokio::spawn(redraw_latest(rx, move |buffer| {
            let connections = connections.clone();
            let stats_tx = stats_tx.clone();
            async move { draw(&connections, &buffer, &stats_tx).await }
        }));

        Ok(Self { tx })
    }

    fn update_buffer(&self, buffer: Vec<Pixel>) -> Result<()> {
        self.tx
            .send(Arc::new(buffer))
            .map_err(|_| anyhow!("pixelflut drawing task is gone"))
    }
}

/// Draws the newest buffer over and over. Buffers replaced while a draw is
/// in flight are never drawn.
async fn redraw_latest<F, Fut>(mut frames: watch::Receiver<Buffer>, mut draw: F)
where
    F: FnMut(Buffer) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    loop {
        let buffer = frames.borrow_and_update().clone();
        if buffer.is_empty() {
            if frames.changed().await.is_err() {
                break;
            }
            continue;
        }

        if let Err(e) = draw(buffer).await {
            warn!("pixelflut drawing stopped: {e:#}");
            break;
        }

        // sender dropped with the sink
        if frames.has_changed().is_err() {
            break;
        }
    }
    debug!("redraw loop ended");
}

async fn draw(
    connections: &[mpsc::UnboundedSender<Batch>],
    buffer: &Buffer,
    stats_tx: &mpsc::UnboundedSender<Stats>,
) -> Result<()> {
    let mut set = JoinSet::new();
    for conn in connections.iter() {
        let (tx, rx) = oneshot::channel();
        conn.send((buffer.clone(), tx))
            .map_err(|_| anyhow!("connection task is gone"))?;
        set.spawn(rx);
    }

    let mut stats = Stats::default();
    while let Some(res) = set.join_next().await {
        stats.errors += res??;
    }
    stats_tx.send(stats).map_err(|e| anyhow!("{e}"))
}

/// Paints frames onto a pixelflut canvas.
pub struct PixelflutSink {
    bundle: ConnectionBundle,
    offset: (u32, u32),
    canvas_size: (u32, u32),
}

impl PixelflutSink {
    pub async fn connect(config: PixelflutConfig) -> Result<Self> {
        let canvas_size = fetch_canvas_size(&config.server).await?;
        info!(
            server = %config.server,
            "canvas is {}x{}",
            canvas_size.0,
            canvas_size.1
        );

        let stats_tx = start_stats(config.threads);
        let bundle = ConnectionBundle::new(&config, stats_tx).await?;

        Ok(Self {
            bundle,
            offset: config.offset,
            canvas_size,
        })
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }
}

impl FrameSink for PixelflutSink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.bundle
            .update_buffer(frame_to_pixels(frame, self.offset, self.canvas_size))
    }

    fn name(&self) -> &'static str {
        "pixelflut"
    }
}
