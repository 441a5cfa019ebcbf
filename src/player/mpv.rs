use super::{AudioOutput, PlaybackError, PlayerEvent};
use crate::app::events::Event;
use anyhow::Context;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};

/// Properties observed over IPC, in observer-id order.
const OBSERVED: &[&str] = &["time-pos", "duration", "pause", "eof-reached", "volume", "mute"];

#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    writer: tokio::sync::Mutex<tokio::io::WriteHalf<UnixStream>>,
    request_id: AtomicU64,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("cloudtide-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args([
            "--no-video",
            "--idle=yes",
            "--input-terminal=no",
            "--really-quiet",
            "--audio-display=no",
        ]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn mpv")?;

        // mpv creates the socket shortly after starting.
        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        tokio::spawn(read_events_loop(reader, event_tx));

        let this = Self {
            child,
            socket_path,
            writer: tokio::sync::Mutex::new(writer),
            request_id: AtomicU64::new(1),
        };

        this.command(json!({"command":["request_log_messages", "warn"]}))
            .await
            .context("request mpv log messages")?;
        for (id, prop) in OBSERVED.iter().enumerate() {
            this.command(json!({"command":["observe_property", id + 1, prop]}))
                .await
                .with_context(|| format!("observe mpv property {prop}"))?;
        }

        tracing::debug!(socket = %this.socket_path.display(), "mpv ready");
        Ok(this)
    }

    async fn command(&self, mut v: Value) -> Result<(), PlaybackError> {
        // Tag requests so failures come back as structured replies.
        if v.get("request_id").is_none() {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            if let Value::Object(ref mut o) = v {
                o.insert("request_id".to_string(), Value::from(id));
            }
        }
        let mut line = serde_json::to_vec(&v)?;
        line.push(b'\n');
        let mut w = self.writer.lock().await;
        w.write_all(&line).await?;
        w.flush().await?;
        Ok(())
    }
}

impl AudioOutput for MpvHandle {
    async fn load(&self, url: &str) -> Result<(), PlaybackError> {
        self.command(json!({"command":["loadfile", url, "replace"]})).await
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        self.command(json!({"command":["set_property", "pause", false]}))
            .await
    }

    async fn pause(&self) -> Result<(), PlaybackError> {
        self.command(json!({"command":["set_property", "pause", true]}))
            .await
    }

    async fn stop(&self) -> Result<(), PlaybackError> {
        self.command(json!({"command":["stop"]})).await
    }

    async fn seek_to(&self, seconds: f64) -> Result<(), PlaybackError> {
        self.command(json!({"command":["seek", seconds, "absolute"]}))
            .await
    }

    async fn set_volume(&self, percent: u8) -> Result<(), PlaybackError> {
        self.command(json!({"command":["set_property", "volume", percent]}))
            .await
    }

    async fn set_muted(&self, muted: bool) -> Result<(), PlaybackError> {
        self.command(json!({"command":["set_property", "mute", muted]}))
            .await
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &Path) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn read_events_loop(reader: tokio::io::ReadHalf<UnixStream>, event_tx: mpsc::Sender<Event>) {
    let mut lines = BufReader::new(reader).lines();
    let mut paused = false;
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        if let Some(pe) = map_mpv_event(&v, &mut paused)
            && event_tx.send(Event::Player(pe)).await.is_err()
        {
            break;
        }
    }
    tracing::debug!("mpv ipc closed");
}

/// `paused` mirrors mpv's pause property: a `loadfile` while already
/// unpaused produces no pause change, so `file-loaded` re-announces it.
fn map_mpv_event(v: &Value, paused: &mut bool) -> Option<PlayerEvent> {
    // Command replies: {"request_id":..., "error":"..."}
    if v.get("request_id").is_some() {
        let err = v.get("error")?.as_str()?;
        return (err != "success").then(|| PlayerEvent::Warning(format!("mpv ipc error: {err}")));
    }

    match v.get("event")?.as_str()? {
        "property-change" => {
            let data = v.get("data")?;
            match v.get("name")?.as_str()? {
                "time-pos" => Some(PlayerEvent::Position {
                    seconds: data.as_f64()?,
                }),
                "duration" => Some(PlayerEvent::Duration {
                    seconds: data.as_f64()?,
                }),
                "pause" => {
                    *paused = data.as_bool()?;
                    Some(pause_event(*paused))
                }
                "eof-reached" => data.as_bool()?.then_some(PlayerEvent::Ended),
                "volume" => Some(PlayerEvent::Volume {
                    percent: data.as_f64()?,
                }),
                "mute" => Some(PlayerEvent::Muted(data.as_bool()?)),
                _ => None,
            }
        }
        "file-loaded" => Some(pause_event(*paused)),
        "end-file" => match v.get("reason").and_then(Value::as_str).unwrap_or("") {
            "eof" => Some(PlayerEvent::Ended),
            "error" => {
                let err = v.get("file_error").or_else(|| v.get("error"));
                let err = err.and_then(Value::as_str).unwrap_or("unknown");
                Some(PlayerEvent::Error(format!("mpv end-file error: {err}")))
            }
            // "stop" / "quit" / "redirect": replaced by a new loadfile
            _ => None,
        },
        "log-message" => {
            let level = v.get("level")?.as_str().unwrap_or("info");
            let text = v.get("text")?.as_str().unwrap_or("").trim();
            ((level == "warn" || level == "error") && !text.is_empty())
                .then(|| PlayerEvent::Warning(format!("mpv {level}: {text}")))
        }
        _ => None,
    }
}

fn pause_event(paused: bool) -> PlayerEvent {
    if paused {
        PlayerEvent::Paused
    } else {
        PlayerEvent::Started
    }
}

/// Device names from `mpv --audio-device=help`; `auto` when none are listed.
pub async fn list_audio_devices() -> anyhow::Result<Vec<String>> {
    let out = Command::new("mpv")
        .args(["--audio-device=help", "--no-video", "--idle=no"])
        .output()
        .await
        .context("run mpv --audio-device=help")?;
    Ok(parse_audio_devices(&String::from_utf8_lossy(&out.stdout)))
}

fn parse_audio_devices(text: &str) -> Vec<String> {
    let mut devices: Vec<String> = text
        .lines()
        .filter_map(|line| {
            // "'name' (description)"
            let rest = line.trim().strip_prefix('\'')?;
            let end = rest.find('\'')?;
            Some(rest[..end].to_string())
        })
        .collect();
    if devices.is_empty() {
        devices.push("auto".into());
    }
    devices
}
