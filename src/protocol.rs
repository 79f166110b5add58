//! Wire protocol between a pose-estimation client and the analysis server.
//!
//! Every message is a UTF-8 JSON envelope `{"type": ..., "payload": {...}}`
//! carried in a length-delimited frame.

use bytes::Bytes;
use futures::{Sink, SinkExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::analysis::{Diagnostics, FeedbackTag, FrameResult, Phase, SessionReport};
use crate::pose::{Landmark, Pose, PoseError};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unknown message type: {0}")]
    UnknownType(String),
    #[error("invalid pose: {0}")]
    InvalidPose(#[from] PoseError),
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

// --- Client → server ---

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PosePayload {
    /// `None` when the pose estimator found no body in the frame
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl PosePayload {
    pub fn into_pose(self) -> Result<Option<Pose>, PoseError> {
        self.landmarks.map(Pose::try_from).transpose()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// One frame of landmarks, already validated as a full snapshot.
    PoseData(Option<Pose>),
    StartSession,
    EndSession,
}

impl ClientMessage {
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_slice(data)?;
        match envelope.kind.as_str() {
            "POSE_DATA" => {
                let payload: PosePayload = if envelope.payload.is_null() {
                    PosePayload::default()
                } else {
                    serde_json::from_value(envelope.payload)?
                };
                Ok(ClientMessage::PoseData(payload.into_pose()?))
            }
            "START_SESSION" => Ok(ClientMessage::StartSession),
            "END_SESSION" => Ok(ClientMessage::EndSession),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        let (kind, payload) = match self {
            ClientMessage::PoseData(pose) => {
                let payload = PosePayload {
                    landmarks: pose.as_ref().map(|p| p.landmarks.to_vec()),
                };
                ("POSE_DATA", serde_json::to_value(payload)?)
            }
            ClientMessage::StartSession => ("START_SESSION", serde_json::json!({})),
            ClientMessage::EndSession => ("END_SESSION", serde_json::json!({})),
        };
        serde_json::to_vec(&Envelope {
            kind: kind.to_string(),
            payload,
        })
    }
}

// --- Server → client ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub rep_count: u32,
    pub has_landmarks: bool,
    /// Non-empty only on the frame that completed a repetition
    pub feedback: Vec<FeedbackTag>,
    pub state: Phase,
    /// `{}` when no pose was admitted
    #[serde(with = "debug_data", default)]
    pub debug_data: Option<Diagnostics>,
    /// Landmarks echoed back for skeleton overlays
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl FeedbackPayload {
    pub fn new(result: FrameResult, pose: Option<&Pose>) -> Self {
        Self {
            rep_count: result.rep_count,
            has_landmarks: result.has_landmarks,
            feedback: result.feedback,
            state: result.phase,
            debug_data: result.diagnostics,
            landmarks: pose.map(|p| p.landmarks.to_vec()).unwrap_or_default(),
        }
    }
}

mod debug_data {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::analysis::Diagnostics;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Full(Diagnostics),
        Empty {},
    }

    pub fn serialize<S: Serializer>(value: &Option<Diagnostics>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(diagnostics) => diagnostics.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Diagnostics>, D::Error> {
        Ok(match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Full(diagnostics)) => Some(diagnostics),
            Some(Repr::Empty {}) | None => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    Feedback(FeedbackPayload),
    Report(SessionReport),
    Error { message: String },
    Info { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error { message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        ServerMessage::Info { message: message.into() }
    }
}

// --- Framing helpers ---

pub type MessageStream<T> = Framed<T, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream<T: AsyncRead + AsyncWrite>(io: T, max_frame_length: usize) -> MessageStream<T> {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_length)
        .new_codec();
    Framed::new(io, codec)
}

/// Serialize a message as JSON and send it as one frame.
pub async fn send_to_sink<S, M>(sink: &mut S, msg: &M) -> anyhow::Result<()>
where
    S: Sink<Bytes, Error = std::io::Error> + Unpin,
    M: Serialize,
{
    let data = serde_json::to_vec(msg)?;
    sink.send(Bytes::from(data)).await?;
    Ok(())
}
