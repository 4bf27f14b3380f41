use anyhow::{Context, Result};
use serde::Serialize;
use solari_core::{
    codec::ContentCodec, constants::HostMessage, encoder::encode_frame, Content, ContentExplanation,
    Profile, Side,
};

/// Result of an offline encode
#[derive(Debug, Serialize)]
pub struct EncodedContent {
    /// One code per unit
    pub units: Vec<u8>,

    /// How the panel would read the units back
    pub explanation: ContentExplanation,

    /// Hex of the SET_ALL frame, when a side was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

/// Encode content without touching a device
pub fn encode(profile: &Profile, content: &Content, frame: Option<Side>) -> Result<EncodedContent> {
    let codec = ContentCodec::new(profile);
    let units = codec
        .encode(content)
        .context("Content cannot be shown on this panel")?;

    let frame = frame
        .map(|side| -> Result<String> {
            let mut payload = vec![side.as_u8()];
            payload.extend_from_slice(&units);
            Ok(hex::encode(encode_frame(HostMessage::SetAll, &payload)?))
        })
        .transpose()?;

    Ok(EncodedContent {
        explanation: codec.decode(&units),
        units: units.into_vec(),
        frame,
    })
}

/// Print the encoded content as JSON
pub fn execute(profile: &Profile, content: &Content, frame: Option<Side>) -> Result<()> {
    let encoded = encode(profile, content, frame)?;
    println!("{}", serde_json::to_string_pretty(&encoded)?);
    Ok(())
}
