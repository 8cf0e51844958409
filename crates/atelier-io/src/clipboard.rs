//! Clipboard codec.
//!
//! Payloads travel as base64 JSON inside the data attribute of an empty
//! `<span>`, which survives rich-text intermediaries and stays invisible
//! when pasted into a plain document. Decoding never fails loudly: any
//! malformed input is logged at `debug` and yields `None`.

use crate::filetype::{ImageType, is_svg_text};
use crate::html;
use atelier_core::{NodeId, NodePrototype, Paint};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Attribute carrying the payload.
pub const CLIPBOARD_ATTRIBUTE: &str = "data-atelier-clipboard";
/// Prefix of every attribute this codec writes.
pub const ATTRIBUTE_PREFIX: &str = "data-atelier-";

const B64_PREFIX: &str = "b64:";

pub const MIME_HTML: &str = "text/html";
pub const MIME_PLAIN: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintTarget {
    Fill,
    Stroke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClipboardPayload {
    /// Node subtrees to re-instantiate. The only variant that is offered
    /// to other applications.
    #[serde(rename = "prototypes")]
    Prototypes {
        payload_id: String,
        prototypes: Vec<NodePrototype>,
        /// Ids of the copied originals, for paste-in-place.
        ids: Vec<NodeId>,
    },
    /// Property bag for paste-as-properties.
    #[serde(rename = "properties")]
    Properties {
        payload_id: String,
        properties: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(rename = "property/fill-image-paint")]
    FillImagePaint {
        payload_id: String,
        paint: Paint,
        paint_target: PaintTarget,
        paint_index: usize,
        node_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_key: Option<String>,
    },
}

fn new_payload_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl ClipboardPayload {
    pub fn prototypes(prototypes: Vec<NodePrototype>, ids: Vec<NodeId>) -> Self {
        ClipboardPayload::Prototypes {
            payload_id: new_payload_id(),
            prototypes,
            ids,
        }
    }

    pub fn properties(properties: serde_json::Map<String, serde_json::Value>) -> Self {
        ClipboardPayload::Properties {
            payload_id: new_payload_id(),
            properties,
        }
    }

    pub fn fill_image_paint(
        paint: Paint,
        paint_target: PaintTarget,
        paint_index: usize,
        node_id: NodeId,
        document_key: Option<String>,
    ) -> Self {
        ClipboardPayload::FillImagePaint {
            payload_id: new_payload_id(),
            paint,
            paint_target,
            paint_index,
            node_id,
            document_key,
        }
    }

    pub fn payload_id(&self) -> &str {
        match self {
            ClipboardPayload::Prototypes { payload_id, .. }
            | ClipboardPayload::Properties { payload_id, .. }
            | ClipboardPayload::FillImagePaint { payload_id, .. } => payload_id,
        }
    }

    /// Whether this payload may be exposed as a system clipboard item.
    pub fn is_transferable(&self) -> bool {
        matches!(self, ClipboardPayload::Prototypes { .. })
    }
}

/// A native multi-format clipboard item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub html: String,
    pub plain: Option<String>,
}

impl ClipboardItem {
    /// `(mime, data)` entries, `text/html` first.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![(MIME_HTML, self.html.as_str())];
        if let Some(plain) = &self.plain {
            entries.push((MIME_PLAIN, plain.as_str()));
        }
        entries
    }
}

// ─── Encode ──────────────────────────────────────────────────────────────

/// # Errors
/// JSON serialization failure.
pub fn encode_clipboard_html(payload: &ClipboardPayload) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(payload)?;
    let encoded = STANDARD.encode(json);
    Ok(format!(
        r#"<span {CLIPBOARD_ATTRIBUTE}="{B64_PREFIX}{encoded}"></span>"#
    ))
}

/// Text of every text node in the copied prototypes, one per line.
/// `None` when there is no visible text.
pub fn encode_clipboard_text(prototypes: &[NodePrototype]) -> Option<String> {
    let mut text = String::new();
    for line in prototypes.iter().flat_map(NodePrototype::plain_text) {
        text.push_str(line);
        text.push('\n');
    }
    (!text.trim().is_empty()).then_some(text)
}

/// Build the native clipboard item for `payload`. Only non-empty
/// `prototypes` payloads produce one.
///
/// # Errors
/// JSON serialization failure.
pub fn encode(payload: &ClipboardPayload) -> Result<Option<ClipboardItem>, serde_json::Error> {
    let ClipboardPayload::Prototypes { prototypes, .. } = payload else {
        return Ok(None);
    };
    if prototypes.is_empty() {
        return Ok(None);
    }
    Ok(Some(ClipboardItem {
        html: encode_clipboard_html(payload)?,
        plain: encode_clipboard_text(prototypes),
    }))
}

// ─── Decode ──────────────────────────────────────────────────────────────

fn decode_attribute(value: &str) -> Option<ClipboardPayload> {
    let Some(encoded) = value.strip_prefix(B64_PREFIX) else {
        log::debug!("clipboard attribute without {B64_PREFIX} prefix");
        return None;
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| log::debug!("clipboard base64: {e}"))
        .ok()?;
    serde_json::from_slice(&bytes)
        .map_err(|e| log::debug!("clipboard payload: {e}"))
        .ok()
}

/// Extract this system's payload from clipboard HTML, wrapped or not.
/// Markup that an intermediary escaped wholesale is unescaped once and
/// scanned again.
pub fn decode_clipboard_html(html: &str) -> Option<ClipboardPayload> {
    if let Some(value) = html::find_attribute(html, "span", CLIPBOARD_ATTRIBUTE) {
        return decode_attribute(&value);
    }
    if html.contains("&lt;") {
        let unescaped = html::unescape(html);
        if let Some(value) = html::find_attribute(&unescaped, "span", CLIPBOARD_ATTRIBUTE) {
            return decode_attribute(&value);
        }
    }
    None
}

/// Foreign design tools recognized by their clipboard markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignVendor {
    Figma,
}

const FIGMA_MARKERS: [(&str, &str); 4] = [
    ("&lt;!--(figmeta)", "<!--(figmeta)"),
    ("(/figmeta)--&gt;", "(/figmeta)-->"),
    ("&lt;!--(figma)", "<!--(figma)"),
    ("(/figma)--&gt;", "(/figma)-->"),
];

/// Undo entity-escaping of the Figma comment markers (each replaced once).
pub fn normalize_figma_html(html: &str) -> String {
    FIGMA_MARKERS
        .iter()
        .fold(html.to_string(), |acc, (escaped, raw)| acc.replacen(escaped, raw, 1))
}

/// Structural check for Figma clipboard HTML. The payload itself is not
/// parsed.
pub fn is_figma_clipboard(html: &str) -> bool {
    if !html.contains("(figma)") {
        return false;
    }
    let html = normalize_figma_html(html);
    html.contains("data-metadata")
        && html.contains("data-buffer")
        && html.contains("<!--(figmeta)")
        && html.contains("<!--(figma)")
}

/// What a clipboard entry turned out to hold.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardContent {
    Payload(ClipboardPayload),
    /// Another tool's clipboard; `html` has its markers normalized.
    Foreign {
        vendor: ForeignVendor,
        html: String,
    },
    Text(String),
    SvgText(String),
    Image {
        kind: ImageType,
        bytes: Vec<u8>,
    },
}

/// Decode `text/html`. This system's own marker always wins over a
/// foreign one.
pub fn decode_html(html: &str) -> Option<ClipboardContent> {
    if let Some(payload) = decode_clipboard_html(html) {
        return Some(ClipboardContent::Payload(payload));
    }
    if is_figma_clipboard(html) {
        return Some(ClipboardContent::Foreign {
            vendor: ForeignVendor::Figma,
            html: normalize_figma_html(html),
        });
    }
    log::debug!("unrecognized clipboard html ({} bytes)", html.len());
    None
}

/// Decode `text/plain`. Whitespace-only text yields `None`.
pub fn decode_plain(text: &str) -> Option<ClipboardContent> {
    if text.trim().is_empty() {
        return None;
    }
    if is_svg_text(text) {
        return Some(ClipboardContent::SvgText(text.to_string()));
    }
    Some(ClipboardContent::Text(text.to_string()))
}

/// Decode one `(mime, bytes)` clipboard entry.
pub fn decode_entry(mime: &str, bytes: &[u8]) -> Option<ClipboardContent> {
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    match essence {
        MIME_HTML => decode_html(std::str::from_utf8(bytes).ok()?),
        MIME_PLAIN => decode_plain(std::str::from_utf8(bytes).ok()?),
        _ => match ImageType::from_mime(essence)? {
            ImageType::Svg => {
                let text = std::str::from_utf8(bytes).ok()?;
                Some(ClipboardContent::SvgText(text.to_string()))
            }
            kind => Some(ClipboardContent::Image {
                kind,
                bytes: bytes.to_vec(),
            }),
        },
    }
}
